//! Domain types for the credential engine.
//!
//! ## Domain Types
//!
//! - [`Session`] - One authenticated device/agent binding
//! - [`VerificationChallenge`] - One issued one-time code/token pair
//! - [`VerificationKind`] - Purpose discriminator for challenges

pub mod session;
pub mod verification;

pub use session::Session;
pub use verification::{VerificationChallenge, VerificationKind};
