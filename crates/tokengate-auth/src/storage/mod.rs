//! Durable storage traits for the credential engine.
//!
//! This module defines the read/write contract against the durable
//! relational store for:
//!
//! - Session records
//! - Verification challenges
//!
//! Both collections are soft-deleted only; a `deleted_at` marker hides a
//! row from lookups without destroying the audit trail.
//!
//! # Implementations
//!
//! - In-memory (this crate, [`crate::memory`])
//! - PostgreSQL (`tokengate-auth-postgres` crate)

pub mod session;
pub mod verification;

pub use session::SessionStorage;
pub use verification::VerificationStorage;
