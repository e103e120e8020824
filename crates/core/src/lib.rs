//! Core data models for course progress and certificate gating.
//!
//! This crate defines the records exchanged with the course/progress API and
//! the policy types that parameterise the certificate gate.

#![warn(missing_docs)]

// Core identities
mod id;

// Catalogue and learner state
mod course;
mod progress;

// Gate configuration
mod policy;

// Re-exports
pub use id::{CourseId, LearnerId};
pub use course::Course;
pub use progress::{CourseProgress, UnlockState, CertificateStatus};
pub use policy::{
    UnlockPolicy, GateConfig, PolicyError, DEFAULT_TOTAL_LESSONS, DEFAULT_UNLOCK_THRESHOLD,
};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
