//! Progress Tracking
//!
//! Completed-lesson computation, certificate unlock gating, and a tracker
//! service that evaluates the gate over provider records.

#![warn(missing_docs)]

pub mod unlock;
pub mod gate;
pub mod tracker;

pub use unlock::{compute_unlock_state, sanitize_percent, sanitize_total_lessons};
pub use gate::{CertificateGate, certificate_status};
pub use tracker::{
    ProgressTracker, ProgressSnapshot, BasicProgressTracker, CourseReport, TrackerError, Result,
};
