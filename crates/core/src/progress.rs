//! Learner progress records and the derived unlock state.

use serde::{Deserialize, Serialize};
use crate::id::{CourseId, LearnerId};
use crate::Time;

/// How much of a course a learner has consumed, as reported by the
/// progress API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseProgress {
    /// Learner this record belongs to
    pub learner_id: LearnerId,

    /// Course this record belongs to
    pub course_id: CourseId,

    /// Completion percentage (0-100), unvalidated
    #[serde(default)]
    pub percent: Option<f64>,

    /// Last updated
    pub updated_at: Time,
}

impl CourseProgress {
    /// Create a progress record stamped with the current time.
    pub fn new(learner_id: LearnerId, course_id: CourseId, percent: f64) -> Self {
        Self {
            learner_id,
            course_id,
            percent: Some(percent),
            updated_at: chrono::Utc::now(),
        }
    }
}

/// Result of evaluating the certificate gate for one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockState {
    /// Lesson count actually used (after default substitution)
    pub total_lessons: u32,

    /// Lessons counted as completed
    pub completed_lessons: u32,

    /// Whether the certificate is available
    pub is_unlocked: bool,

    /// Lessons still required; zero once unlocked
    pub remaining: u32,
}

/// What a certificate screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CertificateStatus {
    /// Overlay with the number of lessons still to go
    Locked {
        /// Lessons counted as completed
        completed_lessons: u32,
        /// Lessons still required
        remaining: u32,
        /// Threshold of the applied policy
        threshold: u32,
    },
    /// Certificate can be viewed and shared
    Unlocked {
        /// Lessons counted as completed
        completed_lessons: u32,
    },
}

impl CertificateStatus {
    /// Whether the certificate is available.
    pub fn is_unlocked(&self) -> bool {
        matches!(self, CertificateStatus::Unlocked { .. })
    }

    /// Short label for list displays.
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Locked { .. } => "LOCKED",
            CertificateStatus::Unlocked { .. } => "UNLOCKED",
        }
    }
}
