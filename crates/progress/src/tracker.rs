//! Progress tracking service.

use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use elearn_core::{CertificateStatus, Course, CourseId, CourseProgress, LearnerId, UnlockState};
use elearn_storage::{Storage, StorageError};
use serde::Serialize;
use tracing::debug;
use crate::gate::CertificateGate;
use crate::unlock::sanitize_percent;

/// Error type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that can occur while gathering progress.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The record provider failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Progress tracking service.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    /// Certificate report for one course, `None` if the course is unknown.
    async fn course_report(
        &self,
        learner: &LearnerId,
        course_id: CourseId,
    ) -> Result<Option<CourseReport>>;

    /// Take a snapshot across every known course.
    async fn snapshot(&self, learner: &LearnerId) -> Result<ProgressSnapshot>;
}

/// Progress and certificate state of one course for one learner.
#[derive(Debug, Clone, Serialize)]
pub struct CourseReport {
    /// Course identifier
    pub course_id: CourseId,

    /// Course title
    pub title: String,

    /// Course tier, if any
    pub tier: Option<String>,

    /// Completion percentage after sanitation
    pub percent: f64,

    /// Derived unlock state
    pub state: UnlockState,

    /// What the certificate screen shows
    pub certificate: CertificateStatus,
}

/// A snapshot of a learner's progress at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    /// When snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Learner the snapshot belongs to
    pub learner_id: LearnerId,

    /// One report per course
    pub reports: Vec<CourseReport>,
}

impl ProgressSnapshot {
    /// Number of unlocked certificates.
    pub fn unlocked_count(&self) -> usize {
        self.reports.iter().filter(|r| r.state.is_unlocked).count()
    }

    /// Number of locked certificates.
    pub fn locked_count(&self) -> usize {
        self.reports.len() - self.unlocked_count()
    }
}

/// Basic progress tracker implementation.
pub struct BasicProgressTracker<S: Storage> {
    storage: Arc<S>,
    gate: CertificateGate,
}

impl<S: Storage> BasicProgressTracker<S> {
    /// Create a new progress tracker.
    pub fn new(storage: S, gate: CertificateGate) -> Self {
        Self {
            storage: Arc::new(storage),
            gate,
        }
    }

    /// Gate used for evaluation.
    pub fn gate(&self) -> &CertificateGate {
        &self.gate
    }

    fn build_report(&self, course: &Course, progress: Option<&CourseProgress>) -> CourseReport {
        let state = self.gate.evaluate(course, progress);
        let certificate = self.gate.status(course, progress);

        CourseReport {
            course_id: course.id,
            title: course.title.clone(),
            tier: course.tier.clone(),
            percent: sanitize_percent(progress.and_then(|p| p.percent)),
            state,
            certificate,
        }
    }
}

#[async_trait]
impl<S: Storage + 'static> ProgressTracker for BasicProgressTracker<S> {
    async fn course_report(
        &self,
        learner: &LearnerId,
        course_id: CourseId,
    ) -> Result<Option<CourseReport>> {
        let Some(course) = self.storage.load_course(course_id).await? else {
            return Ok(None);
        };
        let progress = self.storage.load_progress(learner, course_id).await?;
        Ok(Some(self.build_report(&course, progress.as_ref())))
    }

    async fn snapshot(&self, learner: &LearnerId) -> Result<ProgressSnapshot> {
        let courses = self.storage.list_courses().await?;
        let progress = self.storage.list_progress(learner).await?;

        let reports: Vec<CourseReport> = courses
            .iter()
            .map(|course| {
                let record = progress.iter().find(|p| p.course_id == course.id);
                self.build_report(course, record)
            })
            .collect();

        debug!(learner = %learner, courses = reports.len(), "progress snapshot taken");

        Ok(ProgressSnapshot {
            timestamp: Utc::now(),
            learner_id: learner.clone(),
            reports,
        })
    }
}
