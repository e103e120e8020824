//! Storage trait abstraction.

use async_trait::async_trait;
use elearn_core::{Course, CourseId, CourseProgress, LearnerId};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Provider of course and progress records.
///
/// Stands in for the remote course/progress API; backends can be swapped
/// without touching the progress computation.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Course operations ===

    /// Save a course (create or update).
    async fn save_course(&mut self, course: &Course) -> Result<()>;

    /// Load a course by ID.
    async fn load_course(&self, id: CourseId) -> Result<Option<Course>>;

    /// List all courses.
    async fn list_courses(&self) -> Result<Vec<Course>>;

    /// Delete a course and every progress record pointing at it.
    async fn delete_course(&mut self, id: CourseId) -> Result<()>;

    // === Progress operations ===

    /// Save a learner's progress record (create or update).
    async fn save_progress(&mut self, progress: &CourseProgress) -> Result<()>;

    /// Load a learner's progress on one course.
    async fn load_progress(
        &self,
        learner: &LearnerId,
        course: CourseId,
    ) -> Result<Option<CourseProgress>>;

    /// List every progress record of a learner.
    async fn list_progress(&self, learner: &LearnerId) -> Result<Vec<CourseProgress>>;
}
