//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use elearn_core::{Course, CourseId, CourseProgress, LearnerId};
use tokio::sync::RwLock;
use super::{Result, Storage, StorageError};

/// Volatile storage backed by hash maps.
///
/// Cloning shares the underlying maps.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    courses: Arc<RwLock<HashMap<CourseId, Course>>>,
    progress: Arc<RwLock<HashMap<(LearnerId, CourseId), CourseProgress>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save_course(&mut self, course: &Course) -> Result<()> {
        self.courses.write().await.insert(course.id, course.clone());
        Ok(())
    }

    async fn load_course(&self, id: CourseId) -> Result<Option<Course>> {
        Ok(self.courses.read().await.get(&id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        let mut courses: Vec<Course> = self.courses.read().await.values().cloned().collect();
        courses.sort_by_key(|c| c.id);
        Ok(courses)
    }

    async fn delete_course(&mut self, id: CourseId) -> Result<()> {
        if self.courses.write().await.remove(&id).is_none() {
            return Err(StorageError::NotFound(format!("course {}", id)));
        }
        self.progress.write().await.retain(|(_, course), _| *course != id);
        Ok(())
    }

    async fn save_progress(&mut self, progress: &CourseProgress) -> Result<()> {
        self.progress.write().await.insert(
            (progress.learner_id.clone(), progress.course_id),
            progress.clone(),
        );
        Ok(())
    }

    async fn load_progress(
        &self,
        learner: &LearnerId,
        course: CourseId,
    ) -> Result<Option<CourseProgress>> {
        Ok(self
            .progress
            .read()
            .await
            .get(&(learner.clone(), course))
            .cloned())
    }

    async fn list_progress(&self, learner: &LearnerId) -> Result<Vec<CourseProgress>> {
        let mut records: Vec<CourseProgress> = self
            .progress
            .read()
            .await
            .values()
            .filter(|p| &p.learner_id == learner)
            .cloned()
            .collect();
        records.sort_by_key(|p| p.course_id);
        Ok(records)
    }
}
