//! JSON file storage implementation.
//!
//! Stores courses as `<root>/courses/<id>.json` and progress as
//! `<root>/progress/<learner>/<course>.json`. Learner identifiers are
//! percent-escaped so provider-issued ids like `auth0|123` stay valid file
//! names.

use std::path::{Path, PathBuf};
use elearn_core::{Course, CourseId, CourseProgress, LearnerId};
use tokio::fs;
use tracing::{debug, warn};
use super::{Storage, StorageError, Result};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage, creating the directory layout if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("courses")).await?;
        fs::create_dir_all(root.join("progress")).await?;

        debug!(root = %root.display(), "opened json storage");
        Ok(Self { root })
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn course_path(&self, id: CourseId) -> PathBuf {
        self.root.join("courses").join(format!("{}.json", id))
    }

    fn learner_dir(&self, learner: &LearnerId) -> PathBuf {
        self.root.join("progress").join(escape_file_name(learner.as_str()))
    }

    fn progress_path(&self, learner: &LearnerId, course: CourseId) -> PathBuf {
        self.learner_dir(learner).join(format!("{}.json", course))
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_course(&mut self, course: &Course) -> Result<()> {
        let json = serde_json::to_string_pretty(course)?;
        fs::write(self.course_path(course.id), json.as_bytes()).await?;
        Ok(())
    }

    async fn load_course(&self, id: CourseId) -> Result<Option<Course>> {
        read_json(&self.course_path(id)).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        let mut courses: Vec<Course> = list_dir(&self.root.join("courses")).await?;
        courses.sort_by_key(|c| c.id);
        Ok(courses)
    }

    async fn delete_course(&mut self, id: CourseId) -> Result<()> {
        match fs::remove_file(self.course_path(id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(format!("course {}", id)));
            }
            Err(e) => return Err(e.into()),
        }

        // Drop orphaned progress for every learner
        let mut rd = fs::read_dir(self.root.join("progress")).await?;
        while let Some(entry) = rd.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let path = entry.path().join(format!("{}.json", id));
            match fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "removed orphaned progress"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn save_progress(&mut self, progress: &CourseProgress) -> Result<()> {
        fs::create_dir_all(self.learner_dir(&progress.learner_id)).await?;
        let mut record = progress.clone();
        record.percent = progress.percent.and_then(storable_percent);
        let json = serde_json::to_string_pretty(&record)?;
        let path = self.progress_path(&progress.learner_id, progress.course_id);
        fs::write(path, json.as_bytes()).await?;
        Ok(())
    }

    async fn load_progress(
        &self,
        learner: &LearnerId,
        course: CourseId,
    ) -> Result<Option<CourseProgress>> {
        read_json(&self.progress_path(learner, course)).await
    }

    async fn list_progress(&self, learner: &LearnerId) -> Result<Vec<CourseProgress>> {
        let dir = self.learner_dir(learner);
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }
        let mut records: Vec<CourseProgress> = list_dir(&dir).await?;
        records.sort_by_key(|p| p.course_id);
        Ok(records)
    }
}

/// JSON has no infinities or NaN; map them to the values they evaluate as.
fn storable_percent(p: f64) -> Option<f64> {
    if p.is_nan() {
        None
    } else if p.is_infinite() {
        Some(p.clamp(0.0, 100.0))
    } else {
        Some(p)
    }
}

fn escape_file_name(raw: &str) -> String {
    // A lone `%` is never produced by escaping, so it is free for the empty id
    if raw.is_empty() {
        return "%".to_string();
    }
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&path).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable record"),
        }
    }
    Ok(items)
}
