//! Course model - catalogue entry as delivered by the course API.

use serde::{Deserialize, Serialize};
use crate::id::CourseId;
use crate::Time;

/// A course offered on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier
    pub id: CourseId,

    /// Course title
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Total lesson count.
    ///
    /// Signed and optional because upstream data may omit it or carry
    /// nonsense; the unlock computation substitutes the policy default.
    #[serde(default)]
    pub total_lessons: Option<i64>,

    /// Pricing / difficulty tier, used to select an unlock policy
    #[serde(default)]
    pub tier: Option<String>,

    /// When created
    pub created_at: Time,
}

impl Course {
    /// Create a course with no lesson count and no tier.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: CourseId::new(),
            title: title.into(),
            description: String::new(),
            total_lessons: None,
            tier: None,
            created_at: chrono::Utc::now(),
        }
    }

    /// Set the lesson count.
    pub fn with_lessons(mut self, total_lessons: i64) -> Self {
        self.total_lessons = Some(total_lessons);
        self
    }

    /// Set the tier.
    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
