//! Certificate gate - tier-aware evaluation for a course.

use elearn_core::{
    CertificateStatus, Course, CourseProgress, GateConfig, PolicyError, UnlockPolicy, UnlockState,
};
use crate::unlock::compute_unlock_state;

/// Evaluates certificate availability using per-tier unlock policies.
#[derive(Debug, Clone, Default)]
pub struct CertificateGate {
    config: GateConfig,
}

impl CertificateGate {
    /// Create a gate from a validated configuration.
    pub fn new(config: GateConfig) -> Result<Self, PolicyError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Policy applied to a course.
    pub fn policy_for(&self, course: &Course) -> &UnlockPolicy {
        self.config.policy_for(course.tier.as_deref())
    }

    /// Compute the unlock state; no progress record counts as 0%.
    pub fn evaluate(&self, course: &Course, progress: Option<&CourseProgress>) -> UnlockState {
        compute_unlock_state(
            self.policy_for(course),
            course.total_lessons,
            progress.and_then(|p| p.percent),
        )
    }

    /// Compute what the certificate screen should show.
    pub fn status(&self, course: &Course, progress: Option<&CourseProgress>) -> CertificateStatus {
        certificate_status(&self.evaluate(course, progress), self.policy_for(course))
    }
}

/// Map an unlock state to its presentational status.
pub fn certificate_status(state: &UnlockState, policy: &UnlockPolicy) -> CertificateStatus {
    if state.is_unlocked {
        CertificateStatus::Unlocked {
            completed_lessons: state.completed_lessons,
        }
    } else {
        CertificateStatus::Locked {
            completed_lessons: state.completed_lessons,
            remaining: state.remaining,
            threshold: policy.unlock_threshold,
        }
    }
}
