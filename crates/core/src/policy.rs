//! Unlock policies - the tunable constants behind the certificate gate.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Lesson count assumed when a course does not report one.
pub const DEFAULT_TOTAL_LESSONS: u32 = 80;

/// Completed lessons required before a certificate unlocks.
pub const DEFAULT_UNLOCK_THRESHOLD: u32 = 30;

/// Errors raised when a policy cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// The fallback lesson count must be positive
    #[error("default_total_lessons must be greater than zero")]
    ZeroDefaultLessons,

    /// A tier policy failed validation
    #[error("tier '{tier}': {source}")]
    Tier {
        /// Tier name
        tier: String,
        /// Underlying problem
        #[source]
        source: Box<PolicyError>,
    },
}

/// Constants controlling when a course certificate unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockPolicy {
    /// Substituted for a missing, zero or negative lesson count
    pub default_total_lessons: u32,

    /// Completed lessons required to unlock
    pub unlock_threshold: u32,
}

impl UnlockPolicy {
    /// Create a validated policy.
    pub fn new(default_total_lessons: u32, unlock_threshold: u32) -> Result<Self, PolicyError> {
        let policy = Self {
            default_total_lessons,
            unlock_threshold,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check the policy can be used for computation.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.default_total_lessons == 0 {
            return Err(PolicyError::ZeroDefaultLessons);
        }
        Ok(())
    }
}

impl Default for UnlockPolicy {
    fn default() -> Self {
        Self {
            default_total_lessons: DEFAULT_TOTAL_LESSONS,
            unlock_threshold: DEFAULT_UNLOCK_THRESHOLD,
        }
    }
}

/// Gate configuration: a default policy plus per-tier overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Policy for courses without a tier or with an unknown tier
    pub default: UnlockPolicy,

    /// Overrides keyed by course tier
    pub tiers: HashMap<String, UnlockPolicy>,
}

impl GateConfig {
    /// Add or replace a tier override.
    pub fn with_tier(mut self, tier: impl Into<String>, policy: UnlockPolicy) -> Self {
        self.tiers.insert(tier.into(), policy);
        self
    }

    /// Select the policy for a tier.
    pub fn policy_for(&self, tier: Option<&str>) -> &UnlockPolicy {
        tier.and_then(|t| self.tiers.get(t)).unwrap_or(&self.default)
    }

    /// Validate the default and every tier override.
    pub fn validate(&self) -> Result<(), PolicyError> {
        self.default.validate()?;
        for (tier, policy) in &self.tiers {
            policy.validate().map_err(|e| PolicyError::Tier {
                tier: tier.clone(),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}
