//! Certificate unlock computation.
//!
//! Turns a course's lesson count and a learner's completion percentage into
//! a completed-lesson count and a locked/unlocked decision. Inputs come from
//! external data and are sanitised rather than rejected: the result feeds a
//! purely visual gate and must never fail.

use elearn_core::{UnlockPolicy, UnlockState};
use tracing::debug;

/// Resolve the lesson count to compute with.
///
/// Missing, zero and negative counts fall back to the policy default.
/// Counts beyond `u32::MAX` saturate.
pub fn sanitize_total_lessons(raw: Option<i64>, policy: &UnlockPolicy) -> u32 {
    match raw {
        Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
        other => {
            debug!(
                raw = ?other,
                default = policy.default_total_lessons,
                "substituting default lesson count"
            );
            policy.default_total_lessons
        }
    }
}

/// Resolve the completion percentage to compute with.
///
/// Missing and NaN become 0; everything else is clamped to `[0, 100]`.
pub fn sanitize_percent(raw: Option<f64>) -> f64 {
    match raw {
        None => 0.0,
        Some(p) if p.is_nan() => {
            debug!("progress percent is NaN, treating as 0");
            0.0
        }
        Some(p) if !(0.0..=100.0).contains(&p) => {
            debug!(raw = p, "progress percent out of range, clamping");
            p.clamp(0.0, 100.0)
        }
        Some(p) => p,
    }
}

/// Compute the unlock state for one course.
///
/// `completed = floor(percent / 100 * total)`; the certificate unlocks once
/// `completed >= policy.unlock_threshold`. Pure apart from debug events on
/// sanitation, so callers recompute it whenever inputs change.
pub fn compute_unlock_state(
    policy: &UnlockPolicy,
    total_lessons: Option<i64>,
    progress_percent: Option<f64>,
) -> UnlockState {
    let total = sanitize_total_lessons(total_lessons, policy);
    let percent = sanitize_percent(progress_percent);

    // percent is within [0, 100] so the product never exceeds total
    let completed = (percent / 100.0 * f64::from(total)).floor() as u32;
    let is_unlocked = completed >= policy.unlock_threshold;

    UnlockState {
        total_lessons: total,
        completed_lessons: completed,
        is_unlocked,
        remaining: policy.unlock_threshold.saturating_sub(completed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_state(total: i64, percent: f64) -> UnlockState {
        compute_unlock_state(&UnlockPolicy::default(), Some(total), Some(percent))
    }

    #[test]
    fn test_exact_threshold_unlocks() {
        let state = default_state(80, 37.5);
        assert_eq!(state.completed_lessons, 30);
        assert!(state.is_unlocked);
        assert_eq!(state.remaining, 0);
    }

    #[test]
    fn test_just_below_threshold_stays_locked() {
        let state = default_state(80, 36.0);
        assert_eq!(state.completed_lessons, 28);
        assert!(!state.is_unlocked);
        assert_eq!(state.remaining, 2);
    }

    #[test]
    fn test_zero_lessons_uses_default() {
        let state = default_state(0, 0.0);
        assert_eq!(state.total_lessons, 80);
        assert_eq!(state.completed_lessons, 0);
        assert!(!state.is_unlocked);
        assert_eq!(state.remaining, 30);

        let state = default_state(0, 50.0);
        assert_eq!(state.completed_lessons, 40);
        assert!(state.is_unlocked);
    }

    #[test]
    fn test_missing_and_negative_lessons_use_default() {
        let policy = UnlockPolicy::default();
        assert_eq!(compute_unlock_state(&policy, None, Some(10.0)).total_lessons, 80);
        assert_eq!(compute_unlock_state(&policy, Some(-5), Some(10.0)).total_lessons, 80);
    }

    #[test]
    fn test_oversized_percent_is_clamped() {
        let state = default_state(80, 150.0);
        assert_eq!(state.completed_lessons, 80);
        assert!(state.completed_lessons <= state.total_lessons);
        assert!(state.is_unlocked);

        let state = default_state(10, 1e9);
        assert_eq!(state.completed_lessons, 10);
    }

    #[test]
    fn test_negative_and_nan_percent_become_zero() {
        let policy = UnlockPolicy::default();
        for raw in [Some(-20.0), Some(f64::NAN), Some(f64::NEG_INFINITY), None] {
            let state = compute_unlock_state(&policy, Some(80), raw);
            assert_eq!(state.completed_lessons, 0, "input {:?}", raw);
            assert_eq!(state.remaining, 30);
        }
        let state = compute_unlock_state(&policy, Some(80), Some(f64::INFINITY));
        assert_eq!(state.completed_lessons, 80);
    }

    #[test]
    fn test_huge_lesson_count_saturates() {
        assert_eq!(
            sanitize_total_lessons(Some(i64::MAX), &UnlockPolicy::default()),
            u32::MAX
        );
    }

    #[test]
    fn test_custom_policy_is_respected() {
        let policy = UnlockPolicy::new(20, 5).unwrap();
        let state = compute_unlock_state(&policy, None, Some(25.0));
        assert_eq!(state.total_lessons, 20);
        assert_eq!(state.completed_lessons, 5);
        assert!(state.is_unlocked);

        let zero_threshold = UnlockPolicy::new(20, 0).unwrap();
        assert!(compute_unlock_state(&zero_threshold, Some(20), Some(0.0)).is_unlocked);
    }

    #[test]
    fn test_invariants_hold_across_inputs() {
        let policy = UnlockPolicy::default();
        for total in 1..=200i64 {
            for step in 0..=200 {
                let percent = step as f64 * 0.5;
                let state = compute_unlock_state(&policy, Some(total), Some(percent));

                let expected = (percent / 100.0 * total as f64).floor() as u32;
                assert_eq!(state.completed_lessons, expected);
                assert!(state.completed_lessons <= state.total_lessons);
                assert_eq!(state.is_unlocked, state.completed_lessons >= 30);
                assert_eq!(state.remaining, 30u32.saturating_sub(state.completed_lessons));
                if state.is_unlocked {
                    assert_eq!(state.remaining, 0);
                }
            }
        }
    }

    #[test]
    fn test_repeated_calls_agree() {
        let policy = UnlockPolicy::default();
        let first = compute_unlock_state(&policy, Some(57), Some(61.3));
        let second = compute_unlock_state(&policy, Some(57), Some(61.3));
        assert_eq!(first, second);
    }

    #[test]
    fn test_progress_regression_relocks() {
        assert!(default_state(80, 50.0).is_unlocked);
        assert!(!default_state(80, 20.0).is_unlocked);
    }
}
