//! Loyalty points arithmetic.
//!
//! Points are earned per cart addition according to the overall score and
//! accumulate without an upper bound. Only the progress display is capped.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points needed to unlock a reward.
pub const REWARD_THRESHOLD: u64 = 10;

/// Prefix of every displayed reward code.
pub const REWARD_CODE_PREFIX: &str = "ECO";

const CODE_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_SUFFIX_LEN: usize = 6;

/// Points awarded for an overall score.
///
/// `>= 9.0 → 30`, `>= 8.0 → 15`, `>= 7.0 → 5`, otherwise `0`.
pub fn award(overall_score: f64) -> u64 {
    if overall_score >= 9.0 {
        30
    } else if overall_score >= 8.0 {
        15
    } else if overall_score >= 7.0 {
        5
    } else {
        0
    }
}

/// New running total; saturates instead of wrapping.
pub const fn accumulate(current: u64, earned: u64) -> u64 {
    current.saturating_add(earned)
}

pub const fn reset() -> u64 {
    0
}

pub const fn is_unlocked(points: u64) -> bool {
    points >= REWARD_THRESHOLD
}

/// True when a credit moved the total from below to at-or-above the threshold.
pub const fn crossed_threshold(before: u64, after: u64) -> bool {
    !is_unlocked(before) && is_unlocked(after)
}

/// Points shown on the progress bar, capped at the threshold.
pub fn display_points(points: u64) -> u64 {
    points.min(REWARD_THRESHOLD)
}

/// Progress towards the threshold in whole percent, capped at 100.
pub fn progress_percent(points: u64) -> u8 {
    // display_points <= 10, so the product fits comfortably in u8.
    u8::try_from(display_points(points) * 100 / REWARD_THRESHOLD).unwrap_or(100)
}

/// Display-only reward code.
///
/// Codes are never persisted: a fresh one is drawn each time the unlocked
/// state is rendered, so the value changes between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardCode(String);

impl RewardCode {
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let suffix: String = (0..CODE_SUFFIX_LEN)
            .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
            .collect();
        Self(format!("{REWARD_CODE_PREFIX}{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RewardCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of the rewards state prepared for one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsView {
    pub points: u64,
    pub display_points: u64,
    pub progress_percent: u8,
    pub unlocked: bool,
    pub code: Option<RewardCode>,
}

impl RewardsView {
    /// Build a view, drawing a new code when the reward is unlocked.
    pub fn render(points: u64) -> Self {
        let unlocked = is_unlocked(points);
        Self {
            points,
            display_points: display_points(points),
            progress_percent: progress_percent(points),
            unlocked,
            code: unlocked.then(RewardCode::generate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_tiers() {
        assert_eq!(award(10.0), 30);
        assert_eq!(award(9.0), 30);
        assert_eq!(award(8.99), 15);
        assert_eq!(award(8.0), 15);
        assert_eq!(award(7.0), 5);
        assert_eq!(award(6.99), 0);
        assert_eq!(award(1.0), 0);
    }

    #[test]
    fn test_accumulate_and_threshold() {
        let total = accumulate(6, award(7.2));
        assert_eq!(total, 11);
        assert!(is_unlocked(total));
        assert!(crossed_threshold(6, total));
        assert!(!crossed_threshold(11, accumulate(11, 5)));
        assert_eq!(reset(), 0);
    }

    #[test]
    fn test_progress_is_capped_but_points_are_not() {
        assert_eq!(display_points(45), 10);
        assert_eq!(progress_percent(45), 100);
        assert_eq!(progress_percent(5), 50);
        assert_eq!(progress_percent(0), 0);
        let view = RewardsView::render(45);
        assert_eq!(view.points, 45);
        assert_eq!(view.display_points, 10);
    }

    #[test]
    fn test_reward_code_shape() {
        let code = RewardCode::generate();
        let s = code.as_str();
        assert_eq!(s.len(), 9);
        assert!(s.starts_with("ECO"));
        assert!(s[3..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_view_only_has_code_when_unlocked() {
        assert!(RewardsView::render(9).code.is_none());
        assert!(!RewardsView::render(9).unlocked);
        let view = RewardsView::render(10);
        assert!(view.unlocked);
        assert!(view.code.is_some());
    }
}
