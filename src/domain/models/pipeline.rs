use serde::{Deserialize, Serialize};
use std::fmt;

use super::entries::{CartEntry, CartSummary};
use crate::domain::errors::ErrorKind;

/// Analysis pipeline state.
///
/// Happy path: `Idle → Extracting → Analyzing → Validating → Displaying`.
/// `Error` is terminal for the attempt; only a user re-trigger (back to
/// `Idle`) leaves `Displaying` or `Error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Idle,
    Extracting,
    Analyzing,
    Validating,
    Displaying,
    Error(ErrorKind),
}

impl PipelineState {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Displaying | Self::Error(_))
    }

    pub const fn can_transition_to(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Extracting | Self::Error(_))
                | (Self::Extracting, Self::Analyzing | Self::Error(_))
                | (Self::Analyzing, Self::Validating | Self::Error(_))
                | (Self::Validating, Self::Displaying | Self::Error(_))
                | (Self::Displaying | Self::Error(_), Self::Idle)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Extracting => f.write_str("extracting"),
            Self::Analyzing => f.write_str("analyzing"),
            Self::Validating => f.write_str("validating"),
            Self::Displaying => f.write_str("displaying"),
            Self::Error(kind) => write!(f, "error({kind})"),
        }
    }
}

/// Result of the add-to-cart flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddToCartOutcome {
    pub entry: CartEntry,
    pub cart: CartSummary,
    pub points_earned: u64,
    pub total_points: u64,
    pub unlocked: bool,
    /// The credit moved the total across the unlock threshold.
    pub crossed_threshold: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            PipelineState::Idle,
            PipelineState::Extracting,
            PipelineState::Analyzing,
            PipelineState::Validating,
            PipelineState::Displaying,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(&pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_no_automatic_return_to_idle_mid_flight() {
        assert!(!PipelineState::Analyzing.can_transition_to(&PipelineState::Idle));
        assert!(!PipelineState::Extracting.can_transition_to(&PipelineState::Displaying));
        assert!(PipelineState::Error(ErrorKind::AuthError).can_transition_to(&PipelineState::Idle));
        assert!(PipelineState::Displaying.is_terminal());
    }

    #[test]
    fn test_error_state_display() {
        let state = PipelineState::Error(ErrorKind::MissingCredential);
        assert_eq!(state.to_string(), "error(missing_credential)");
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["state"], "error");
        assert_eq!(json["error"], "missing_credential");
    }
}
