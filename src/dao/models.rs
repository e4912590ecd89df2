use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::match_state::{DRAW, MatchRules, MatchState, labels_are_distinct};

/// Scoreboard document as stored under the state key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchStateEntity {
    pub score_left: u32,
    pub score_right: u32,
    pub name_left: String,
    pub name_right: String,
    pub timer_running: bool,
    pub remaining_time_ms: u64,
    pub last_start_time_ms: u64,
    #[serde(default)]
    pub winner_name: Option<String>,
}

/// Reasons a well-formed document still cannot be trusted as match state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidMatchState {
    #[error("timer marked running without a start timestamp")]
    RunningWithoutStart,
    #[error("remaining time {remaining_ms}ms exceeds match duration {duration_ms}ms")]
    RemainingExceedsDuration { remaining_ms: u64, duration_ms: u64 },
    #[error("winner `{winner}` is neither side nor a draw")]
    UnknownWinner { winner: String },
    #[error("side names `{left}` and `{right}` cannot be told apart")]
    ConflictingNames { left: String, right: String },
}

impl MatchStateEntity {
    /// Check the stored invariants and convert into the domain state.
    pub fn into_state(self, rules: &MatchRules) -> Result<MatchState, InvalidMatchState> {
        if self.timer_running && self.last_start_time_ms == 0 {
            return Err(InvalidMatchState::RunningWithoutStart);
        }

        if self.remaining_time_ms > rules.match_duration_ms {
            return Err(InvalidMatchState::RemainingExceedsDuration {
                remaining_ms: self.remaining_time_ms,
                duration_ms: rules.match_duration_ms,
            });
        }

        if !labels_are_distinct(&self.name_left, &self.name_right) {
            return Err(InvalidMatchState::ConflictingNames {
                left: self.name_left,
                right: self.name_right,
            });
        }

        if let Some(winner) = &self.winner_name {
            if winner != &self.name_left && winner != &self.name_right && winner != DRAW {
                return Err(InvalidMatchState::UnknownWinner {
                    winner: winner.clone(),
                });
            }
        }

        Ok(MatchState {
            score_left: self.score_left,
            score_right: self.score_right,
            name_left: self.name_left,
            name_right: self.name_right,
            timer_running: self.timer_running,
            remaining_time_ms: self.remaining_time_ms,
            last_start_time_ms: self.last_start_time_ms,
            winner_name: self.winner_name,
        })
    }
}

impl From<&MatchState> for MatchStateEntity {
    fn from(state: &MatchState) -> Self {
        Self {
            score_left: state.score_left,
            score_right: state.score_right,
            name_left: state.name_left.clone(),
            name_right: state.name_right.clone(),
            timer_running: state.timer_running,
            remaining_time_ms: state.remaining_time_ms,
            last_start_time_ms: state.last_start_time_ms,
            winner_name: state.winner_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entity() -> MatchStateEntity {
        MatchStateEntity::from(&MatchState::new(&MatchRules::default()))
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(entity()).unwrap();
        assert_eq!(
            value,
            json!({
                "scoreLeft": 0,
                "scoreRight": 0,
                "nameLeft": "PLAYER 1",
                "nameRight": "PLAYER 2",
                "timerRunning": false,
                "remainingTimeMs": 180000,
                "lastStartTimeMs": 0,
                "winnerName": null,
            })
        );
    }

    #[test]
    fn running_without_start_is_rejected() {
        let mut entity = entity();
        entity.timer_running = true;
        assert_eq!(
            entity.into_state(&MatchRules::default()),
            Err(InvalidMatchState::RunningWithoutStart)
        );
    }

    #[test]
    fn remaining_above_duration_is_rejected() {
        let mut entity = entity();
        entity.remaining_time_ms = 180_001;
        assert!(matches!(
            entity.into_state(&MatchRules::default()),
            Err(InvalidMatchState::RemainingExceedsDuration { .. })
        ));
    }

    #[test]
    fn winner_must_name_a_side_or_draw() {
        let mut entity = entity();
        entity.winner_name = Some("SOMEONE".into());
        assert!(entity.clone().into_state(&MatchRules::default()).is_err());

        entity.winner_name = Some(DRAW.into());
        assert!(entity.clone().into_state(&MatchRules::default()).is_ok());

        entity.winner_name = Some("PLAYER 2".into());
        assert!(entity.into_state(&MatchRules::default()).is_ok());
    }

    #[test]
    fn clashing_side_names_are_rejected() {
        let mut entity = entity();
        entity.name_left = "DRAW".into();
        assert!(matches!(
            entity.clone().into_state(&MatchRules::default()),
            Err(InvalidMatchState::ConflictingNames { .. })
        ));

        entity.name_left = "player 2".into();
        assert!(entity.into_state(&MatchRules::default()).is_err());
    }
}
