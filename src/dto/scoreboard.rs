use serde::Serialize;
use utoipa::{IntoParams, ToSchema};

use crate::state::{
    match_state::{MatchState, Side},
    state_machine::MatchCommand,
};

/// Values that switch a flag off. Anything else, including an empty value, switches it on.
const FALSY: [&str; 4] = ["0", "false", "off", "no"];

/// Query parameters accepted by the scoreboard endpoint.
///
/// All parameters are optional and at most one command is applied per request, in this order:
/// reset, start, stop, toggle, score (left before right), rename. Values that cannot be used are
/// ignored rather than rejected.
#[derive(Debug, Default, Clone, PartialEq, Eq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScoreboardQuery {
    /// Any truthy value resets the whole match.
    pub reset_skor: Option<String>,
    /// Legacy remote reset button (`reset_kiri=1`).
    pub reset_kiri: Option<String>,
    /// Start or resume the countdown.
    pub start_timer: Option<String>,
    /// Pause the countdown.
    pub stop_timer: Option<String>,
    /// Start when paused, pause when running.
    pub toggle_timer: Option<String>,
    /// Legacy remote timer control: `start`, `pause`/`stop`, or `toggle`.
    pub timer: Option<String>,
    /// Points to add to the left side.
    pub score_kiri: Option<String>,
    /// Points to add to the right side.
    pub score_kanan: Option<String>,
    /// New label for the left side.
    pub nama_kiri: Option<String>,
    /// New label for the right side.
    pub nama_kanan: Option<String>,
}

impl ScoreboardQuery {
    /// Collect known parameters from raw query pairs. The first occurrence of a key wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "reset_skor" => &mut query.reset_skor,
                "reset_kiri" => &mut query.reset_kiri,
                "start_timer" => &mut query.start_timer,
                "stop_timer" => &mut query.stop_timer,
                "toggle_timer" => &mut query.toggle_timer,
                "timer" => &mut query.timer,
                "score_kiri" => &mut query.score_kiri,
                "score_kanan" => &mut query.score_kanan,
                "nama_kiri" => &mut query.nama_kiri,
                "nama_kanan" => &mut query.nama_kanan,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    /// Decode the single command this request carries, if any.
    pub fn command(&self) -> Option<MatchCommand> {
        if is_truthy(&self.reset_skor) || is_truthy(&self.reset_kiri) {
            return Some(MatchCommand::Reset);
        }

        let legacy_timer = self
            .timer
            .as_deref()
            .map(|value| value.trim().to_ascii_lowercase());
        let legacy_timer = legacy_timer.as_deref();

        if is_truthy(&self.start_timer) || legacy_timer == Some("start") {
            return Some(MatchCommand::StartTimer);
        }
        if is_truthy(&self.stop_timer) || matches!(legacy_timer, Some("pause" | "stop")) {
            return Some(MatchCommand::StopTimer);
        }
        if is_truthy(&self.toggle_timer) || legacy_timer == Some("toggle") {
            return Some(MatchCommand::ToggleTimer);
        }

        if let Some(points) = parse_points(&self.score_kiri) {
            return Some(MatchCommand::AddScore {
                side: Side::Left,
                points,
            });
        }
        if let Some(points) = parse_points(&self.score_kanan) {
            return Some(MatchCommand::AddScore {
                side: Side::Right,
                points,
            });
        }

        let left = parse_name(&self.nama_kiri);
        let right = parse_name(&self.nama_kanan);
        if left.is_some() || right.is_some() {
            return Some(MatchCommand::Rename { left, right });
        }

        None
    }
}

fn is_truthy(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| {
        let value = value.trim();
        !FALSY.iter().any(|falsy| value.eq_ignore_ascii_case(falsy))
    })
}

fn parse_points(value: &Option<String>) -> Option<u32> {
    value
        .as_deref()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|points| *points > 0)
}

fn parse_name(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Scoreboard snapshot returned to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardResponse {
    /// Points of the left side.
    pub score_left: u32,
    /// Points of the right side.
    pub score_right: u32,
    /// Label of the left side.
    pub name_left: String,
    /// Label of the right side.
    pub name_right: String,
    /// Whether the countdown is ticking.
    pub timer_running: bool,
    /// Time banked at the last pause or reset.
    pub remaining_time_ms: u64,
    /// Epoch milliseconds of the last start, `0` while paused.
    pub last_start_time_ms: u64,
    /// Winner label (`DRAW` on a tie), `null` while the match is open.
    pub winner_name: Option<String>,
    /// Live countdown value computed for this request.
    pub current_remaining_time_ms: u64,
}

impl ScoreboardResponse {
    /// Project a state and its live countdown value.
    pub fn from_state(state: &MatchState, current_remaining_ms: u64) -> Self {
        Self {
            score_left: state.score_left,
            score_right: state.score_right,
            name_left: state.name_left.clone(),
            name_right: state.name_right.clone(),
            timer_running: state.timer_running,
            remaining_time_ms: state.remaining_time_ms,
            last_start_time_ms: state.last_start_time_ms,
            winner_name: state.winner_name.clone(),
            current_remaining_time_ms: current_remaining_ms,
        }
    }
}
