//! Match state value shared by the state machine, the repository, and the DTO layer.

/// Label recorded as the winner when both sides finish level on time.
pub const DRAW: &str = "DRAW";

/// Whether two side labels can both appear as a winner without being mistaken for each other
/// or for [`DRAW`]. Comparison ignores ASCII case.
pub fn labels_are_distinct(left: &str, right: &str) -> bool {
    !left.eq_ignore_ascii_case(right)
        && !left.eq_ignore_ascii_case(DRAW)
        && !right.eq_ignore_ascii_case(DRAW)
}

/// Tunable parameters of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRules {
    /// Full length of the countdown, in milliseconds.
    pub match_duration_ms: u64,
    /// Score that wins the match outright.
    pub win_score: u32,
    /// Lead that wins the match before time runs out.
    pub win_margin: u32,
    /// Default label of the left side.
    pub left_name: String,
    /// Default label of the right side.
    pub right_name: String,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            match_duration_ms: 180_000,
            win_score: 10,
            win_margin: 8,
            left_name: "PLAYER 1".into(),
            right_name: "PLAYER 2".into(),
        }
    }
}

/// One of the two competing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left side of the board (`kiri`).
    Left,
    /// Right side of the board (`kanan`).
    Right,
}

/// Complete scoreboard state, persisted as a single singleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    /// Points accumulated by the left side.
    pub score_left: u32,
    /// Points accumulated by the right side.
    pub score_right: u32,
    /// Display label of the left side.
    pub name_left: String,
    /// Display label of the right side.
    pub name_right: String,
    /// Whether the countdown is ticking.
    pub timer_running: bool,
    /// Time banked at the last pause or reset.
    pub remaining_time_ms: u64,
    /// Epoch milliseconds of the last start/resume, `0` while paused.
    pub last_start_time_ms: u64,
    /// Winner label once a terminal condition has been reached.
    pub winner_name: Option<String>,
}

impl MatchState {
    /// Fresh state with full time on the clock and default labels.
    pub fn new(rules: &MatchRules) -> Self {
        Self {
            score_left: 0,
            score_right: 0,
            name_left: rules.left_name.clone(),
            name_right: rules.right_name.clone(),
            timer_running: false,
            remaining_time_ms: rules.match_duration_ms,
            last_start_time_ms: 0,
            winner_name: None,
        }
    }

    /// Live countdown value at `now_ms`.
    ///
    /// While paused this is the banked time. While running the wall time elapsed since the last
    /// start is subtracted, clamped at zero; a clock that moved backwards counts as no elapsed time.
    pub fn current_remaining_ms(&self, now_ms: u64) -> u64 {
        if !self.timer_running {
            return self.remaining_time_ms;
        }

        let elapsed = now_ms.saturating_sub(self.last_start_time_ms);
        self.remaining_time_ms.saturating_sub(elapsed)
    }

    /// Score of the given side.
    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.score_left,
            Side::Right => self.score_right,
        }
    }

    /// Display label of the given side.
    pub fn name(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.name_left,
            Side::Right => &self.name_right,
        }
    }

    /// Whether a winner has been recorded.
    pub fn is_finished(&self) -> bool {
        self.winner_name.is_some()
    }

    pub(crate) fn add_score(&mut self, side: Side, points: u32) {
        let slot = match side {
            Side::Left => &mut self.score_left,
            Side::Right => &mut self.score_right,
        };
        *slot = slot.saturating_add(points);
    }

    /// Stop the clock, banking `remaining_ms`.
    pub(crate) fn bank(&mut self, remaining_ms: u64) {
        self.timer_running = false;
        self.remaining_time_ms = remaining_ms;
        self.last_start_time_ms = 0;
    }
}
