use thiserror::Error;

use crate::state::match_state::{DRAW, MatchRules, MatchState, Side, labels_are_distinct};

/// High-level phases the match can be in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPhase {
    /// Clock is paused (or was never started); names can be edited.
    Idle,
    /// Clock is ticking and points can be scored.
    Running,
    /// A terminal condition was reached; only a reset leaves this phase.
    Finished(String),
}

impl MatchPhase {
    /// Derive the phase from a stored state.
    pub fn of(state: &MatchState) -> Self {
        match (&state.winner_name, state.timer_running) {
            (Some(winner), _) => MatchPhase::Finished(winner.clone()),
            (None, true) => MatchPhase::Running,
            (None, false) => MatchPhase::Idle,
        }
    }
}

/// Commands understood by the state machine. At most one is applied per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchCommand {
    /// Throw the current match away and start over from defaults.
    Reset,
    /// Start or resume the countdown from the banked time.
    StartTimer,
    /// Pause the countdown, banking what is left.
    StopTimer,
    /// Start when paused, pause when running.
    ToggleTimer,
    /// Award points to one side.
    AddScore {
        /// Side receiving the points.
        side: Side,
        /// Strictly positive number of points.
        points: u32,
    },
    /// Relabel one or both sides.
    Rename {
        /// New label for the left side, if any.
        left: Option<String>,
        /// New label for the right side, if any.
        right: Option<String>,
    },
}

/// Why a command left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IgnoreReason {
    /// The match already has a winner.
    #[error("match already finished")]
    MatchFinished,
    /// The clock has nothing left to count down.
    #[error("no time left on the clock")]
    NoTimeLeft,
    /// The command needs a running clock.
    #[error("timer is not running")]
    TimerStopped,
    /// The command needs a paused clock.
    #[error("timer is running")]
    TimerRunning,
    /// The new label would make the winner ambiguous.
    #[error("name clashes with the other side or the draw label")]
    NameConflict,
}

/// A command that was received but had no effect. Not an error for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ignored {command:?} while {phase:?}: {reason}")]
pub struct IgnoredCommand {
    /// Phase the match was in when the command arrived.
    pub phase: MatchPhase,
    /// The command itself.
    pub command: MatchCommand,
    /// Why nothing happened.
    pub reason: IgnoreReason,
}

/// Result of running one request through the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State to persist.
    pub state: MatchState,
    /// Countdown value at the time of the request.
    pub current_remaining_ms: u64,
    /// Set when the command was a no-op.
    pub ignored: Option<IgnoredCommand>,
}

/// Pure scoreboard transition logic: commands in, next state out.
#[derive(Debug, Clone, Default)]
pub struct MatchStateMachine {
    rules: MatchRules,
}

impl MatchStateMachine {
    /// Build a state machine enforcing `rules`.
    pub fn new(rules: MatchRules) -> Self {
        Self { rules }
    }

    /// Rules the machine enforces.
    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    /// The state a fresh or reset match starts from.
    pub fn initial_state(&self) -> MatchState {
        MatchState::new(&self.rules)
    }

    /// Apply `command` (if any) at `now_ms`, then expire the clock and evaluate the winner.
    pub fn apply(
        &self,
        state: MatchState,
        command: Option<MatchCommand>,
        now_ms: u64,
    ) -> Transition {
        let (mut next, ignored) = match command {
            None => (state, None),
            Some(command) => match self.compute_transition(&state, &command, now_ms) {
                Ok(next) => (next, None),
                Err(reason) => {
                    let ignored = IgnoredCommand {
                        phase: MatchPhase::of(&state),
                        command,
                        reason,
                    };
                    (state, Some(ignored))
                }
            },
        };

        let current_remaining_ms = self.settle(&mut next, now_ms);

        Transition {
            state: next,
            current_remaining_ms,
            ignored,
        }
    }

    /// Decide the winner for `state` given the live countdown value.
    ///
    /// A stored winner is returned as-is, so evaluating a finished match is idempotent.
    pub fn evaluate_winner(
        &self,
        state: &MatchState,
        current_remaining_ms: u64,
    ) -> Option<String> {
        if let Some(winner) = &state.winner_name {
            return Some(winner.clone());
        }

        let (left, right) = (state.score_left, state.score_right);

        if left >= self.rules.win_score {
            return Some(state.name(Side::Left).to_string());
        }
        if right >= self.rules.win_score {
            return Some(state.name(Side::Right).to_string());
        }
        if left.abs_diff(right) >= self.rules.win_margin && (left > 0 || right > 0) {
            return Some(Self::leader(state));
        }
        if current_remaining_ms == 0 {
            return Some(Self::leader(state));
        }

        None
    }

    fn leader(state: &MatchState) -> String {
        match state.score_left.cmp(&state.score_right) {
            std::cmp::Ordering::Greater => state.name(Side::Left).to_string(),
            std::cmp::Ordering::Less => state.name(Side::Right).to_string(),
            std::cmp::Ordering::Equal => DRAW.to_string(),
        }
    }

    /// Compute the next state for a command, or the reason it does not apply.
    fn compute_transition(
        &self,
        state: &MatchState,
        command: &MatchCommand,
        now_ms: u64,
    ) -> Result<MatchState, IgnoreReason> {
        let mut next = state.clone();
        match command {
            MatchCommand::Reset => return Ok(self.initial_state()),
            _ if state.is_finished() => return Err(IgnoreReason::MatchFinished),
            MatchCommand::StartTimer => Self::start(&mut next, now_ms)?,
            MatchCommand::StopTimer => Self::pause(&mut next, now_ms)?,
            MatchCommand::ToggleTimer if next.timer_running => Self::pause(&mut next, now_ms)?,
            MatchCommand::ToggleTimer => Self::start(&mut next, now_ms)?,
            MatchCommand::AddScore { side, points } => {
                if !next.timer_running {
                    return Err(IgnoreReason::TimerStopped);
                }
                if next.current_remaining_ms(now_ms) == 0 {
                    return Err(IgnoreReason::NoTimeLeft);
                }
                next.add_score(*side, *points);
            }
            MatchCommand::Rename { left, right } => {
                if next.timer_running {
                    return Err(IgnoreReason::TimerRunning);
                }
                if let Some(name) = left {
                    next.name_left = name.clone();
                }
                if let Some(name) = right {
                    next.name_right = name.clone();
                }
                if !labels_are_distinct(&next.name_left, &next.name_right) {
                    return Err(IgnoreReason::NameConflict);
                }
            }
        }

        Ok(next)
    }

    fn start(state: &mut MatchState, now_ms: u64) -> Result<(), IgnoreReason> {
        if state.timer_running {
            return Err(IgnoreReason::TimerRunning);
        }
        if state.remaining_time_ms == 0 {
            return Err(IgnoreReason::NoTimeLeft);
        }

        state.timer_running = true;
        state.last_start_time_ms = now_ms;
        Ok(())
    }

    fn pause(state: &mut MatchState, now_ms: u64) -> Result<(), IgnoreReason> {
        if !state.timer_running {
            return Err(IgnoreReason::TimerStopped);
        }

        let remaining = state.current_remaining_ms(now_ms);
        state.bank(remaining);
        Ok(())
    }

    /// Expire the clock and freeze the match once a terminal condition holds.
    /// Returns the countdown value at `now_ms`.
    fn settle(&self, state: &mut MatchState, now_ms: u64) -> u64 {
        let current = state.current_remaining_ms(now_ms);

        if state.timer_running && current == 0 {
            state.bank(0);
        }

        if !state.is_finished() {
            if let Some(winner) = self.evaluate_winner(state, current) {
                if state.timer_running {
                    state.bank(current);
                }
                state.winner_name = Some(winner);
            }
        }

        current
    }
}
