//! Request-level orchestration around the match state machine.

use tracing::{debug, info};

use crate::{
    dao::scoreboard::MatchRepository,
    dto::scoreboard::{ScoreboardQuery, ScoreboardResponse},
    error::ServiceError,
    services::sse_service,
    state::SharedState,
};

/// Load the match, apply the command carried by `query`, persist, and return the snapshot.
///
/// Commands that do not apply in the current phase are no-ops; only store failures and timeouts
/// are reported as errors.
pub async fn handle_request(
    state: &SharedState,
    query: ScoreboardQuery,
) -> Result<ScoreboardResponse, ServiceError> {
    let command = query.command();
    let repository = MatchRepository::new(
        state.store(),
        state.config().state_key(),
        state.config().rules().clone(),
    );

    let (ignored, snapshot) = state
        .run_transition(move || async move {
            let current = repository.load().await?;
            let was_finished = current.is_finished();

            let transition = state.machine().apply(current, command, state.now_ms());
            repository.save(&transition.state).await?;

            // inside the gate so displays see snapshots in commit order
            let snapshot =
                ScoreboardResponse::from_state(&transition.state, transition.current_remaining_ms);
            sse_service::broadcast_snapshot(state, &snapshot);

            if !was_finished {
                if let Some(winner) = &transition.state.winner_name {
                    info!(
                        winner = %winner,
                        score_left = transition.state.score_left,
                        score_right = transition.state.score_right,
                        "match finished"
                    );
                }
            }

            Ok::<_, ServiceError>((transition.ignored, snapshot))
        })
        .await?;

    if let Some(ignored) = &ignored {
        debug!(%ignored, "command had no effect");
    }

    Ok(snapshot)
}

/// Snapshot of a fresh match, returned alongside errors.
pub fn default_snapshot(state: &SharedState) -> ScoreboardResponse {
    let initial = state.machine().initial_state();
    ScoreboardResponse::from_state(&initial, initial.remaining_time_ms)
}
