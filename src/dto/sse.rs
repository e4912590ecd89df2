use serde::Serialize;

use crate::dto::scoreboard::ScoreboardResponse;

/// Event name carrying a full scoreboard snapshot.
pub const EVENT_SCOREBOARD: &str = "scoreboard";

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }

    /// Snapshot event pushed after every handled scoreboard request.
    pub fn scoreboard(snapshot: &ScoreboardResponse) -> serde_json::Result<Self> {
        Self::json(Some(EVENT_SCOREBOARD.to_string()), snapshot)
    }
}
