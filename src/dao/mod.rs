/// Persisted document shapes.
pub mod models;
/// Typed access to the scoreboard singleton.
pub mod scoreboard;
/// Key-value backends holding the scoreboard document.
pub mod state_store;
/// Storage abstraction layer for backend errors.
pub mod storage;
