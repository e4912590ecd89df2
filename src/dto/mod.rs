pub mod health;
pub mod scoreboard;
pub mod sse;
