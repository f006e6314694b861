//! Newline-delimited JSON stream consumption.

mod consumer;
mod envelope;
mod reconnect;

pub use consumer::{DEFAULT_IDLE_TIMEOUT, StreamConsumer, StreamError, StreamSettings, StreamState};
pub use envelope::{EventDecoder, HEARTBEAT, LineOutcome};
pub use reconnect::{ReconnectConfig, ReconnectMode, ReconnectPolicy};
