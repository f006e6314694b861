//! Stream Consumer
//!
//! Owns one background reader per subscription. The reader opens the
//! streaming GET, splits the body into lines, decodes them into models and
//! pushes them onto an unbounded FIFO queue. A dropped connection is reopened
//! according to the configured [`ReconnectMode`] until the consumer is
//! stopped or dropped.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::StreamExt;
use parking_lot::RwLock;
use reqwest::StatusCode;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::envelope::{EventDecoder, LineOutcome};
use super::reconnect::{ReconnectMode, ReconnectPolicy};
use crate::infrastructure::http::StreamTarget;
use crate::registry::{SchemaVariant, Versioned};
use crate::serialization::SchemaError;

/// Default time a connection may stay silent before it is considered dead.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors returned by [`StreamConsumer::get`].
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Nothing was queued within the wait.
    #[error("stream queue is empty")]
    Empty,
    /// A line did not fit the model in strict mode.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The consumer was stopped and every queued item has been taken.
    #[error("stream is stopped")]
    Stopped,
    /// Consumers can only be started inside a tokio runtime.
    #[error("no tokio runtime available to drive the stream")]
    NoRuntime,
}

/// Lifecycle of a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Opening (or reopening) the connection.
    Connecting,
    /// Reading lines from an open connection.
    Streaming,
    /// The reader has exited.
    Stopped,
}

/// Tuning of a consumer.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Deliver schema failures through [`StreamConsumer::get`] instead of
    /// logging and skipping them.
    pub strict: bool,
    /// Maximum silence between two chunks.
    pub idle_timeout: Duration,
    /// Reaction to a dropped connection.
    pub reconnect: ReconnectMode,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            strict: false,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            reconnect: ReconnectMode::Immediate,
        }
    }
}

impl StreamSettings {
    /// Set strict decoding.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the idle timeout.
    #[must_use]
    pub const fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Set the reconnect mode.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectMode) -> Self {
        self.reconnect = reconnect;
        self
    }
}

type Item<T> = Result<T, SchemaError>;

struct Shared {
    state: RwLock<StreamState>,
    reconnects: AtomicU64,
}

impl Shared {
    fn set_state(&self, state: StreamState) {
        *self.state.write() = state;
    }
}

/// Consumer of one streaming subscription delivering `T`.
pub struct StreamConsumer<T: Versioned> {
    session_id: Uuid,
    url: String,
    receiver: Mutex<mpsc::UnboundedReceiver<Item<T>>>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<T: Versioned> StreamConsumer<T> {
    /// Start reading `target`, decoding lines with `variant`.
    ///
    /// Returns immediately; the connection is opened by the background
    /// reader.
    pub fn spawn(
        target: StreamTarget,
        decoder: EventDecoder,
        variant: &'static SchemaVariant<T>,
        settings: StreamSettings,
    ) -> Result<Self, StreamError> {
        let handle = Handle::try_current().map_err(|_| StreamError::NoRuntime)?;
        let session_id = Uuid::new_v4();
        let url = target.url().to_string();
        let (sender, receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            state: RwLock::new(StreamState::Connecting),
            reconnects: AtomicU64::new(0),
        });
        let cancel = CancellationToken::new();

        tracing::info!(
            session_id = %session_id,
            url = %url,
            model = variant.descriptor.name,
            filter = decoder.filter(),
            "starting stream consumer"
        );

        let reader = Reader {
            session_id,
            target,
            decoder,
            variant,
            settings,
            sender,
            shared: Arc::clone(&shared),
            cancel: cancel.clone(),
        };
        let task = handle.spawn(reader.run());

        Ok(Self {
            session_id,
            url,
            receiver: Mutex::new(receiver),
            shared,
            cancel,
            task: Some(task),
        })
    }

    /// Take the next queued item.
    ///
    /// With `block` the call waits, up to `timeout` when one is given. When
    /// nothing arrives, `raise_on_empty` selects between `Ok(None)` and
    /// [`StreamError::Empty`]. A stopped consumer keeps handing out what was
    /// queued before it stopped, then fails with [`StreamError::Stopped`].
    pub async fn get(
        &self,
        block: bool,
        timeout: Option<Duration>,
        raise_on_empty: bool,
    ) -> Result<Option<T>, StreamError> {
        let mut receiver = self.receiver.lock().await;
        let received = match (block, timeout) {
            (false, _) => match receiver.try_recv() {
                Ok(item) => Received::Item(item),
                Err(mpsc::error::TryRecvError::Empty) => Received::Nothing,
                Err(mpsc::error::TryRecvError::Disconnected) => Received::Closed,
            },
            (true, Some(timeout)) => match tokio::time::timeout(timeout, receiver.recv()).await {
                Ok(Some(item)) => Received::Item(item),
                Ok(None) => Received::Closed,
                Err(_) => Received::Nothing,
            },
            (true, None) => receiver.recv().await.map_or(Received::Closed, Received::Item),
        };

        match received {
            Received::Item(item) => Ok(Some(item?)),
            Received::Nothing if raise_on_empty => Err(StreamError::Empty),
            Received::Nothing => Ok(None),
            Received::Closed => Err(StreamError::Stopped),
        }
    }

    /// Take the next queued item without waiting.
    pub async fn try_get(&self) -> Result<Option<T>, StreamError> {
        self.get(false, None, false).await
    }

    /// Stop reading and wait for the reader to exit. Idempotent.
    ///
    /// Items queued before the stop can still be taken with [`Self::get`].
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(session_id = %self.session_id, error = %e, "stream reader ended abnormally");
            }
            self.shared.set_state(StreamState::Stopped);
            tracing::info!(session_id = %self.session_id, "stream consumer stopped");
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> StreamState {
        *self.shared.state.read()
    }

    /// Number of times the connection was reopened.
    #[must_use]
    pub fn reconnects(&self) -> u64 {
        self.shared.reconnects.load(Ordering::Relaxed)
    }

    /// Identifier of this subscription in log events.
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Stream URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<T: Versioned> Drop for StreamConsumer<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<T: Versioned> fmt::Debug for StreamConsumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConsumer")
            .field("session_id", &self.session_id)
            .field("url", &self.url)
            .field("state", &self.state())
            .field("reconnects", &self.reconnects())
            .finish_non_exhaustive()
    }
}

enum Received<T> {
    Item(Item<T>),
    Nothing,
    Closed,
}

// =============================================================================
// Background reader
// =============================================================================

#[derive(Debug, thiserror::Error)]
enum SessionError {
    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("read failed: {0}")]
    Read(#[source] reqwest::Error),
    #[error("no data for {0:?}")]
    Idle(Duration),
}

enum SessionEnd {
    /// The server closed the body.
    Closed,
    /// The consumer is gone; nobody is left to deliver to.
    Abandoned,
}

struct Reader<T: 'static> {
    session_id: Uuid,
    target: StreamTarget,
    decoder: EventDecoder,
    variant: &'static SchemaVariant<T>,
    settings: StreamSettings,
    sender: mpsc::UnboundedSender<Item<T>>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl<T: Versioned> Reader<T> {
    async fn run(self) {
        let mut policy = self.settings.reconnect.policy();
        let mut opened = false;

        loop {
            if opened {
                self.shared.reconnects.fetch_add(1, Ordering::Relaxed);
            }
            opened = true;
            self.shared.set_state(StreamState::Connecting);

            let outcome = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                outcome = self.session(&mut policy) => outcome,
            };

            match outcome {
                Ok(SessionEnd::Abandoned) => break,
                Ok(SessionEnd::Closed) => {
                    tracing::warn!(session_id = %self.session_id, "stream closed by server, reconnecting");
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %self.session_id,
                        error = %e,
                        attempt = policy.attempt_count() + 1,
                        "stream connection lost, reconnecting"
                    );
                }
            }

            let Some(delay) = policy.next_delay() else {
                tracing::error!(
                    session_id = %self.session_id,
                    attempts = policy.attempt_count(),
                    "reconnection attempts exhausted, giving up"
                );
                break;
            };
            if !delay.is_zero() {
                tracing::debug!(session_id = %self.session_id, delay_ms = delay.as_millis(), "waiting before reconnect");
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }

        self.shared.set_state(StreamState::Stopped);
        tracing::debug!(session_id = %self.session_id, "stream reader exited");
    }

    async fn session(&self, policy: &mut ReconnectPolicy) -> Result<SessionEnd, SessionError> {
        let response = self.target.connect().await.map_err(SessionError::Connect)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Status(status));
        }

        policy.reset();
        self.shared.set_state(StreamState::Streaming);
        tracing::info!(session_id = %self.session_id, status = status.as_u16(), "stream connected");

        let mut body = std::pin::pin!(response.bytes_stream());
        let mut buffer: Vec<u8> = Vec::new();
        loop {
            let chunk = match tokio::time::timeout(self.settings.idle_timeout, body.next()).await {
                Err(_) => return Err(SessionError::Idle(self.settings.idle_timeout)),
                Ok(None) => {
                    if !buffer.is_empty() && !self.handle_line(&buffer) {
                        return Ok(SessionEnd::Abandoned);
                    }
                    return Ok(SessionEnd::Closed);
                }
                Ok(Some(Err(e))) => return Err(SessionError::Read(e)),
                Ok(Some(Ok(chunk))) => chunk,
            };
            buffer.extend_from_slice(&chunk);
            while let Some(end) = buffer.iter().position(|byte| *byte == b'\n') {
                let line: Vec<u8> = buffer.drain(..=end).collect();
                if !self.handle_line(&line) {
                    return Ok(SessionEnd::Abandoned);
                }
            }
        }
    }

    /// Decode and enqueue one line. Returns `false` once the queue is closed.
    fn handle_line(&self, line: &[u8]) -> bool {
        let payload = match self.decoder.decode_line(line) {
            LineOutcome::Heartbeat => {
                tracing::trace!(session_id = %self.session_id, "heartbeat");
                return true;
            }
            LineOutcome::Filtered => return true,
            LineOutcome::Malformed(e) => {
                tracing::error!(
                    session_id = %self.session_id,
                    error = %e,
                    line = %String::from_utf8_lossy(line).trim_end(),
                    "malformed stream line, skipping"
                );
                return true;
            }
            LineOutcome::Payload(payload) => payload,
        };

        match self.variant.decode(&payload, self.settings.strict) {
            Ok(Some(decoded)) => decoded
                .into_vec()
                .into_iter()
                .all(|item| self.sender.send(Ok(item)).is_ok()),
            Ok(None) => true,
            Err(e) => self.sender.send(Err(e)).is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = StreamSettings::default();
        assert!(!settings.strict);
        assert_eq!(settings.idle_timeout, DEFAULT_IDLE_TIMEOUT);
        assert_eq!(settings.reconnect, ReconnectMode::Immediate);
    }

    #[test]
    fn spawning_requires_a_runtime() {
        use crate::domain::ApiVersion;
        use crate::domain::models::Order;
        use crate::infrastructure::auth::Authenticator;
        use crate::registry::ModelRegistry;

        let registry = ModelRegistry::new().unwrap();
        let variant = registry.variant::<Order>(ApiVersion::V3).unwrap();
        let target = StreamTarget::new(
            reqwest::Client::new(),
            Authenticator::basic("app", "key").unwrap(),
            "http://127.0.0.1:9/trade/3.0/stream/orders".into(),
            Vec::new(),
        );
        let result = StreamConsumer::spawn(
            target,
            EventDecoder::with_filter("order"),
            variant,
            StreamSettings::default(),
        );
        assert!(matches!(result, Err(StreamError::NoRuntime)));
    }
}
