//! Line-level handling of the newline-delimited JSON stream.
//!
//! Each line is one JSON object. Objects carrying an `event` discriminator
//! are either heartbeats, which are never delivered, or envelopes whose
//! payload sits under the key named by the event.

use serde_json::Value;

/// Discriminator value of keep-alive messages.
pub const HEARTBEAT: &str = "heartbeat";

/// What became of one line of the stream.
#[derive(Debug)]
pub enum LineOutcome {
    /// Keep-alive message.
    Heartbeat,
    /// Blank line or an event other than the one subscribed to.
    Filtered,
    /// The line is not a JSON object.
    Malformed(serde_json::Error),
    /// Payload to decode into a model.
    Payload(Value),
}

/// Unwraps stream lines into model payloads.
#[derive(Debug, Clone, Default)]
pub struct EventDecoder {
    filter: Option<String>,
}

impl EventDecoder {
    /// Decoder passing whole objects through.
    #[must_use]
    pub const fn new() -> Self {
        Self { filter: None }
    }

    /// Decoder unwrapping `{"event": filter, filter: {...}}` envelopes.
    #[must_use]
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
        }
    }

    /// Event name this decoder unwraps, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Classify one raw line.
    pub fn decode_line(&self, line: &[u8]) -> LineOutcome {
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            return LineOutcome::Filtered;
        }
        match serde_json::from_slice::<Value>(trimmed) {
            Ok(message) => self.unwrap(message),
            Err(e) => LineOutcome::Malformed(e),
        }
    }

    fn unwrap(&self, mut message: Value) -> LineOutcome {
        let event = message.get("event").and_then(Value::as_str).map(str::to_owned);
        match (event.as_deref(), self.filter.as_deref()) {
            (Some(HEARTBEAT), _) => LineOutcome::Heartbeat,
            (Some(event), Some(filter)) if event == filter => {
                LineOutcome::Payload(message.get_mut(filter).map(Value::take).unwrap_or_default())
            }
            (Some(_), Some(_)) => LineOutcome::Filtered,
            _ => LineOutcome::Payload(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(outcome: LineOutcome) -> Value {
        match outcome {
            LineOutcome::Payload(value) => value,
            other => panic!("expected payload, got {other:?}"),
        }
    }

    #[test]
    fn heartbeats_are_recognised_with_or_without_filter() {
        let line = br#"{"event": "heartbeat"}"#;
        assert!(matches!(EventDecoder::new().decode_line(line), LineOutcome::Heartbeat));
        assert!(matches!(
            EventDecoder::with_filter("order").decode_line(line),
            LineOutcome::Heartbeat
        ));
    }

    #[test]
    fn matching_events_are_unwrapped() {
        let decoder = EventDecoder::with_filter("order");
        let line = br#"{"event": "order", "order": {"orderId": "1"}}"#;
        assert_eq!(payload(decoder.decode_line(line)), json!({"orderId": "1"}));
    }

    #[test]
    fn other_events_are_filtered() {
        let decoder = EventDecoder::with_filter("order");
        let line = br#"{"event": "trade", "trade": {"orderId": "1"}}"#;
        assert!(matches!(decoder.decode_line(line), LineOutcome::Filtered));
    }

    #[test]
    fn unfiltered_objects_pass_through() {
        let line = br#"{"symbolId": "AAPL.NASDAQ", "bid": "1.5"}"#;
        assert_eq!(
            payload(EventDecoder::new().decode_line(line)),
            json!({"symbolId": "AAPL.NASDAQ", "bid": "1.5"})
        );
        let bare = br#"{"orderId": "2"}"#;
        assert_eq!(
            payload(EventDecoder::with_filter("order").decode_line(bare)),
            json!({"orderId": "2"})
        );
    }

    #[test]
    fn malformed_and_blank_lines() {
        assert!(matches!(
            EventDecoder::new().decode_line(b"{not json"),
            LineOutcome::Malformed(_)
        ));
        assert!(matches!(EventDecoder::new().decode_line(b"  \r"), LineOutcome::Filtered));
    }
}
