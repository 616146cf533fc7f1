//! SSE frames and the per-connection write handle.

use axum::response::sse::Event;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Frames buffered per connection before the client counts as gone.
pub const CONNECTION_BUFFER: usize = 256;

/// A single frame written to an event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// A comment line, ignored by `EventSource` but flushes the stream.
    Comment(String),
    /// A named event with a JSON data line.
    Event { event: String, data: String },
}

impl SseFrame {
    /// Text encoding as it appears on the wire.
    pub fn encode(&self) -> String {
        match self {
            SseFrame::Comment(text) => format!(":{text}\n\n"),
            SseFrame::Event { event, data } => format!("event: {event}\ndata: {data}\n\n"),
        }
    }

    pub fn into_event(self) -> Event {
        match self {
            SseFrame::Comment(text) => Event::default().comment(text),
            SseFrame::Event { event, data } => Event::default().event(event).data(data),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,
    #[error("connection buffer full")]
    Full,
}

/// Write side of one open event stream.
pub trait SseTransport: Send + Sync {
    /// Queue a frame without blocking.
    fn send(&self, frame: SseFrame) -> Result<(), TransportError>;

    /// Close the stream. Closing twice is an error the caller may ignore.
    fn close(&self) -> Result<(), TransportError>;
}

/// Transport backed by a bounded channel drained by the HTTP response body.
pub struct ChannelTransport {
    tx: Mutex<Option<mpsc::Sender<SseFrame>>>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::Receiver<SseFrame>) {
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER);
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }
}

impl SseTransport for ChannelTransport {
    fn send(&self, frame: SseFrame) -> Result<(), TransportError> {
        let guard = self.tx.lock();
        let tx = guard.as_ref().ok_or(TransportError::Closed)?;
        tx.try_send(frame).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => TransportError::Full,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }

    fn close(&self) -> Result<(), TransportError> {
        // Dropping the sender ends the response stream.
        self.tx.lock().take().map(drop).ok_or(TransportError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_frame_wire_format() {
        let frame = SseFrame::Event {
            event: "notification:new".to_string(),
            data: r#"{"orderId":"42"}"#.to_string(),
        };
        assert_eq!(
            frame.encode(),
            "event: notification:new\ndata: {\"orderId\":\"42\"}\n\n"
        );
        assert_eq!(SseFrame::Comment(String::new()).encode(), ":\n\n");
    }

    #[tokio::test]
    async fn channel_transport_delivers_then_closes() {
        let (transport, mut rx) = ChannelTransport::new();
        transport.send(SseFrame::Comment("hi".into())).unwrap();
        assert_eq!(rx.recv().await, Some(SseFrame::Comment("hi".into())));

        transport.close().unwrap();
        assert_eq!(rx.recv().await, None);
        assert_eq!(transport.close(), Err(TransportError::Closed));
        assert_eq!(
            transport.send(SseFrame::Comment("late".into())),
            Err(TransportError::Closed)
        );
    }

    #[test]
    fn send_fails_once_receiver_is_dropped() {
        let (transport, rx) = ChannelTransport::new();
        drop(rx);
        assert_eq!(
            transport.send(SseFrame::Comment(String::new())),
            Err(TransportError::Closed)
        );
    }

    #[test]
    fn send_fails_when_buffer_is_full() {
        let (transport, _rx) = ChannelTransport::new();
        for _ in 0..CONNECTION_BUFFER {
            transport.send(SseFrame::Comment(String::new())).unwrap();
        }
        assert_eq!(
            transport.send(SseFrame::Comment(String::new())),
            Err(TransportError::Full)
        );
    }
}
