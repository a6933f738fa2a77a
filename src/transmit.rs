// Transmitter boundary - outbound records for the external connector
//
// The core pushes sealed measures and the final reconciled list through the
// Transmitter trait and never waits on delivery. The default implementation
// publishes records on a tokio broadcast channel the external connector
// subscribes to; delivery guarantees, retries and connection lifecycle are
// entirely the connector's responsibility.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::TransmitError;

/// Channel label for per-measure records.
pub const MEASURE_CHANNEL: &str = "measure";

/// Channel label for the final reconciled performance record.
pub const PERFORMANCE_CHANNEL: &str = "performance";

/// One outbound record: a channel label plus the comma-joined symbol text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRecord {
    pub channel: String,
    pub payload: String,
}

/// Fire-and-forget record transmission.
///
/// `send` must not block indefinitely; a failed send is recoverable and
/// never stops capture or persistence.
pub trait Transmitter: Send + Sync {
    fn send(&self, channel_label: &str, payload: &str) -> Result<(), TransmitError>;
}

/// Broadcast-channel transmitter
///
/// Publishes outbound records to any number of subscribers. Sending with no
/// active subscriber reports `ChannelClosed`, which callers treat as the
/// recoverable transmitter-unavailable condition.
pub struct BroadcastTransmitter {
    tx: broadcast::Sender<OutboundRecord>,
}

impl BroadcastTransmitter {
    /// Create a transmitter with the given channel buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to outbound records.
    ///
    /// Each subscriber gets an independent receiver; old records are dropped
    /// for lagged subscribers.
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundRecord> {
        self.tx.subscribe()
    }
}

impl Transmitter for BroadcastTransmitter {
    fn send(&self, channel_label: &str, payload: &str) -> Result<(), TransmitError> {
        let record = OutboundRecord {
            channel: channel_label.to_string(),
            payload: payload.to_string(),
        };
        self.tx
            .send(record)
            .map(|_| ())
            .map_err(|_| TransmitError::ChannelClosed)
    }
}
