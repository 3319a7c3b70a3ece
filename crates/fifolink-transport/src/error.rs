use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur in FIFO transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening the FIFO failed for a reason other than a missing peer.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No peer showed up before the time bound elapsed.
    #[error("timed out after {timeout:?} waiting on {path}")]
    Timeout { path: PathBuf, timeout: Duration },

    /// The writer closed its end without sending any data.
    #[error("peer unexpectedly closed {path}")]
    PeerHangup { path: PathBuf },

    /// Readiness wait reported an event other than input or hang-up.
    #[error("unexpected poll event {revents:#x} on {path}")]
    UnexpectedEvent { path: PathBuf, revents: i16 },

    /// The message did not fit into the receive buffer.
    #[error("receive buffer of {capacity} bytes is not big enough for message on {path}")]
    BufferTooSmall { path: PathBuf, capacity: usize },

    /// An I/O error occurred while transferring bytes.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether this error is the recoverable timeout outcome.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
