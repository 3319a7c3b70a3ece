use std::path::PathBuf;

use fifolink_transport::TransportError;

/// Errors that can occur in link operations.
///
/// Timeouts and bad acknowledgements are expected outcomes callers branch on
/// (see [`LinkError::is_recoverable`]). Everything else means the channel
/// directory or the caller is broken.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// No channel directory was handed over and none was inherited.
    #[error("channel directory unknown: no owned directory and LTP_FIFO_PATH not set")]
    NotInitialized,

    /// The link name cannot be used as a file name component.
    #[error("invalid link name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// The message cannot be carried by a link.
    #[error("invalid payload: {0}")]
    InvalidPayload(&'static str),

    /// A channel is missing or lacks the required permissions.
    #[error("cannot access {path}: {source}")]
    Inaccessible {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Creating an owned temporary channel directory failed.
    #[error("failed to create temporary channel directory in {parent}: {source}")]
    TempDir {
        parent: PathBuf,
        source: std::io::Error,
    },

    /// Creating a channel failed.
    #[error("mkfifo({path}) failed: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Removing a channel failed.
    #[error("unable to remove fifo {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Listing the channel directory failed.
    #[error("unable to read channel directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Transport-level error, including timeouts.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The acknowledgement was not the expected two bytes.
    #[error("bad acknowledgement on link {name:?}: {}", describe_ack_len(.len))]
    BadAck { name: String, len: Option<usize> },
}

fn describe_ack_len(len: &Option<usize>) -> String {
    match len {
        Some(len) => format!("got {len} bytes, expected 2"),
        None => "reply overflowed the ack buffer".to_string(),
    }
}

impl LinkError {
    /// The peer did not show up within the time bound.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }

    /// The peer answered with something other than `OK`.
    pub fn is_bad_ack(&self) -> bool {
        matches!(self, Self::BadAck { .. })
    }

    /// Expected protocol outcome rather than a setup or environment failure.
    pub fn is_recoverable(&self) -> bool {
        self.is_timeout() || self.is_bad_ack()
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn timeout_is_recoverable() {
        let err = LinkError::from(TransportError::Timeout {
            path: PathBuf::from("/tmp/x.req"),
            timeout: Duration::from_millis(10),
        });
        assert!(err.is_timeout());
        assert!(err.is_recoverable());
    }

    #[test]
    fn bad_ack_is_recoverable_but_not_timeout() {
        let err = LinkError::BadAck {
            name: "p2c".to_string(),
            len: Some(1),
        };
        assert!(!err.is_timeout());
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("got 1 bytes"));
    }

    #[test]
    fn setup_errors_are_not_recoverable() {
        assert!(!LinkError::NotInitialized.is_recoverable());
        let hangup = LinkError::from(TransportError::PeerHangup {
            path: PathBuf::from("/tmp/x.req"),
        });
        assert!(!hangup.is_recoverable());
    }
}
