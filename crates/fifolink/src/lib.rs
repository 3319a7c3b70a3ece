//! Confirmed, timeout-bounded messaging between processes over named pipes.
//!
//! fifolink pairs two FIFOs per named link (request + ack) so a sender learns
//! that its message was read, and every wait on the peer is bounded.
//!
//! # Crate Structure
//!
//! - [`transport`] - Raw FIFO open/poll/read/write with timeouts
//! - [`link`] - Channel directory, link lifecycle and the req/ack protocol

/// Re-export transport types.
pub mod transport {
    pub use fifolink_transport::*;
}

/// Re-export link types.
#[cfg(unix)]
pub mod link {
    pub use fifolink_link::*;
}

#[cfg(unix)]
pub use fifolink_link::{init, ChannelDir, Link, LinkError, Timeout, FIFO_ENV_VAR};
