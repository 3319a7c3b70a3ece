//! Named-pipe (FIFO) transport with bounded waits.
//!
//! A FIFO gives no portable way to block until a peer shows up on the other
//! end, so this layer provides the two primitives everything else is built on:
//! - [`send_raw`] polls a non-blocking open until a reader is present, then
//!   writes one message and closes.
//! - [`recv_raw`] opens the read end without blocking, waits for readiness
//!   with a timeout, then reads until the writer closes.
//!
//! One message per open: end-of-message is the writer closing its end.

pub mod error;
pub mod timeout;

#[cfg(unix)]
pub mod fifo;
#[cfg(unix)]
pub mod stream;

pub use error::{Result, TransportError};
pub use timeout::Timeout;

#[cfg(unix)]
pub use fifo::{create_fifo, recv_raw, send_raw, POLL_INTERVAL, TIMEOUT_EPSILON};
#[cfg(unix)]
pub use stream::{FifoStream, Readiness};
