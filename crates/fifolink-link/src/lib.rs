//! Named request/ack links with confirmed delivery.
//!
//! A link is a pair of FIFOs in a shared channel directory: one carries the
//! message, the other carries a two-byte `OK` back. A send only succeeds once
//! the peer has read the whole message and acknowledged it.
//!
//! ```no_run
//! use fifolink_link::{ChannelDir, Timeout};
//!
//! let dir = ChannelDir::create_temp()?;
//! dir.recreate("p2c")?;
//! dir.send("p2c", b"AbcD", Timeout::from_millis(500))?;
//! # Ok::<(), fifolink_link::LinkError>(())
//! ```
//!
//! Links are POSIX FIFOs, so this crate is only built on Unix targets.

#![cfg(unix)]

pub mod bootstrap;
pub mod dir;
pub mod error;
pub mod lifecycle;
pub mod protocol;

pub use bootstrap::{init, FIFO_ENV_VAR};
pub use dir::{Access, ChannelDir, ChannelKind, DEFAULT_PREFIX};
pub use error::{LinkError, Result};
pub use fifolink_transport::Timeout;
pub use lifecycle::{LinkEntry, FIFO_MODE};
pub use protocol::{Link, ACK_PAYLOAD, DEFAULT_RECEIVE_CAPACITY};
