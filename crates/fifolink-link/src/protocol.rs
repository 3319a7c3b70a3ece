//! Confirmed send/receive over a request/ack channel pair.
//!
//! Sender: open request for write (poll) → write → wait for ack → read ack.
//! Receiver: wait for request → read → open ack for write (poll) → write `OK`.
//!
//! The caller's timeout bounds each leg separately, so a confirmed send can
//! take up to twice the timeout before it gives up.

use bytes::Bytes;
use fifolink_transport::{recv_raw, send_raw, Timeout, TransportError};
use tracing::debug;

use crate::dir::{validate_name, Access, ChannelDir, ChannelKind};
use crate::error::{LinkError, Result};

/// Confirmation written back on the ack channel.
pub const ACK_PAYLOAD: &[u8] = b"OK";

/// Receive buffer used when the caller has no better bound.
pub const DEFAULT_RECEIVE_CAPACITY: usize = 4096;

const ACK_CAPACITY: usize = ACK_PAYLOAD.len() + 1;

impl ChannelDir {
    /// Send `data` on link `name` and wait for the peer's acknowledgement.
    pub fn send(&self, name: &str, data: &[u8], timeout: Timeout) -> Result<()> {
        validate_payload(data)?;
        let req = self.resolve(name, ChannelKind::Request, Some(Access::Write))?;
        let ack = self.resolve(name, ChannelKind::Ack, Some(Access::Read))?;

        send_raw(&req, data, timeout)?;

        let reply = match recv_raw(&ack, ACK_CAPACITY, timeout) {
            Ok(reply) => reply,
            Err(TransportError::BufferTooSmall { .. }) => {
                return Err(LinkError::BadAck {
                    name: name.to_string(),
                    len: None,
                })
            }
            Err(err) => return Err(err.into()),
        };
        if reply.len() != ACK_PAYLOAD.len() {
            return Err(LinkError::BadAck {
                name: name.to_string(),
                len: Some(reply.len()),
            });
        }

        debug!(name, len = data.len(), "send confirmed");
        Ok(())
    }

    /// Wait for a message on link `name` and acknowledge it.
    ///
    /// `capacity` counts a terminator slot: messages of `capacity` bytes or
    /// more are rejected. No acknowledgement is sent when the wait times out.
    pub fn receive(&self, name: &str, capacity: usize, timeout: Timeout) -> Result<Bytes> {
        let req = self.resolve(name, ChannelKind::Request, Some(Access::Read))?;
        let ack = self.resolve(name, ChannelKind::Ack, Some(Access::Write))?;

        let message = recv_raw(&req, capacity, timeout)?;
        send_raw(&ack, ACK_PAYLOAD, timeout)?;

        debug!(name, len = message.len(), "receive acknowledged");
        Ok(message)
    }

    /// Like [`ChannelDir::receive`], writing into `buf` followed by a NUL byte.
    ///
    /// Returns the message length, not counting the terminator.
    pub fn receive_into(&self, name: &str, buf: &mut [u8], timeout: Timeout) -> Result<usize> {
        let message = self.receive(name, buf.len(), timeout)?;
        let len = message.len();
        buf[..len].copy_from_slice(&message);
        buf[len] = 0;
        Ok(len)
    }

    /// Handle for one named link in this directory.
    pub fn link(&self, name: impl Into<String>) -> Result<Link> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Link {
            dir: self.clone(),
            name,
        })
    }
}

/// A single named link, bound to its channel directory.
///
/// Owns a clone of the directory so it can be moved into another thread.
#[derive(Debug, Clone)]
pub struct Link {
    dir: ChannelDir,
    name: String,
}

impl Link {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &ChannelDir {
        &self.dir
    }

    pub fn create(&self) -> Result<()> {
        self.dir.create(&self.name)
    }

    pub fn destroy(&self, ignore_errors: bool) -> Result<()> {
        self.dir.destroy(&self.name, ignore_errors)
    }

    pub fn recreate(&self) -> Result<()> {
        self.dir.recreate(&self.name)
    }

    pub fn send(&self, data: &[u8], timeout: Timeout) -> Result<()> {
        self.dir.send(&self.name, data, timeout)
    }

    pub fn receive(&self, capacity: usize, timeout: Timeout) -> Result<Bytes> {
        self.dir.receive(&self.name, capacity, timeout)
    }

    pub fn receive_into(&self, buf: &mut [u8], timeout: Timeout) -> Result<usize> {
        self.dir.receive_into(&self.name, buf, timeout)
    }
}

fn validate_payload(data: &[u8]) -> Result<()> {
    if data.is_empty() {
        // The reader would only ever see the writer hang up.
        return Err(LinkError::InvalidPayload("message must not be empty"));
    }
    if data.contains(&0) {
        return Err(LinkError::InvalidPayload("message must not contain NUL bytes"));
    }
    Ok(())
}
