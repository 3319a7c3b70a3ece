use std::ffi::CString;
use std::io::{self, ErrorKind, Read, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::{FifoStream, Readiness};
use crate::timeout::Timeout;

const POLL_INTERVAL_MS: u64 = 10;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Sleep between attempts to open a FIFO for writing while no reader is present.
///
/// This interval is the granularity of every send-side timeout, so it also
/// bounds how late a timed-out send can return.
pub const POLL_INTERVAL: Duration = Duration::from_millis(POLL_INTERVAL_MS);

/// Tolerance for "returned after T" measurements: one poll interval plus scheduling slack.
pub const TIMEOUT_EPSILON: Duration = Duration::from_millis(POLL_INTERVAL_MS + 5);

/// Create a named pipe at `path` with the given mode bits (subject to umask).
pub fn create_fifo(path: impl AsRef<Path>, mode: u32) -> io::Result<()> {
    let path = path.as_ref();
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "path contains a NUL byte"))?;

    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), mode as libc::mode_t) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Write one message into the FIFO at `path`.
///
/// The write end is opened non-blocking and retried every [`POLL_INTERVAL`]
/// until a reader is present or `timeout` elapses. Once open, the descriptor
/// is switched to blocking mode, `data` is written in full and the end is
/// closed, which marks end-of-message for the reader.
pub fn send_raw(path: impl AsRef<Path>, data: &[u8], timeout: Timeout) -> Result<()> {
    let path = path.as_ref();
    let deadline = timeout.deadline_from(Instant::now());
    let mut attempts: u32 = 0;

    let mut stream = loop {
        match FifoStream::open_write(path) {
            Ok(stream) => break stream,
            Err(err) if is_reader_missing(&err) => {
                attempts += 1;
                let pause = match deadline {
                    None => POLL_INTERVAL,
                    Some(deadline) => {
                        let now = Instant::now();
                        if now >= deadline {
                            debug!(?path, attempts, "no reader before deadline");
                            return Err(TransportError::Timeout {
                                path: path.to_path_buf(),
                                timeout: timeout.as_duration().unwrap_or_default(),
                            });
                        }
                        POLL_INTERVAL.min(deadline - now)
                    }
                };
                thread::sleep(pause);
            }
            Err(source) => {
                return Err(TransportError::Open {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    };

    stream.set_nonblocking(false)?;
    stream.write_all(data)?;
    debug!(?path, len = data.len(), attempts, "message written");
    Ok(())
}

/// Read one message from the FIFO at `path`.
///
/// `capacity` counts one slot for a terminator, so the longest message that
/// fits is `capacity - 1` bytes; anything longer is
/// [`TransportError::BufferTooSmall`]. Waits at most `timeout` for a writer
/// to deliver data, then reads until the writer closes.
pub fn recv_raw(path: impl AsRef<Path>, capacity: usize, timeout: Timeout) -> Result<Bytes> {
    let path = path.as_ref();
    if capacity == 0 {
        return Err(TransportError::BufferTooSmall {
            path: path.to_path_buf(),
            capacity,
        });
    }

    let mut stream = FifoStream::open_read(path).map_err(|source| TransportError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    match stream.wait_readable(timeout)? {
        Readiness::Readable => {}
        Readiness::TimedOut => {
            debug!(?path, %timeout, "no writer before deadline");
            return Err(TransportError::Timeout {
                path: path.to_path_buf(),
                timeout: timeout.as_duration().unwrap_or_default(),
            });
        }
        Readiness::HungUp => {
            return Err(TransportError::PeerHangup {
                path: path.to_path_buf(),
            })
        }
        Readiness::Other(revents) => {
            return Err(TransportError::UnexpectedEvent {
                path: path.to_path_buf(),
                revents,
            })
        }
    }

    stream.set_nonblocking(false)?;

    // `capacity` is only a limit; memory grows with what actually arrives.
    let mut buf = BytesMut::with_capacity(capacity.min(READ_CHUNK_SIZE));
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        let want = (capacity - buf.len()).min(READ_CHUNK_SIZE);
        let read = match stream.read(&mut chunk[..want]) {
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(TransportError::Io(err)),
        };
        if read == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..read]);
        if buf.len() == capacity {
            return Err(TransportError::BufferTooSmall {
                path: path.to_path_buf(),
                capacity,
            });
        }
    }

    debug!(?path, len = buf.len(), "message read");
    Ok(buf.freeze())
}

fn is_reader_missing(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENXIO) || err.kind() == ErrorKind::Interrupted
}
