use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::time::Instant;

use crate::timeout::Timeout;

/// Result of waiting for the read end of a FIFO to become readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Data is waiting to be read.
    Readable,
    /// The time bound elapsed first.
    TimedOut,
    /// The writer went away without sending anything.
    HungUp,
    /// `poll` reported some other event mask.
    Other(i16),
}

/// One open end of a FIFO; implements Read + Write.
///
/// Both ends are opened with `O_NONBLOCK` so that opening never parks the
/// caller. Switch back to blocking mode with [`FifoStream::set_nonblocking`]
/// once the peer is known to be present.
pub struct FifoStream {
    file: File,
}

impl FifoStream {
    /// Open the read end. Succeeds immediately even without a writer.
    pub fn open_read(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        Ok(Self { file })
    }

    /// Open the write end.
    ///
    /// Fails with `ENXIO` when no reader currently has the FIFO open.
    pub fn open_write(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        Ok(Self { file })
    }

    /// Toggle `O_NONBLOCK` on the underlying descriptor.
    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        let fd = self.as_raw_fd();

        // SAFETY: `fd` is an open descriptor owned by `self.file` for the duration of the call.
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }

        let flags = if nonblocking {
            flags | libc::O_NONBLOCK
        } else {
            flags & !libc::O_NONBLOCK
        };

        // SAFETY: same descriptor as above; F_SETFL only updates status flags.
        let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, flags) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Wait until the descriptor is readable or `timeout` elapses.
    ///
    /// An interrupted wait is resumed with whatever is left of the bound.
    pub fn wait_readable(&self, timeout: Timeout) -> io::Result<Readiness> {
        let deadline = timeout.deadline_from(Instant::now());

        loop {
            let wait_ms = match deadline {
                None => -1,
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    // Round up so the wait never ends before the bound.
                    let ms = remaining.as_micros().div_ceil(1000);
                    i32::try_from(ms).unwrap_or(i32::MAX)
                }
            };

            let mut fds = libc::pollfd {
                fd: self.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            };

            // SAFETY: `fds` is a valid, writable pollfd array of length 1.
            let rc = unsafe { libc::poll(&mut fds, 1, wait_ms) };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if rc == 0 {
                return Ok(Readiness::TimedOut);
            }

            return Ok(if fds.revents & libc::POLLIN != 0 {
                Readiness::Readable
            } else if fds.revents & libc::POLLHUP != 0 {
                Readiness::HungUp
            } else {
                Readiness::Other(fds.revents)
            });
        }
    }
}

impl Read for FifoStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for FifoStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl AsRawFd for FifoStream {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl std::fmt::Debug for FifoStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoStream")
            .field("fd", &self.as_raw_fd())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fifo::create_fifo;

    fn fifo_in(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        create_fifo(&path, 0o600).expect("fifo should be creatable");
        path
    }

    #[test]
    fn open_write_without_reader_is_enxio() {
        let dir = tempfile::tempdir().unwrap();
        let path = fifo_in(&dir, "lonely.req");

        let err = FifoStream::open_write(&path).expect_err("no reader is present");
        assert_eq!(err.raw_os_error(), Some(libc::ENXIO));
    }

    #[test]
    fn open_read_does_not_block_without_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = fifo_in(&dir, "idle.req");

        let stream = FifoStream::open_read(&path).expect("read end should open");
        let ready = stream
            .wait_readable(Timeout::After(Duration::from_millis(20)))
            .unwrap();
        assert_eq!(ready, Readiness::TimedOut);
    }

    #[test]
    fn readable_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = fifo_in(&dir, "data.req");

        let mut reader = FifoStream::open_read(&path).unwrap();
        let mut writer = FifoStream::open_write(&path).expect("reader is present");
        writer.write_all(b"ping").unwrap();
        drop(writer);

        assert_eq!(
            reader.wait_readable(Timeout::Infinite).unwrap(),
            Readiness::Readable
        );
        reader.set_nonblocking(false).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"ping");
    }

    #[test]
    fn writer_closing_without_data_is_hangup() {
        let dir = tempfile::tempdir().unwrap();
        let path = fifo_in(&dir, "hangup.req");

        let reader = FifoStream::open_read(&path).unwrap();
        let writer = FifoStream::open_write(&path).unwrap();
        drop(writer);

        assert_eq!(
            reader
                .wait_readable(Timeout::After(Duration::from_secs(2)))
                .unwrap(),
            Readiness::HungUp
        );
    }
}
