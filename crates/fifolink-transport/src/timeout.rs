use std::fmt;
use std::time::{Duration, Instant};

/// Time bound applied to a single wait on a FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Wait until the peer shows up, however long that takes.
    #[default]
    Infinite,
    /// Give up once this much time has passed.
    After(Duration),
}

impl Timeout {
    /// Millisecond form used on the command line; `0` means wait indefinitely.
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::Infinite
        } else {
            Self::After(Duration::from_millis(ms))
        }
    }

    /// The bound as a duration, or `None` when infinite.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Infinite => None,
            Self::After(d) => Some(*d),
        }
    }

    pub(crate) fn deadline_from(&self, start: Instant) -> Option<Instant> {
        self.as_duration().and_then(|d| start.checked_add(d))
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infinite => f.write_str("infinite"),
            Self::After(d) => write!(f, "{} ms", d.as_millis()),
        }
    }
}
