use std::fmt;

use fifolink_link::LinkError;

pub const SUCCESS: i32 = 0;
/// Timeout or bad acknowledgement: the peer did not complete the exchange.
pub const FAILURE: i32 = 1;
/// Broken setup: missing channel directory, missing link, OS failure.
pub const BROKEN: i32 = 2;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn link_error(context: &str, err: LinkError) -> CliError {
    let code = if err.is_recoverable() {
        FAILURE
    } else {
        BROKEN
    };
    CliError::new(code, format!("{context}: {err}"))
}
