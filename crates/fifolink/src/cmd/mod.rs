use std::path::PathBuf;

use clap::{Args, Subcommand};
use fifolink_link::{ChannelDir, DEFAULT_RECEIVE_CAPACITY};

use crate::exit::{link_error, CliResult};
use crate::output::OutputFormat;

pub mod lifecycle;
pub mod list;
pub mod receive;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the request and ack channels of a link.
    Create(NameArgs),
    /// Remove both channels of a link.
    Destroy(DestroyArgs),
    /// Destroy (if present) and create a link, dropping stale state.
    Recreate(NameArgs),
    /// Send a message and wait for the peer's acknowledgement.
    Send(SendArgs),
    /// Wait for a message, acknowledge it and print it.
    Receive(ReceiveArgs),
    /// List links present in the channel directory.
    List(ListArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Where channels live and how results are printed, shared by all subcommands.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub dir: Option<PathBuf>,
    pub prefix: Option<String>,
    pub format: Option<OutputFormat>,
}

impl Context {
    pub fn channel_dir(&self) -> CliResult<ChannelDir> {
        let dir = match &self.dir {
            Some(path) => ChannelDir::new(path),
            None => ChannelDir::from_env(),
        }
        .map_err(|err| link_error("channel directory", err))?;

        Ok(match &self.prefix {
            Some(prefix) => dir.with_prefix(prefix.clone()),
            None => dir,
        })
    }
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Create(args) => lifecycle::create(args, ctx),
        Command::Destroy(args) => lifecycle::destroy(args, ctx),
        Command::Recreate(args) => lifecycle::recreate(args, ctx),
        Command::Send(args) => send::run(args, ctx),
        Command::Receive(args) => receive::run(args, ctx),
        Command::List(args) => list::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct NameArgs {
    /// Link name.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct DestroyArgs {
    /// Link name.
    pub name: String,
    /// Fail if a channel is missing or cannot be removed.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Link name.
    pub name: String,
    /// Message to send.
    pub message: String,
    /// Timeout per leg in milliseconds (0 waits forever).
    pub timeout_ms: u64,
}

#[derive(Args, Debug)]
pub struct ReceiveArgs {
    /// Link name.
    pub name: String,
    /// Timeout per leg in milliseconds (0 waits forever).
    pub timeout_ms: u64,
    /// Receive buffer size in bytes, including the terminator slot.
    #[arg(long, default_value_t = DEFAULT_RECEIVE_CAPACITY, value_parser = parse_capacity)]
    pub max_size: usize,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Largest `--max-size` accepted on the command line.
const MAX_CAPACITY: usize = 64 * 1024 * 1024;

fn parse_capacity(input: &str) -> Result<usize, String> {
    let value: usize = input
        .parse()
        .map_err(|_| format!("invalid size: {input}"))?;
    if value < 2 {
        return Err("size must leave room for at least one byte and the terminator".to_string());
    }
    if value > MAX_CAPACITY {
        return Err(format!("size must not exceed {MAX_CAPACITY} bytes"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_must_hold_one_byte() {
        assert_eq!(parse_capacity("4096"), Ok(4096));
        assert!(parse_capacity("1").is_err());
        assert!(parse_capacity("-3").is_err());
    }

    #[test]
    fn capacity_has_an_upper_bound() {
        assert_eq!(parse_capacity(&MAX_CAPACITY.to_string()), Ok(MAX_CAPACITY));
        assert!(parse_capacity("18446744073709551615").is_err());
    }

    #[test]
    fn explicit_dir_and_prefix_are_applied() {
        let ctx = Context {
            dir: Some(PathBuf::from("/tmp/links")),
            prefix: Some("suite".to_string()),
            format: None,
        };
        let dir = ctx.channel_dir().expect("explicit dir should resolve");
        assert_eq!(dir.path(), std::path::Path::new("/tmp/links"));
        assert_eq!(dir.prefix(), "suite");
    }
}
