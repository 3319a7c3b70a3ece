mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::{Command, Context};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "fifolink", version, about = "Confirmed messaging over named pipes")]
struct Cli {
    /// Channel directory shared with the peer.
    #[arg(long, value_name = "DIR", env = "LTP_FIFO_PATH", global = true)]
    dir: Option<PathBuf>,

    /// Channel file name prefix.
    #[arg(long, value_name = "PREFIX", global = true)]
    prefix: Option<String>,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let ctx = Context {
        dir: cli.dir,
        prefix: cli.prefix,
        format: cli.format,
    };

    match cmd::run(cli.command, &ctx) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from(["fifolink", "send", "p2c", "AbcD", "10"])
            .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.name, "p2c");
                assert_eq!(args.message, "AbcD");
                assert_eq!(args.timeout_ms, 10);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn receive_defaults_to_4k_buffer() {
        let cli = Cli::try_parse_from(["fifolink", "receive", "c2p", "0"])
            .expect("receive args should parse");
        match cli.command {
            Command::Receive(args) => assert_eq!(args.max_size, 4096),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = Cli::try_parse_from(["fifolink", "send", "p2c", "AbcD", "soon"])
            .expect_err("non-numeric timeout should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn send_requires_timeout() {
        let err = Cli::try_parse_from(["fifolink", "send", "p2c", "AbcD"])
            .expect_err("missing timeout should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn dir_flag_is_global() {
        let cli = Cli::try_parse_from(["fifolink", "create", "p2c", "--dir", "/tmp/links"])
            .expect("global --dir should parse after subcommand");
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/links")));
    }
}
