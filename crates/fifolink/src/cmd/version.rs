use fifolink_link::{DEFAULT_PREFIX, FIFO_ENV_VAR};
use fifolink_transport::POLL_INTERVAL;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("fifolink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: fifolink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("dir_env: {FIFO_ENV_VAR}");
    println!("channel_prefix: {DEFAULT_PREFIX}");
    println!("poll_interval_ms: {}", POLL_INTERVAL.as_millis());

    Ok(SUCCESS)
}
