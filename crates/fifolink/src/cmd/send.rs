use fifolink_link::Timeout;
use tracing::debug;

use crate::cmd::{Context, SendArgs};
use crate::exit::{link_error, CliResult, SUCCESS};

pub fn run(args: SendArgs, ctx: &Context) -> CliResult<i32> {
    let dir = ctx.channel_dir()?;
    let timeout = Timeout::from_millis(args.timeout_ms);

    dir.send(&args.name, args.message.as_bytes(), timeout)
        .map_err(|err| link_error("send failed", err))?;

    debug!(name = %args.name, len = args.message.len(), %timeout, "message delivered");
    Ok(SUCCESS)
}
