use fifolink_link::Timeout;

use crate::cmd::{Context, ReceiveArgs};
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ReceiveArgs, ctx: &Context) -> CliResult<i32> {
    let dir = ctx.channel_dir()?;
    let timeout = Timeout::from_millis(args.timeout_ms);

    let message = dir
        .receive(&args.name, args.max_size, timeout)
        .map_err(|err| link_error("receive failed", err))?;

    // Shell callers capture stdout verbatim, so raw is the default here.
    print_message(
        &args.name,
        &message,
        ctx.format.unwrap_or(OutputFormat::Raw),
    );
    Ok(SUCCESS)
}
