use tracing::info;

use crate::cmd::{Context, DestroyArgs, NameArgs};
use crate::exit::{link_error, CliResult, SUCCESS};

pub fn create(args: NameArgs, ctx: &Context) -> CliResult<i32> {
    let dir = ctx.channel_dir()?;
    dir.create(&args.name)
        .map_err(|err| link_error("create failed", err))?;
    Ok(SUCCESS)
}

pub fn destroy(args: DestroyArgs, ctx: &Context) -> CliResult<i32> {
    let dir = ctx.channel_dir()?;
    dir.destroy(&args.name, !args.strict)
        .map_err(|err| link_error("destroy failed", err))?;
    Ok(SUCCESS)
}

pub fn recreate(args: NameArgs, ctx: &Context) -> CliResult<i32> {
    let dir = ctx.channel_dir()?;
    dir.recreate(&args.name)
        .map_err(|err| link_error("recreate failed", err))?;
    info!(name = %args.name, "link reset");
    Ok(SUCCESS)
}
