use crate::cmd::{Context, ListArgs};
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::{print_links, OutputFormat};

pub fn run(_args: ListArgs, ctx: &Context) -> CliResult<i32> {
    let dir = ctx.channel_dir()?;
    let links = dir.list().map_err(|err| link_error("list failed", err))?;
    print_links(
        dir.path(),
        &links,
        ctx.format.unwrap_or_else(OutputFormat::default_for_stdout),
    );
    Ok(SUCCESS)
}
