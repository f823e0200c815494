use clap::Args;

use releaser::inputs::ProcessEnv;
use releaser::pipeline::{self, ActionContext, ActionRun};
use releaser::utils::command::SystemRunner;
use releaser::workflow::Commands;

use super::{CmdResult, GlobalArgs};

#[derive(Args, Debug, Default)]
pub struct RunArgs {}

/// Full action: runtime, offline install, inputs, script, outputs.
pub fn run(_args: RunArgs, global: &GlobalArgs) -> CmdResult<ActionRun> {
    let bundle_dir = global.bundle_dir()?;
    let defaults = global.load_defaults(&bundle_dir)?;
    let ctx = ActionContext::new(bundle_dir, defaults);

    let mut commands = Commands::stdout();
    commands.debug(&format!("src: {}", ctx.layout.source_dir.display()));

    let run = pipeline::run(&ctx, &SystemRunner, &ProcessEnv, &mut commands)?;
    Ok((run, 0))
}
