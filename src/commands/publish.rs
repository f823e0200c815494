use clap::Args;

use releaser::inputs::ProcessEnv;
use releaser::script::{self, ScriptOutput};
use releaser::utils::io;
use releaser::workflow::{self, Commands, OutputTarget};

use super::{CmdResult, GlobalArgs};

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Captured script stdout (file path, or - for stdin)
    pub source: String,
}

/// Decode a captured script output and publish it as step outputs.
pub fn run(args: PublishArgs, _global: &GlobalArgs) -> CmdResult<ScriptOutput> {
    let stdout = io::read_source(&args.source, &format!("read {}", args.source))?;
    let outputs = script::decode(&stdout)?;

    let mut commands = Commands::stdout();
    workflow::set_outputs(
        &outputs.to_outputs(),
        &OutputTarget::from_env(&ProcessEnv),
        &mut commands,
    )?;

    Ok((outputs, 0))
}
