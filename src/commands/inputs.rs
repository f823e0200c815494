use clap::Args;

use releaser::inputs::{ActionInputs, ProcessEnv};

use super::{CmdResult, GlobalArgs};

#[derive(Args, Debug, Default)]
pub struct InputsArgs {}

/// Resolve inputs against the current environment. The token is redacted.
pub fn run(_args: InputsArgs, global: &GlobalArgs) -> CmdResult<ActionInputs> {
    let bundle_dir = global.bundle_dir()?;
    let defaults = global.load_defaults(&bundle_dir)?;

    Ok((ActionInputs::resolve(&ProcessEnv, &defaults.inputs), 0))
}
