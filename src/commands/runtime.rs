use clap::Args;

use releaser::inputs::ProcessEnv;
use releaser::pipeline::{self, ActionContext};
use releaser::toolcache::PythonRuntime;

use super::{CmdResult, GlobalArgs};

#[derive(Args, Debug, Default)]
pub struct RuntimeArgs {
    /// Version specifier, e.g. 3.8.x (overrides config)
    #[arg(long, value_name = "SPEC")]
    pub python_version: Option<String>,

    /// Architecture tag, e.g. x64 (overrides config)
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,
}

pub fn run(args: RuntimeArgs, global: &GlobalArgs) -> CmdResult<PythonRuntime> {
    let bundle_dir = global.bundle_dir()?;
    let mut defaults = global.load_defaults(&bundle_dir)?;

    if let Some(spec) = args.python_version {
        defaults.runtime.python_version = spec;
    }
    if let Some(arch) = args.arch {
        defaults.runtime.architecture = arch;
    }

    let ctx = ActionContext::new(bundle_dir, defaults);
    Ok((pipeline::provision(&ctx, &ProcessEnv)?, 0))
}
