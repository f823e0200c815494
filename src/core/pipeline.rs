use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::defaults::Defaults;
use crate::error::Result;
use crate::inputs::{ActionInputs, Lookup};
use crate::installer;
use crate::paths::{self, BundleLayout};
use crate::script::{self, ScriptOutput};
use crate::toolcache::{self, PythonRuntime};
use crate::utils::command::ProcessRunner;
use crate::workflow::{self, Commands, OutputTarget};

/// Everything the action needs that is fixed before it starts.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub layout: BundleLayout,
    pub defaults: Defaults,
}

impl ActionContext {
    pub fn new(bundle_dir: PathBuf, defaults: Defaults) -> Self {
        Self {
            layout: BundleLayout::new(&bundle_dir, &defaults.bundle),
            defaults,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Serialize)]
pub struct ActionRun {
    pub runtime: PythonRuntime,
    pub inputs: ActionInputs,
    pub outputs: ScriptOutput,
}

/// Resolve the configured Python from the tool cache.
pub fn provision(ctx: &ActionContext, env: &dyn Lookup) -> Result<PythonRuntime> {
    let root = paths::tool_cache_root(env)?;
    let runtime = toolcache::find_python(
        &root,
        &ctx.defaults.runtime.python_version,
        &ctx.defaults.runtime.architecture,
    )?;
    crate::log_status!(
        "runtime",
        "Using Python {} ({}) from {}",
        runtime.version,
        runtime.arch,
        runtime.install_dir.display()
    );
    Ok(runtime)
}

/// Runtime, install, inputs, script, outputs. The first failure stops the run
/// and no outputs are published.
pub fn run<W: Write>(
    ctx: &ActionContext,
    runner: &dyn ProcessRunner,
    env: &dyn Lookup,
    commands: &mut Commands<W>,
) -> Result<ActionRun> {
    let runtime = provision(ctx, env)?;
    let runtime_env = runtime.child_env(env.get("PATH").as_deref())?;

    installer::install(runner, &runtime, &ctx.layout, &runtime_env)?;

    let inputs = ActionInputs::resolve(env, &ctx.defaults.inputs);
    if let Some(token) = &inputs.token {
        commands.add_mask(token);
    }
    commands.debug(&format!(
        "Inputs: {}",
        serde_json::to_string(&inputs).unwrap_or_default()
    ));

    let mut child_env = runtime_env;
    child_env.extend(inputs.child_env());

    let spec = script::script_command(&runtime, &ctx.layout, &inputs, &child_env);
    let outputs = script::run(runner, &spec)?;
    commands.debug(&format!(
        "Script output: {}",
        serde_json::to_string(&outputs).unwrap_or_default()
    ));

    workflow::set_outputs(&outputs.to_outputs(), &OutputTarget::from_env(env), commands)?;
    crate::log_status!("outputs", "Published {} output(s)", outputs.len());

    Ok(ActionRun {
        runtime,
        inputs,
        outputs,
    })
}
