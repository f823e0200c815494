//! Release script invocation and output decoding.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CommandFailedDetails, Error, Result};
use crate::inputs::ActionInputs;
use crate::paths::BundleLayout;
use crate::toolcache::PythonRuntime;
use crate::utils::command::{CommandSpec, ProcessRunner};
use crate::workflow::to_command_value;

/// Decoded script result: top-level keys of the JSON object, sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScriptOutput(Map<String, Value>);

impl ScriptOutput {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// `(name, value)` pairs stringified per the output contract.
    pub fn to_outputs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), to_command_value(v)))
            .collect()
    }
}

/// Parse the whole of stdout as one JSON object.
pub fn decode(stdout: &str) -> Result<ScriptOutput> {
    let value: Value = serde_json::from_str(stdout)
        .map_err(|e| Error::script_malformed_output(e.to_string(), stdout))?;

    match value {
        Value::Object(map) => Ok(ScriptOutput(map)),
        other => Err(Error::script_malformed_output(
            format!("expected an object, found {}", json_kind(&other)),
            stdout,
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `python <script> [-v <version>] --changelog-path <path>`.
pub fn script_command(
    runtime: &PythonRuntime,
    layout: &BundleLayout,
    inputs: &ActionInputs,
    env: &[(String, String)],
) -> CommandSpec {
    let mut spec = CommandSpec::new(runtime.python_executable())
        .arg(layout.script.display().to_string());

    if let Some(version) = &inputs.version {
        spec = spec.args(["-v", version.as_str()]);
    }

    spec.args(["--changelog-path", inputs.path.as_str()])
        .envs(env)
        .capture_stdout()
}

/// Run the script, buffer its stdout, and decode it once it exits.
pub fn run(runner: &dyn ProcessRunner, spec: &CommandSpec) -> Result<ScriptOutput> {
    crate::log_status!("script", "{}", spec.display());

    let output = runner.run(spec)?;
    if !output.success {
        return Err(Error::script_failed(CommandFailedDetails {
            command: spec.program.display().to_string(),
            exit_code: output.exit_code,
            problem: output
                .exit_code
                .is_none()
                .then(|| "terminated by signal".to_string()),
        }));
    }

    decode(&output.stdout_text())
}
