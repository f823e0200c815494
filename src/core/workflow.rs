//! Runner workflow commands and step outputs.
//!
//! Outputs go to the file named by `GITHUB_OUTPUT` using the heredoc form.
//! Runners too old to set it get the legacy `::set-output` command instead.

use std::io::Write;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::inputs::Lookup;
use crate::utils::io;

pub const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";
pub const ACTIONS_ENV: &str = "GITHUB_ACTIONS";

/// Where step outputs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Legacy,
}

impl OutputTarget {
    pub fn from_env(env: &dyn Lookup) -> Self {
        match env.get_non_empty(OUTPUT_FILE_ENV) {
            Some(path) => OutputTarget::File(PathBuf::from(path)),
            None => OutputTarget::Legacy,
        }
    }
}

/// Output value as the runner expects it: strings verbatim, `null` empty,
/// anything else compact JSON.
pub fn to_command_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Escape the message part of a workflow command.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a property value of a workflow command.
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// `::command key=value,...::message`
pub fn format_command(command: &str, properties: &[(&str, &str)], message: &str) -> String {
    let mut line = format!("::{}", command);
    if !properties.is_empty() {
        let props: Vec<String> = properties
            .iter()
            .map(|(k, v)| format!("{}={}", k, escape_property(v)))
            .collect();
        line.push(' ');
        line.push_str(&props.join(","));
    }
    line.push_str("::");
    line.push_str(&escape_data(message));
    line
}

/// Issues workflow commands on a writer (stdout in production).
pub struct Commands<W: Write> {
    out: W,
}

impl<W: Write> Commands<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn issue(&mut self, command: &str, properties: &[(&str, &str)], message: &str) {
        // Losing a log line must not fail the step.
        let _ = writeln!(self.out, "{}", format_command(command, properties, message));
    }

    pub fn debug(&mut self, message: &str) {
        self.issue("debug", &[], message);
    }

    pub fn error(&mut self, message: &str) {
        self.issue("error", &[], message);
    }

    pub fn add_mask(&mut self, secret: &str) {
        self.issue("add-mask", &[], secret);
    }
}

impl Commands<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

/// One output in the `GITHUB_OUTPUT` heredoc form.
pub fn format_file_output(name: &str, value: &str, delimiter: &str) -> Result<String> {
    if name.contains(delimiter) || value.contains(delimiter) {
        return Err(Error::internal_unexpected(format!(
            "Unexpected input: name or value contains delimiter {}",
            delimiter
        )));
    }

    Ok(format!("{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter))
}

fn new_delimiter() -> String {
    format!("ghadelimiter_{}", uuid::Uuid::new_v4())
}

/// Publish all outputs in one write. Nothing is written if any output is invalid.
pub fn set_outputs<W: Write>(
    outputs: &[(String, String)],
    target: &OutputTarget,
    commands: &mut Commands<W>,
) -> Result<()> {
    match target {
        OutputTarget::File(path) => {
            let mut content = String::new();
            for (name, value) in outputs {
                content.push_str(&format_file_output(name, value, &new_delimiter())?);
            }
            if content.is_empty() {
                return Ok(());
            }
            io::append_file(path, &content, &format!("write outputs to {}", path.display()))
        }
        OutputTarget::Legacy => {
            for (name, value) in outputs {
                commands.issue("set-output", &[("name", name.as_str())], value);
            }
            Ok(())
        }
    }
}
