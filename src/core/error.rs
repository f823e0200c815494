use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    RuntimeCacheMissing,
    RuntimeNotFound,

    InstallFailed,

    ScriptFailed,
    ScriptMalformedOutput,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::RuntimeCacheMissing => "runtime.cache_missing",
            ErrorCode::RuntimeNotFound => "runtime.not_found",

            ErrorCode::InstallFailed => "install.failed",

            ErrorCode::ScriptFailed => "script.failed",
            ErrorCode::ScriptMalformedOutput => "script.malformed_output",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeNotFoundDetails {
    pub tool: String,
    pub version_spec: String,
    pub arch: String,
    pub cache_root: String,
    pub available: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MalformedOutputDetails {
    pub error: String,
    pub stdout: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

/// Longest stdout excerpt carried in a malformed-output error.
const STDOUT_EXCERPT_CHARS: usize = 2000;

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn runtime_cache_missing() -> Self {
        Self::new(
            ErrorCode::RuntimeCacheMissing,
            "Tool cache location is not set",
            serde_json::json!({ "variables": ["RUNNER_TOOL_CACHE", "AGENT_TOOLSDIRECTORY"] }),
        )
        .with_hint("Run on a hosted runner or set RUNNER_TOOL_CACHE to a pre-populated tool cache")
    }

    pub fn runtime_not_found(details: RuntimeNotFoundDetails) -> Self {
        let message = format!(
            "Version {} with arch {} not found in the tool cache",
            details.version_spec, details.arch
        );
        let hint = if details.available.is_empty() {
            format!("No {} versions are cached under {}", details.tool, details.cache_root)
        } else {
            format!("Cached {} versions: {}", details.tool, details.available.join(", "))
        };

        Self::new(ErrorCode::RuntimeNotFound, message, to_details(details)).with_hint(hint)
    }

    pub fn install_failed(details: CommandFailedDetails) -> Self {
        let message = match (details.exit_code, &details.problem) {
            (Some(code), _) => format!("Dependency installation failed with exit code {}", code),
            (None, Some(problem)) => format!("Dependency installation failed: {}", problem),
            (None, None) => "Dependency installation failed".to_string(),
        };

        Self::new(ErrorCode::InstallFailed, message, to_details(details))
    }

    pub fn script_failed(details: CommandFailedDetails) -> Self {
        let message = match (details.exit_code, &details.problem) {
            (Some(code), _) => format!("The process '{}' failed with exit code {}", details.command, code),
            (None, Some(problem)) => format!("The process '{}' failed: {}", details.command, problem),
            (None, None) => format!("The process '{}' failed", details.command),
        };

        Self::new(ErrorCode::ScriptFailed, message, to_details(details))
    }

    pub fn script_malformed_output(error: impl Into<String>, stdout: &str) -> Self {
        let error = error.into();
        let excerpt: String = stdout.chars().take(STDOUT_EXCERPT_CHARS).collect();
        let message = format!("Script output is not a JSON object: {}", error);

        Self::new(
            ErrorCode::ScriptMalformedOutput,
            message,
            to_details(MalformedOutputDetails {
                error,
                stdout: excerpt,
            }),
        )
        .with_hint("The script must print exactly one JSON object on stdout; send logs to stderr")
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// Single-line summary for the platform failure annotation.
    ///
    /// Generic messages ("IO error") get the underlying error appended.
    pub fn summary(&self) -> String {
        match self.details.get("error").and_then(Value::as_str) {
            Some(inner)
                if matches!(
                    self.code,
                    ErrorCode::InternalIoError
                        | ErrorCode::InternalJsonError
                        | ErrorCode::InternalUnexpected
                        | ErrorCode::ConfigInvalidJson
                ) =>
            {
                format!("{}: {}", self.message, inner)
            }
            _ => match self.details.get("problem").and_then(Value::as_str) {
                Some(problem) if self.code == ErrorCode::ValidationInvalidArgument
                    || self.code == ErrorCode::ConfigInvalidValue =>
                {
                    format!("{}: {}", self.message, problem)
                }
                _ => self.message.clone(),
            },
        }
    }
}
