//! Action input resolution.
//!
//! Each field is taken from the platform input (`INPUT_<NAME>`), then from
//! its fallback environment variable, then from a default where one exists.
//! Nothing here writes to the process environment; the fields children need
//! are handed out through [`ActionInputs::child_env`].

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::defaults::InputDefaults;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";
pub const VERSION_ENV: &str = "VERSION";

const REDACTED: &str = "***";

/// Read-only key/value source (process environment, or a map in tests).
pub trait Lookup {
    fn get(&self, key: &str) -> Option<String>;

    /// `get`, treating the empty string as absent.
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Lookup for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Environment variable carrying the platform input `name`.
pub fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Platform input value, trimmed; blank counts as not supplied.
pub fn get_input(env: &dyn Lookup, name: &str) -> Option<String> {
    env.get(&input_env_name(name))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolved action configuration. Built once, never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct ActionInputs {
    pub token: Option<String>,
    pub repository: Option<String>,
    pub version: Option<String>,
    pub path: String,
    pub action: String,
}

impl ActionInputs {
    pub fn resolve(env: &dyn Lookup, defaults: &InputDefaults) -> Self {
        let token = get_input(env, "token").or_else(|| env.get_non_empty(TOKEN_ENV));
        let repository =
            get_input(env, "repository").or_else(|| env.get_non_empty(REPOSITORY_ENV));
        let version = get_input(env, "version").or_else(|| env.get_non_empty(VERSION_ENV));
        let path = get_input(env, "path").unwrap_or_else(|| defaults.path.clone());
        let action = get_input(env, "action").unwrap_or_else(|| defaults.action.clone());

        Self {
            token,
            repository,
            version,
            path,
            action,
        }
    }

    /// Variables the script reads from its environment, present fields only.
    pub fn child_env(&self) -> Vec<(String, String)> {
        let mut vars = Vec::new();
        if let Some(token) = &self.token {
            vars.push((TOKEN_ENV.to_string(), token.clone()));
        }
        if let Some(repository) = &self.repository {
            vars.push((REPOSITORY_ENV.to_string(), repository.clone()));
        }
        vars
    }

    /// Log-safe view with the token replaced.
    pub fn redacted(&self) -> RedactedInputs<'_> {
        RedactedInputs {
            token: self.token.as_ref().map(|_| REDACTED),
            repository: self.repository.as_deref(),
            version: self.version.as_deref(),
            path: &self.path,
            action: &self.action,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RedactedInputs<'a> {
    pub token: Option<&'a str>,
    pub repository: Option<&'a str>,
    pub version: Option<&'a str>,
    pub path: &'a str,
    pub action: &'a str,
}

impl fmt::Debug for ActionInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.redacted(), f)
    }
}

impl Serialize for ActionInputs {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.redacted().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::builtin_defaults;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn resolve(pairs: &[(&str, &str)]) -> ActionInputs {
        ActionInputs::resolve(&env(pairs), &builtin_defaults().inputs)
    }

    #[test]
    fn input_env_name_follows_runner_convention() {
        assert_eq!(input_env_name("token"), "INPUT_TOKEN");
        assert_eq!(input_env_name("changelog path"), "INPUT_CHANGELOG_PATH");
    }

    #[test]
    fn explicit_input_wins_over_environment() {
        let inputs = resolve(&[
            ("INPUT_TOKEN", "from-input"),
            (TOKEN_ENV, "from-env"),
            ("INPUT_REPOSITORY", "org/input"),
            (REPOSITORY_ENV, "org/env"),
            ("INPUT_VERSION", "2.0.0"),
            (VERSION_ENV, "1.0.0"),
        ]);

        assert_eq!(inputs.token.as_deref(), Some("from-input"));
        assert_eq!(inputs.repository.as_deref(), Some("org/input"));
        assert_eq!(inputs.version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn environment_fills_absent_inputs() {
        let inputs = resolve(&[
            (TOKEN_ENV, "from-env"),
            (REPOSITORY_ENV, "org/env"),
            (VERSION_ENV, "1.0.0"),
        ]);

        assert_eq!(inputs.token.as_deref(), Some("from-env"));
        assert_eq!(inputs.repository.as_deref(), Some("org/env"));
        assert_eq!(inputs.version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn every_presence_combination_resolves_by_precedence() {
        for (input, fallback) in [
            (None, None),
            (Some("in"), None),
            (None, Some("env")),
            (Some("in"), Some("env")),
        ] {
            let mut pairs = Vec::new();
            if let Some(v) = input {
                pairs.push(("INPUT_VERSION", v));
            }
            if let Some(v) = fallback {
                pairs.push((VERSION_ENV, v));
            }

            let inputs = resolve(&pairs);
            assert_eq!(inputs.version.as_deref(), input.or(fallback));
        }
    }

    #[test]
    fn blank_values_count_as_absent() {
        let inputs = resolve(&[
            ("INPUT_TOKEN", "   "),
            (TOKEN_ENV, "from-env"),
            ("INPUT_REPOSITORY", ""),
            (REPOSITORY_ENV, ""),
        ]);

        assert_eq!(inputs.token.as_deref(), Some("from-env"));
        assert_eq!(inputs.repository, None);
    }

    #[test]
    fn inputs_are_trimmed() {
        let inputs = resolve(&[("INPUT_VERSION", " 1.2.3\n")]);
        assert_eq!(inputs.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn path_and_action_default_when_not_supplied() {
        let inputs = resolve(&[("INPUT_PATH", ""), ("INPUT_ACTION", "  ")]);
        assert_eq!(inputs.path, "./CHANGELOG.md");
        assert_eq!(inputs.action, "release");

        let inputs = resolve(&[("INPUT_PATH", "docs/CHANGES.md"), ("INPUT_ACTION", "check")]);
        assert_eq!(inputs.path, "docs/CHANGES.md");
        assert_eq!(inputs.action, "check");
    }

    #[test]
    fn child_env_projects_present_token_and_repository() {
        let inputs = resolve(&[("INPUT_TOKEN", "abc")]);
        assert_eq!(
            inputs.child_env(),
            vec![(TOKEN_ENV.to_string(), "abc".to_string())]
        );

        let inputs = resolve(&[("INPUT_VERSION", "1.0.0")]);
        assert!(inputs.child_env().is_empty());
    }

    #[test]
    fn token_never_appears_in_debug_or_json() {
        let inputs = resolve(&[("INPUT_TOKEN", "s3cr3t"), ("INPUT_REPOSITORY", "org/repo")]);

        let debug = format!("{:?}", inputs);
        let json = serde_json::to_string(&inputs).unwrap();

        assert!(!debug.contains("s3cr3t"));
        assert!(!json.contains("s3cr3t"));
        assert!(json.contains("\"token\":\"***\""));
        assert!(json.contains("org/repo"));
    }
}
