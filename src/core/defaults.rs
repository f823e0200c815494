use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::inputs::Lookup;
use crate::paths;
use crate::utils::io;

/// Root configuration structure for releaser.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReleaserConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via releaser.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_runtime")]
    pub runtime: RuntimeConfig,

    #[serde(default = "default_bundle")]
    pub bundle: BundleConfig,

    #[serde(default = "default_inputs")]
    pub inputs: InputDefaults,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            bundle: default_bundle(),
            inputs: default_inputs(),
        }
    }
}

/// Interpreter requested from the tool cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_python_version")]
    pub python_version: String,

    #[serde(default = "default_architecture")]
    pub architecture: String,
}

/// Bundle layout, relative to the bundle directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    #[serde(default = "default_script")]
    pub script: String,

    #[serde(default = "default_requirements")]
    pub requirements: String,

    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: String,
}

/// Fallback values for inputs that must never resolve empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDefaults {
    #[serde(default = "default_changelog_path")]
    pub path: String,

    #[serde(default = "default_action")]
    pub action: String,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_runtime() -> RuntimeConfig {
    RuntimeConfig {
        python_version: default_python_version(),
        architecture: default_architecture(),
    }
}

fn default_python_version() -> String {
    "3.8.x".to_string()
}

fn default_architecture() -> String {
    "x64".to_string()
}

fn default_bundle() -> BundleConfig {
    BundleConfig {
        source_dir: default_source_dir(),
        script: default_script(),
        requirements: default_requirements(),
        vendor_dir: default_vendor_dir(),
    }
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn default_script() -> String {
    "main.py".to_string()
}

fn default_requirements() -> String {
    "requirements.txt".to_string()
}

fn default_vendor_dir() -> String {
    "vendor".to_string()
}

fn default_inputs() -> InputDefaults {
    InputDefaults {
        path: default_changelog_path(),
        action: default_action(),
    }
}

fn default_changelog_path() -> String {
    "./CHANGELOG.md".to_string()
}

fn default_action() -> String {
    "release".to_string()
}

impl Defaults {
    /// Reject blank values that would break the never-empty input invariant.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("runtime.python_version", &self.runtime.python_version),
            ("runtime.architecture", &self.runtime.architecture),
            ("bundle.source_dir", &self.bundle.source_dir),
            ("bundle.script", &self.bundle.script),
            ("bundle.requirements", &self.bundle.requirements),
            ("bundle.vendor_dir", &self.bundle.vendor_dir),
            ("inputs.path", &self.inputs.path),
            ("inputs.action", &self.inputs.action),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config_invalid_value(
                    format!("defaults.{}", key),
                    Some(value.clone()),
                    "value must not be empty",
                ));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Loading functions
// =============================================================================

/// Resolve which config file applies: explicit path, then `RELEASER_CONFIG`,
/// then `releaser.json` inside the bundle.
/// The flag is true when the file was asked for and must exist.
pub fn config_path(
    explicit: Option<&Path>,
    bundle_dir: &Path,
    env: &dyn Lookup,
) -> (PathBuf, bool) {
    if let Some(path) = explicit {
        return (path.to_path_buf(), true);
    }

    if let Some(path) = env
        .get(paths::CONFIG_ENV)
        .filter(|path| !path.trim().is_empty())
    {
        return (PathBuf::from(path), true);
    }

    (bundle_dir.join(paths::CONFIG_FILE), false)
}

/// Load the config file if one applies, else built-in defaults.
///
/// An explicitly requested file must exist; the bundled file is optional.
pub fn load_config(
    explicit: Option<&Path>,
    bundle_dir: &Path,
    env: &dyn Lookup,
) -> Result<ReleaserConfig> {
    let (path, required) = config_path(explicit, bundle_dir, env);

    if !path.exists() {
        if required {
            return Err(Error::config_invalid_value(
                "config",
                Some(path.display().to_string()),
                "config file does not exist",
            ));
        }
        return Ok(ReleaserConfig::default());
    }

    load_config_from_file(&path)
}

pub fn load_config_from_file(path: &Path) -> Result<ReleaserConfig> {
    let content = io::read_file(path, &format!("read {}", path.display()))?;

    let config: ReleaserConfig = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    config.defaults.validate()?;
    Ok(config)
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}
