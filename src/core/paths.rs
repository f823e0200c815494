use std::path::{Path, PathBuf};

use crate::defaults::BundleConfig;
use crate::error::{Error, Result};
use crate::inputs::Lookup;

/// Config file name looked up inside the bundle directory.
pub const CONFIG_FILE: &str = "releaser.json";
/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "RELEASER_CONFIG";
/// Environment variable overriding the bundle directory.
pub const BUNDLE_ENV: &str = "RELEASER_BUNDLE";

/// Tool cache root on hosted runners.
pub const TOOL_CACHE_ENV: &str = "RUNNER_TOOL_CACHE";
/// Older name for the tool cache root, still set on some images.
pub const TOOL_CACHE_LEGACY_ENV: &str = "AGENT_TOOLSDIRECTORY";

/// Resolved on-disk layout of the bundled action.
#[derive(Debug, Clone)]
pub struct BundleLayout {
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub script: PathBuf,
    pub requirements: PathBuf,
    pub vendor_dir: PathBuf,
}

impl BundleLayout {
    pub fn new(root: &Path, config: &BundleConfig) -> Self {
        let source_dir = root.join(&config.source_dir);
        Self {
            root: root.to_path_buf(),
            script: source_dir.join(&config.script),
            requirements: source_dir.join(&config.requirements),
            vendor_dir: root.join(&config.vendor_dir),
            source_dir,
        }
    }
}

/// Bundle directory: `RELEASER_BUNDLE`, else the directory holding the executable.
pub fn bundle_dir(env: &dyn Lookup) -> Result<PathBuf> {
    if let Some(dir) = env.get_non_empty(BUNDLE_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let exe = std::env::current_exe().map_err(|e| {
        Error::internal_io(e.to_string(), Some("locate current executable".to_string()))
    })?;

    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        Error::internal_unexpected(format!(
            "Executable path has no parent directory: {}",
            exe.display()
        ))
    })
}

/// Tool cache root from the runner environment.
pub fn tool_cache_root(env: &dyn Lookup) -> Result<PathBuf> {
    env.get_non_empty(TOOL_CACHE_ENV)
        .or_else(|| env.get_non_empty(TOOL_CACHE_LEGACY_ENV))
        .map(PathBuf::from)
        .ok_or_else(Error::runtime_cache_missing)
}
