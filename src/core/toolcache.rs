//! Interpreter lookup in the runner's tool cache.
//!
//! Layout: `<root>/<tool>/<version>/<arch>/` plus a sibling `<arch>.complete`
//! marker written once the install finished. Nothing is ever downloaded.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use semver::{Version, VersionReq};
use serde::Serialize;

use crate::error::{Error, Result, RuntimeNotFoundDetails};

pub const PYTHON_TOOL: &str = "Python";

/// Environment variable the runner's own setup step exports for Python.
pub const PYTHON_LOCATION_ENV: &str = "pythonLocation";

/// A version specifier: an exact version or a semver range.
#[derive(Debug, Clone)]
pub enum VersionSpec {
    Exact(Version),
    Range(VersionReq),
}

impl VersionSpec {
    /// Parse `3.8.10`, `3.8.x`, `3.8`, or a comparator list like `>=3.7, <3.9`.
    ///
    /// A bare `major` or `major.minor` pins that series (`3.8` means `3.8.x`).
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if let Ok(version) = Version::parse(spec) {
            return Ok(VersionSpec::Exact(version));
        }

        let is_partial = spec.split('.').count() < 3
            && spec
                .split('.')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
        let normalized = if is_partial {
            format!("={}", spec)
        } else {
            spec.to_string()
        };

        VersionReq::parse(&normalized)
            .map(VersionSpec::Range)
            .map_err(|e| {
                Error::validation_invalid_argument(
                    "python_version",
                    format!("'{}' is not a valid version specifier: {}", spec, e),
                )
            })
    }

    pub fn matches(&self, version: &Version) -> bool {
        match self {
            VersionSpec::Exact(exact) => exact == version,
            VersionSpec::Range(req) => req.matches(version),
        }
    }
}

/// A cached interpreter ready to be placed on a child's `PATH`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PythonRuntime {
    pub version: String,
    pub arch: String,
    pub install_dir: PathBuf,
    pub bin_dirs: Vec<PathBuf>,
}

impl PythonRuntime {
    fn new(version: &Version, arch: &str, install_dir: PathBuf) -> Self {
        let bin_dirs = if cfg!(windows) {
            vec![install_dir.clone(), install_dir.join("Scripts")]
        } else {
            vec![install_dir.join("bin"), install_dir.clone()]
        };

        Self {
            version: version.to_string(),
            arch: arch.to_string(),
            install_dir,
            bin_dirs,
        }
    }

    pub fn python_executable(&self) -> PathBuf {
        if cfg!(windows) {
            self.install_dir.join("python.exe")
        } else {
            self.install_dir.join("bin").join("python")
        }
    }

    /// `PATH` with the runtime's directories in front of `current`.
    pub fn path_with_runtime(&self, current: Option<&str>) -> Result<OsString> {
        let mut entries: Vec<PathBuf> = self.bin_dirs.clone();
        if let Some(current) = current {
            entries.extend(std::env::split_paths(current));
        }

        std::env::join_paths(entries).map_err(|e| {
            Error::internal_unexpected(format!("Cannot build PATH for runtime: {}", e))
        })
    }

    /// Variables a child needs to find this interpreter first.
    pub fn child_env(&self, current_path: Option<&str>) -> Result<Vec<(String, String)>> {
        let path = self.path_with_runtime(current_path)?;
        Ok(vec![
            ("PATH".to_string(), path.to_string_lossy().to_string()),
            (
                PYTHON_LOCATION_ENV.to_string(),
                self.install_dir.display().to_string(),
            ),
        ])
    }
}

/// Completed versions of `tool` cached for `arch`, ascending.
pub fn cached_versions(root: &Path, tool: &str, arch: &str) -> Vec<Version> {
    let tool_dir = root.join(tool);
    let Ok(entries) = fs::read_dir(&tool_dir) else {
        return Vec::new();
    };

    let mut versions: Vec<Version> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            let version = Version::parse(&name).ok()?;
            let version_dir = entry.path();
            let complete = version_dir.join(format!("{}.complete", arch)).is_file();
            (complete && version_dir.join(arch).is_dir()).then_some(version)
        })
        .collect();

    versions.sort();
    versions
}

/// Highest cached Python matching `spec` for `arch`.
pub fn find_python(root: &Path, spec: &str, arch: &str) -> Result<PythonRuntime> {
    find(root, PYTHON_TOOL, spec, arch)
}

pub fn find(root: &Path, tool: &str, spec: &str, arch: &str) -> Result<PythonRuntime> {
    let version_spec = VersionSpec::parse(spec)?;
    let versions = cached_versions(root, tool, arch);

    let Some(version) = versions.iter().rev().find(|v| version_spec.matches(v)) else {
        return Err(Error::runtime_not_found(RuntimeNotFoundDetails {
            tool: tool.to_string(),
            version_spec: spec.to_string(),
            arch: arch.to_string(),
            cache_root: root.display().to_string(),
            available: versions.iter().map(Version::to_string).collect(),
        }));
    };

    let install_dir = root.join(tool).join(version.to_string()).join(arch);
    Ok(PythonRuntime::new(version, arch, install_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_python(root: &Path, version: &str, arch: &str, complete: bool) {
        let version_dir = root.join(PYTHON_TOOL).join(version);
        fs::create_dir_all(version_dir.join(arch).join("bin")).unwrap();
        if complete {
            fs::write(version_dir.join(format!("{}.complete", arch)), "").unwrap();
        }
    }

    #[test]
    fn wildcard_picks_highest_patch_in_series() {
        let cache = TempDir::new().unwrap();
        cache_python(cache.path(), "3.8.2", "x64", true);
        cache_python(cache.path(), "3.8.18", "x64", true);
        cache_python(cache.path(), "3.9.1", "x64", true);

        let runtime = find_python(cache.path(), "3.8.x", "x64").unwrap();
        assert_eq!(runtime.version, "3.8.18");
        assert_eq!(
            runtime.install_dir,
            cache.path().join("Python").join("3.8.18").join("x64")
        );
    }

    #[test]
    fn bare_minor_means_that_series_only() {
        let cache = TempDir::new().unwrap();
        cache_python(cache.path(), "3.8.5", "x64", true);
        cache_python(cache.path(), "3.9.1", "x64", true);

        let runtime = find_python(cache.path(), "3.8", "x64").unwrap();
        assert_eq!(runtime.version, "3.8.5");
    }

    #[test]
    fn exact_version_matches_only_itself() {
        let cache = TempDir::new().unwrap();
        cache_python(cache.path(), "3.8.5", "x64", true);
        cache_python(cache.path(), "3.8.6", "x64", true);

        let runtime = find_python(cache.path(), "3.8.5", "x64").unwrap();
        assert_eq!(runtime.version, "3.8.5");
    }

    #[test]
    fn incomplete_or_other_arch_installs_are_ignored() {
        let cache = TempDir::new().unwrap();
        cache_python(cache.path(), "3.8.9", "x64", false);
        cache_python(cache.path(), "3.8.7", "x86", true);
        cache_python(cache.path(), "3.8.1", "x64", true);
        fs::create_dir_all(cache.path().join(PYTHON_TOOL).join("not-a-version")).unwrap();

        assert_eq!(
            cached_versions(cache.path(), PYTHON_TOOL, "x64"),
            vec![Version::new(3, 8, 1)]
        );
    }

    #[test]
    fn missing_version_is_runtime_not_found() {
        let cache = TempDir::new().unwrap();
        cache_python(cache.path(), "3.10.4", "x64", true);

        let err = find_python(cache.path(), "3.8.x", "x64").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::RuntimeNotFound);
        assert_eq!(err.details["available"][0], "3.10.4");
    }

    #[test]
    fn empty_cache_is_runtime_not_found() {
        let cache = TempDir::new().unwrap();
        let err = find_python(cache.path(), "3.8.x", "x64").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::RuntimeNotFound);
    }

    #[test]
    fn invalid_spec_is_validation_error() {
        let cache = TempDir::new().unwrap();
        let err = find_python(cache.path(), "three", "x64").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationInvalidArgument);
    }

    #[cfg(unix)]
    #[test]
    fn child_env_puts_runtime_first_on_path() {
        let cache = TempDir::new().unwrap();
        cache_python(cache.path(), "3.8.18", "x64", true);
        let runtime = find_python(cache.path(), "3.8.x", "x64").unwrap();

        let env = runtime.child_env(Some("/usr/bin:/bin")).unwrap();
        let path = &env[0].1;
        let install = runtime.install_dir.display().to_string();

        assert_eq!(env[0].0, "PATH");
        assert!(path.starts_with(&format!("{}/bin:{}:", install, install)));
        assert!(path.ends_with(":/usr/bin:/bin"));
        assert_eq!(env[1], (PYTHON_LOCATION_ENV.to_string(), install.clone()));
        assert_eq!(
            runtime.python_executable(),
            runtime.install_dir.join("bin").join("python")
        );
    }
}
