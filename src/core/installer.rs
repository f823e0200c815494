//! Offline dependency installation from the bundled vendor directory.

use crate::error::{CommandFailedDetails, Error, Result};
use crate::paths::BundleLayout;
use crate::toolcache::PythonRuntime;
use crate::utils::command::{CommandSpec, ProcessRunner};

/// `python -m pip install -r <requirements> --no-index --find-links=<vendor>`.
pub fn install_command(
    runtime: &PythonRuntime,
    layout: &BundleLayout,
    env: &[(String, String)],
) -> CommandSpec {
    CommandSpec::new(runtime.python_executable())
        .args(["-m", "pip", "install", "-r"])
        .arg(layout.requirements.display().to_string())
        .arg("--no-index")
        .arg(format!("--find-links={}", layout.vendor_dir.display()))
        .envs(env)
}

/// Install the requirements manifest. Never contacts a package index.
pub fn install(
    runner: &dyn ProcessRunner,
    runtime: &PythonRuntime,
    layout: &BundleLayout,
    env: &[(String, String)],
) -> Result<()> {
    for (what, path) in [
        ("requirements manifest", &layout.requirements),
        ("vendor directory", &layout.vendor_dir),
    ] {
        if !path.exists() {
            return Err(Error::install_failed(CommandFailedDetails {
                command: "pip install".to_string(),
                exit_code: None,
                problem: Some(format!("{} not found at {}", what, path.display())),
            }));
        }
    }

    let spec = install_command(runtime, layout, env);
    crate::log_status!("install", "{}", spec.display());

    let output = runner.run(&spec)?;
    if !output.success {
        return Err(Error::install_failed(CommandFailedDetails {
            command: spec.display(),
            exit_code: output.exit_code,
            problem: output
                .exit_code
                .is_none()
                .then(|| "terminated by signal".to_string()),
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::builtin_defaults;
    use crate::utils::command::ProcessOutput;
    use std::cell::RefCell;
    use std::path::Path;
    use tempfile::TempDir;

    struct FixedRunner {
        exit_code: i32,
        calls: RefCell<Vec<CommandSpec>>,
    }

    impl ProcessRunner for FixedRunner {
        fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
            self.calls.borrow_mut().push(spec.clone());
            Ok(ProcessOutput {
                exit_code: Some(self.exit_code),
                success: self.exit_code == 0,
                stdout: Vec::new(),
            })
        }
    }

    fn bundle() -> (TempDir, BundleLayout) {
        let dir = TempDir::new().unwrap();
        let layout = BundleLayout::new(dir.path(), &builtin_defaults().bundle);
        std::fs::create_dir_all(&layout.source_dir).unwrap();
        std::fs::create_dir_all(&layout.vendor_dir).unwrap();
        std::fs::write(&layout.requirements, "PyGithub\n").unwrap();
        (dir, layout)
    }

    fn runtime() -> PythonRuntime {
        crate::toolcache::PythonRuntime {
            version: "3.8.18".to_string(),
            arch: "x64".to_string(),
            install_dir: Path::new("/cache/Python/3.8.18/x64").to_path_buf(),
            bin_dirs: vec![Path::new("/cache/Python/3.8.18/x64/bin").to_path_buf()],
        }
    }

    #[test]
    fn install_runs_pip_offline_against_vendor_dir() {
        let (_dir, layout) = bundle();
        let runner = FixedRunner {
            exit_code: 0,
            calls: RefCell::new(Vec::new()),
        };

        install(&runner, &runtime(), &layout, &[]).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        let args = &calls[0].args;
        assert_eq!(&args[..4], &["-m", "pip", "install", "-r"]);
        assert_eq!(args[4], layout.requirements.display().to_string());
        assert!(args.contains(&"--no-index".to_string()));
        assert!(args.contains(&format!("--find-links={}", layout.vendor_dir.display())));
    }

    #[test]
    fn non_zero_exit_is_install_failure() {
        let (_dir, layout) = bundle();
        let runner = FixedRunner {
            exit_code: 1,
            calls: RefCell::new(Vec::new()),
        };

        let err = install(&runner, &runtime(), &layout, &[]).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InstallFailed);
        assert_eq!(err.details["exitCode"], 1);
    }

    #[test]
    fn missing_vendor_dir_fails_before_spawning() {
        let (_dir, layout) = bundle();
        std::fs::remove_dir_all(&layout.vendor_dir).unwrap();
        let runner = FixedRunner {
            exit_code: 0,
            calls: RefCell::new(Vec::new()),
        };

        let err = install(&runner, &runtime(), &layout, &[]).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InstallFailed);
        assert!(runner.calls.borrow().is_empty());
    }
}
