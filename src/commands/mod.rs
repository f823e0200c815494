use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;

use releaser::defaults::{self, Defaults};
use releaser::inputs::ProcessEnv;
use releaser::paths;
use releaser::workflow::Commands as WorkflowCommands;

pub type CmdResult<T> = releaser::Result<(T, i32)>;

pub mod inputs;
pub mod publish;
pub mod run;
pub mod runtime;

/// Options shared by every subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Action bundle directory (defaults to RELEASER_BUNDLE, then the executable's directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub bundle: Option<PathBuf>,

    /// Config file (defaults to RELEASER_CONFIG, then <bundle>/releaser.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn bundle_dir(&self) -> releaser::Result<PathBuf> {
        match &self.bundle {
            Some(dir) => Ok(dir.clone()),
            None => paths::bundle_dir(&ProcessEnv),
        }
    }

    pub fn load_defaults(&self, bundle_dir: &Path) -> releaser::Result<Defaults> {
        Ok(defaults::load_config(self.config.as_deref(), bundle_dir, &ProcessEnv)?.defaults)
    }
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (releaser::Result<serde_json::Value>, i32) {
    run_json_reporting(command, global, &mut WorkflowCommands::stdout())
}

/// Dispatch `command`; `run` and `publish` failures get one `::error::` line.
fn run_json_reporting<W: Write>(
    command: crate::Commands,
    global: &GlobalArgs,
    report: &mut WorkflowCommands<W>,
) -> (releaser::Result<serde_json::Value>, i32) {
    let (result, exit_code, reports_failure) = match command {
        crate::Commands::Run(args) => {
            let (r, c) = crate::output::map_cmd_result_to_json(run::run(args, global));
            (r, c, true)
        }
        crate::Commands::Publish(args) => {
            let (r, c) = crate::output::map_cmd_result_to_json(publish::run(args, global));
            (r, c, true)
        }
        crate::Commands::Inputs(args) => {
            let (r, c) = crate::output::map_cmd_result_to_json(inputs::run(args, global));
            (r, c, false)
        }
        crate::Commands::Runtime(args) => {
            let (r, c) = crate::output::map_cmd_result_to_json(runtime::run(args, global));
            (r, c, false)
        }
    };

    if reports_failure {
        if let Err(err) = &result {
            report.error(&err.summary());
        }
    }

    (result, exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn reported(command: crate::Commands, global: &GlobalArgs) -> (i32, String) {
        let mut report = WorkflowCommands::new(Vec::new());
        let (result, exit_code) = run_json_reporting(command, global, &mut report);
        assert!(result.is_err());
        (exit_code, String::from_utf8(report.into_inner()).unwrap())
    }

    #[test]
    fn publish_failure_is_reported_once() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("stdout.txt");
        std::fs::write(&source, "not-json").unwrap();

        let command = crate::Commands::Publish(publish::PublishArgs {
            source: source.display().to_string(),
        });
        let (exit_code, log) = reported(command, &GlobalArgs::default());

        assert_eq!(exit_code, 20);
        assert_eq!(log.matches("::error::").count(), 1);
        assert!(log.starts_with("::error::Script output is not a JSON object"));
    }

    #[test]
    fn run_failure_is_reported_once() {
        let dir = TempDir::new().unwrap();
        let global = GlobalArgs {
            bundle: Some(dir.path().to_path_buf()),
            config: Some(dir.path().join("missing.json")),
        };

        let (exit_code, log) = reported(crate::Commands::Run(run::RunArgs::default()), &global);

        assert_eq!(exit_code, 2);
        assert_eq!(log.lines().count(), 1);
        assert!(log.starts_with("::error::"));
    }

    #[test]
    fn inspection_failures_are_not_reported() {
        let dir = TempDir::new().unwrap();
        let global = GlobalArgs {
            bundle: Some(dir.path().to_path_buf()),
            config: Some(dir.path().join("missing.json")),
        };

        let (_, log) = reported(crate::Commands::Inputs(inputs::InputsArgs::default()), &global);
        assert!(log.is_empty());

        let (_, log) = reported(
            crate::Commands::Runtime(runtime::RuntimeArgs::default()),
            &global,
        );
        assert!(log.is_empty());
    }
}
