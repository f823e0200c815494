use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;

use commands::{inputs, publish, run, runtime};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "releaser")]
#[command(version = VERSION)]
#[command(about = "Changelog release action: provisions Python, runs the release script, publishes its outputs")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the full action (default)
    Run(run::RunArgs),
    /// Show the resolved action inputs
    Inputs(inputs::InputsArgs),
    /// Resolve the Python runtime from the tool cache
    Runtime(runtime::RuntimeArgs),
    /// Decode captured script output and publish it as step outputs
    Publish(publish::PublishArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Run(run::RunArgs::default()));

    let (json_result, exit_code) = commands::run_json(command, &cli.global);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
