use clap::{CommandFactory, Parser};
use log::error;
use std::process::ExitCode;
use wapp::commands::{CreateArgs, Run, UpdateArgs};
use wapp::config::Config;
use wapp::error::{UsageError, exit_code};
use wapp::runtime::RealRuntime;

/// wapp - wrap a git repository of Python scripts into an installable package
///
/// Every exposed script gets a launcher and a console entry point, so it can
/// be installed (for example with pipx) and run like any other command.
///
/// Examples:
///   wapp create https://github.com/owner/tools.git --pipx
///   wapp update ./tools --pipx
#[derive(Parser, Debug)]
#[command(author, version = env!("WAPP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Create a wrapped package from a git repository
    Create(CreateArgs),

    /// Update a wrapped package to the latest revision of its repository
    Update(UpdateArgs),
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<UsageError>() {
        Some(usage) => error!("{}", usage),
        None => {
            error!("Raised unhandled exception:");
            error!("{:?}", err);
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        // a bare invocation behaves like --help
        return match Cli::command().print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    };
    wapp::logging::init(cli.debug);

    let config = Config::new(RealRuntime);
    let result = match command {
        Commands::Create(args) => args.run(&config),
        Commands::Update(args) => args.run(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(exit_code(&err))
        }
    }
}
