mod commands;
mod metrics;
mod scheduler;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "trainboard", version, about = "Trainboard processes real-time information about Dutch trains")]
struct Cli {
    /// Configuration file (defaults to config/trainboard.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the server: receive the upstream feed and serve the REST API.
    Server,
    /// Run the archiver only: forward service messages to the archive queue.
    Archiver,
    /// Parse a message file and print a summary.
    Inspect {
        #[command(subcommand)]
        message: commands::inspect::InspectCommand,
    },
    /// Probe a running server and exit with a monitoring-friendly code.
    Status {
        /// Server URL; defaults to the configured API address.
        #[arg(short, long)]
        url: Option<String>,
    },
    /// Print version information.
    Version,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("could not load configuration: {error:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Server => commands::server::run(settings).await,
        Command::Archiver => commands::archiver::run(settings).await,
        Command::Inspect { message } => commands::inspect::run(message),
        Command::Status { url } => return commands::status::run(settings, url).await,
        Command::Version => {
            println!("trainboard {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
