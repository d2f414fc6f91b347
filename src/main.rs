mod cli;
mod edit;
mod error;
mod field;
mod generator;
mod logging;
mod pairing;
mod popup;
mod settings;
mod status;
mod tui;

use clap::Parser;

use cli::generate::GenerateFlags;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::initialize_logging() {
        eprintln!("Warning: logging disabled: {e}");
    }

    let result = match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => cli::demo::run(),
        Commands::Generate {
            length,
            no_lower,
            no_upper,
            no_digits,
            special,
            exclude_lookalike,
        } => cli::generate::run(&GenerateFlags {
            length,
            no_lower,
            no_upper,
            no_digits,
            special,
            exclude_lookalike,
        }),
        Commands::Compare => cli::compare::run(),
        Commands::Config {
            auto_sync,
            length,
            special,
        } => cli::config::run(auto_sync, length, special),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
