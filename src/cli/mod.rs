pub mod compare;
pub mod config;
pub mod demo;
pub mod generate;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "passedit",
    about = "Password entry with repeat confirmation and a built-in generator."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive password form (default).
    Demo,
    /// Print a random password. Unset options come from settings.json.
    Generate {
        /// Number of characters
        #[arg(long)]
        length: Option<usize>,
        /// Leave out lowercase letters
        #[arg(long = "no-lower")]
        no_lower: bool,
        /// Leave out uppercase letters
        #[arg(long = "no-upper")]
        no_upper: bool,
        /// Leave out digits
        #[arg(long = "no-digits")]
        no_digits: bool,
        /// Include special characters
        #[arg(long)]
        special: bool,
        /// Leave out characters that look alike (0 O o 1 l I |)
        #[arg(long = "exclude-lookalike")]
        exclude_lookalike: bool,
    },
    /// Compare a password and its repetition; exits 0 only on an exact match.
    ///
    /// Prompts without echo on a terminal, otherwise reads two lines from stdin.
    Compare,
    /// Show or change settings.
    Config {
        /// Mirror the password into the repeat field while it is shown
        #[arg(long = "auto-sync")]
        auto_sync: Option<bool>,
        /// Default generator length
        #[arg(long)]
        length: Option<usize>,
        /// Include special characters by default
        #[arg(long)]
        special: Option<bool>,
    },
}
