//! mdconf CLI - inspect managed domain configuration.
//!
//! Reads a server configuration file, runs one configuration pass over it and
//! reports the resolved managed domains.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{check, show};

/// mdconf - managed domain configuration inspector
#[derive(Parser)]
#[command(name = "mdconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and resolve a configuration, listing its managed domains
    Check {
        /// Server configuration file
        file: PathBuf,
    },

    /// Print the resolved configuration
    Show {
        /// Server configuration file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Toml)]
        format: OutputFormat,

        /// Server state directory; the default store lives below it
        #[arg(long, env = "MDCONF_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
}

/// Output formats accepted by `mdconf show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Commented TOML
    Toml,
    /// Pretty-printed JSON
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug"
    } else {
        "warn,mdconf_config=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { file } => check::check_config(&file),
        Commands::Show {
            file,
            format,
            state_dir,
        } => show::show_config(&file, format, state_dir.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_accepts_known_formats() {
        let cli = Cli::try_parse_from(["mdconf", "show", "httpd.conf", "--format", "json"]).unwrap();
        let Commands::Show { format, .. } = cli.command else {
            panic!("expected show");
        };
        assert_eq!(format, OutputFormat::Json);

        let cli = Cli::try_parse_from(["mdconf", "show", "httpd.conf"]).unwrap();
        let Commands::Show { format, .. } = cli.command else {
            panic!("expected show");
        };
        assert_eq!(format, OutputFormat::Toml);
    }

    #[test]
    fn test_show_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["mdconf", "show", "httpd.conf", "--format", "yaml"]).is_err());
    }
}
