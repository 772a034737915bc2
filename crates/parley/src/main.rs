// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - a private-chat relay between a OneBot platform and Gemini.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod init;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Parley - relays private chat messages to Gemini and sends back the replies.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Path of the configuration file. Created with placeholders if missing.
    #[arg(long, short, global = true, default_value = "parley.toml")]
    config: PathBuf,

    /// Path of the system prompt file. Overrides `relay.prompt_file`.
    #[arg(long, global = true)]
    prompt: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Run the relay (default).
    Serve,
    /// Write the default config and prompt files, then exit.
    Init,
    /// Validate the configuration and prompt without connecting anywhere.
    Check {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(&cli.config, cli.prompt.as_deref()).await,
        Commands::Init => init::run_init(&cli.config, cli.prompt.as_deref()),
        Commands::Check { plain } => check::run_check(&cli.config, cli.prompt.as_deref(), plain),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::parse_from(["parley"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("parley.toml"));
        assert!(cli.prompt.is_none());
    }

    #[test]
    fn global_paths_after_subcommand() {
        let cli = Cli::parse_from([
            "parley",
            "init",
            "--config",
            "/etc/parley.toml",
            "--prompt",
            "p.txt",
        ]);
        assert_eq!(cli.command, Some(Commands::Init));
        assert_eq!(cli.config, PathBuf::from("/etc/parley.toml"));
        assert_eq!(cli.prompt, Some(PathBuf::from("p.txt")));
    }

    #[test]
    fn check_accepts_plain_flag() {
        let cli = Cli::parse_from(["parley", "check", "--plain"]);
        assert_eq!(cli.command, Some(Commands::Check { plain: true }));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
