// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Courier - scheduled bulk messaging campaigns from a spreadsheet directory.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod commands;
mod send;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

/// Courier - scheduled bulk messaging campaigns.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about, long_about = None)]
struct Cli {
    /// Config file to load instead of the default search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scheduler loop (and the HTTP gateway when enabled).
    Serve,
    /// Run a single tick and exit.
    Tick {
        /// Evaluate schedules at this time (DD/MM/YYYY HH:MM) instead of now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Send a template to every eligible contact of the given senders now.
    Send {
        /// Sender identity; repeat for several. Prompts when omitted.
        #[arg(long = "sender")]
        senders: Vec<String>,
        /// Template id. Prompts when omitted.
        #[arg(long)]
        template: Option<String>,
    },
    /// List paired sender identities.
    Identities,
    /// List message templates and their placeholders.
    Templates,
    /// Validate the configuration and print a summary.
    Check,
}

/// Stderr logging. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let crates = [
            "courier",
            "courier_config",
            "courier_directory",
            "courier_template",
            "courier_sender",
            "courier_engine",
            "courier_gateway",
        ];
        let directives: Vec<String> = crates.iter().map(|c| format!("{c}={log_level}")).collect();
        EnvFilter::new(format!("warn,{}", directives.join(",")))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => courier_config::load_and_validate_path(path),
        None => courier_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            courier_config::render_errors(&errors);
            std::process::exit(2);
        }
    };

    init_tracing(&config.engine.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Tick { at } => commands::run_tick(&config, at.as_deref()).await,
        Commands::Send { senders, template } => send::run_send(&config, senders, template).await,
        Commands::Identities => commands::run_identities(&config).await,
        Commands::Templates => commands::run_templates(&config).await,
        Commands::Check => {
            commands::run_check(&config);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc answers epoch/stats queries.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_repeated_senders() {
        let cli = Cli::try_parse_from([
            "courier", "send", "--sender", "5511", "--sender", "5522", "--template", "1",
        ])
        .unwrap();
        match cli.command {
            Commands::Send { senders, template } => {
                assert_eq!(senders, vec!["5511", "5522"]);
                assert_eq!(template.as_deref(), Some("1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["courier", "tick", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Commands::Tick { at: None }));
    }

    #[test]
    fn default_config_is_valid() {
        let config = courier_config::load_and_validate_str("").expect("defaults should validate");
        assert!(config.engine.tick_interval_secs > 0);
    }
}
