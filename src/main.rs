//! Rustack - typed infrastructure stacks synthesized to CloudFormation.
//!
//! This is the main entry point for the Rustack CLI.

use anyhow::Result;
use colored::Colorize;
use is_terminal::IsTerminal;
use rustack::cli::{Cli, Commands};
use rustack::config::Config;
use rustack::stacks::build_app;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    if cli.no_color || !std::io::stderr().is_terminal() {
        colored::control::set_override(false);
    }

    init_logging(cli.verbosity());

    let config = Config::load(cli.config.as_ref()).unwrap_or_else(|e| {
        if cli.verbosity() >= 1 {
            eprintln!("Warning: Failed to load config: {e}");
        }
        Config::default()
    });

    let exit_code = match run(&cli, &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: &Cli, config: &Config) -> rustack::error::Result<i32> {
    let app = build_app(config)?;
    match &cli.command {
        Commands::Synth(args) => args.execute(&app, config),
        Commands::List(args) => args.execute(&app),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}
