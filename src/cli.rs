//! Command-line interface for Rustack.
//!
//! Two subcommands: `synth` renders stacks to stdout or a directory, `list`
//! prints the declared stack names.

use crate::config::Config;
use crate::core::App;
use crate::error::{Error, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

/// Rustack - declare AWS infrastructure as typed stacks and synthesize
/// CloudFormation templates.
#[derive(Parser, Debug, Clone)]
#[command(name = "rustack")]
#[command(version)]
#[command(about = "Synthesize CloudFormation templates from typed stacks", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "RUSTACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Parses command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The effective verbosity level.
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Synthesize stacks into CloudFormation templates
    Synth(SynthArgs),

    /// List the declared stacks
    List(ListArgs),
}

/// Template output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML templates
    Yaml,
    /// JSON templates
    Json,
}

impl OutputFormat {
    /// Maps a configuration string onto a format, defaulting to YAML.
    pub fn from_config(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Yaml,
        }
    }
}

/// Arguments for `rustack synth`.
#[derive(Args, Debug, Clone)]
pub struct SynthArgs {
    /// Stacks to synthesize (all stacks when omitted)
    pub stacks: Vec<String>,

    /// Output format (overrides configuration)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write templates into this directory instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

impl SynthArgs {
    /// Synthesizes the selected stacks and writes the result.
    pub fn execute(&self, app: &App, config: &Config) -> Result<i32> {
        let assembly = app.synth()?;

        let selected: Vec<String> = if self.stacks.is_empty() {
            app.stack_names().iter().map(|s| s.to_string()).collect()
        } else {
            for name in &self.stacks {
                if app.stack(name).is_none() {
                    return Err(Error::StackNotFound(name.clone()));
                }
            }
            self.stacks.clone()
        };

        let format = self
            .format
            .unwrap_or_else(|| OutputFormat::from_config(&config.defaults.format));
        let out_dir = self
            .output
            .clone()
            .or_else(|| config.defaults.output_dir.clone());

        match out_dir {
            Some(dir) => {
                std::fs::create_dir_all(&dir)?;
                for name in &selected {
                    let template = assembly.template(name)?;
                    let (extension, body) = match format {
                        OutputFormat::Json => ("json", template.to_json()?),
                        OutputFormat::Yaml => ("yaml", template.to_yaml()?),
                    };
                    let path = dir.join(format!("{name}.template.{extension}"));
                    std::fs::write(&path, body)?;
                    info!(stack = %name, path = %path.display(), "wrote template");
                    println!("{} {}", "wrote".green().bold(), path.display());
                }
            }
            None => {
                let multiple = selected.len() > 1;
                for name in &selected {
                    let template = assembly.template(name)?;
                    match format {
                        OutputFormat::Yaml => {
                            if multiple {
                                println!("--- # {name}");
                            }
                            print!("{}", template.to_yaml()?);
                        }
                        OutputFormat::Json => {
                            print!("{}", template.to_json()?);
                        }
                    }
                }
            }
        }
        Ok(0)
    }
}

/// Arguments for `rustack list`.
#[derive(Args, Debug, Clone)]
pub struct ListArgs {}

impl ListArgs {
    /// Prints the declared stack names in declaration order.
    pub fn execute(&self, app: &App) -> Result<i32> {
        for name in app.stack_names() {
            println!("{name}");
        }
        Ok(0)
    }
}
