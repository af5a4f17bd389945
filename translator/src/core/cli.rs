use clap::{Args, Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{APP_NAME_LOWER, ENV_API_KEY, ENV_CONFIG, ENV_DATASET, STDIN_INPUT};

#[derive(Parser)]
#[command(name = APP_NAME_LOWER)]
#[command(
    version,
    about = "Translate OTLP trace exports into flat, classified events",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Translate an OTLP trace export request read from a file or stdin
    Translate(TranslateArgs),
}

#[derive(Args, Clone, Debug)]
pub struct TranslateArgs {
    /// Request body file, or `-` for stdin
    #[arg(default_value = STDIN_INPUT)]
    pub input: String,

    /// Body content type (inferred from the file extension when omitted)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Body content encoding (inferred from a `.gz` extension when omitted)
    #[arg(long)]
    pub content_encoding: Option<String>,

    /// Route every batch to this dataset
    #[arg(long, short = 'd', env = ENV_DATASET)]
    pub dataset: Option<String>,

    /// API key attached to the request metadata
    #[arg(long, env = ENV_API_KEY)]
    pub api_key: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Print batch summaries without events
    #[arg(long)]
    pub summary: bool,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub dataset: Option<String>,
    pub pretty: bool,
    pub summary: bool,
}

impl CliConfig {
    fn from_cli(cli: &Cli) -> Self {
        let Commands::Translate(args) = &cli.command;
        Self {
            config: cli.config.clone(),
            dataset: args.dataset.clone(),
            pretty: args.pretty,
            summary: args.summary,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    (config, cli.command)
}
