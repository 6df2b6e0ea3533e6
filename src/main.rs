use std::path::PathBuf;
use anyhow::Result;
use clap::{Parser, Subcommand};

use querybot_digest::cli::{self, ConfigOverrides};
use querybot_digest::export::OutputFormat;
use querybot_digest::logging::init_logging;

#[derive(Parser)]
#[command(name = "querybot")]
#[command(about = "Extract trading-post listings from a querybot results page and summarise prices")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// CSS selector of the results table (default: first `table`)
    #[arg(long, global = true)]
    selector: Option<String>,

    /// Page URL used to resolve relative bot links
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Drop malformed rows instead of failing the whole page
    #[arg(long, global = true)]
    skip_malformed: bool,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every listing on the page
    Listings {
        /// Saved results page, or `-` for stdin
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print min/max/average price per item for one action
    Summary {
        /// Saved results page, or `-` for stdin
        input: PathBuf,

        /// Trade action to summarise, e.g. Buy or Sell
        #[arg(short, long)]
        action: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write the default configuration file
    Init {
        #[arg(default_value = "querybot.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", cli::failure_message(&e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        config_path: cli.config,
        table_selector: cli.selector,
        base_url: cli.base_url,
        skip_malformed: cli.skip_malformed,
        log_level: cli.log_level,
    };
    let config = cli::resolve_config(&overrides)?;
    let _log_guard = init_logging(&config.logging)?;

    match cli.command {
        Commands::Listings { input, format, output } => {
            cli::listings_command(&input, format, output, &config)
        }
        Commands::Summary { input, action, format, output } => {
            cli::summary_command(&input, action, format, output, &config)
        }
        Commands::Config { command: ConfigCommands::Init { path, force } } => {
            cli::config_init_command(&path, force)
        }
    }
}
