use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

use rating_table::config::Config;
use rating_table::{logging, pipeline};

#[derive(Parser)]
#[command(name = "rating_table")]
#[command(about = "Merge engine rating lists into a self-contained HTML table")]
#[command(version)]
struct Cli {
    /// Site root; data, template and output paths resolve against it
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// TOML config file (defaults to <root>/rating_table.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Template containing the data marker
    #[arg(long)]
    template: Option<PathBuf>,

    /// Page to write
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(&cli.root, cli.config.as_deref())
        .with_context(|| format!("loading configuration for {}", cli.root.display()))?;
    if let Some(template) = &cli.template {
        config = config.with_template(template);
    }
    if let Some(output) = &cli.output {
        config = config.with_output(output);
    }
    Ok(config)
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    let guard = logging::init_logging(config.log_dir.as_deref());

    match pipeline::run(&config).context("building rating table") {
        Ok(result) => {
            if !result.warnings.is_empty() {
                warn!("{} warnings during run", result.warnings.len());
            }
            println!("{}", result.summary());
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            // process::exit skips destructors; flush the log file first
            drop(guard);
            std::process::exit(1);
        }
    }
}
