use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio::build::build_site;
use folio::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio", version, about = "Builds a static blog from markdown posts")]
struct Cli {
    /// Log every document processed
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site
    Build {
        /// Directory to search (along with its parents) for `folio.yaml`
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Write output here instead of the configured output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match cli.verbose {
            true => "debug",
            false => "info",
        })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Build { project, output } => {
            let project = project
                .canonicalize()
                .with_context(|| format!("Resolving project directory '{}'", project.display()))?;
            let mut config = Config::from_directory(&project)?;
            if let Some(output) = output {
                config.output_directory = output;
            }
            build_site(&config)?;
        }
    }

    Ok(())
}
