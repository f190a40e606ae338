mod logging;
mod run;

use anyhow::{Context, Result};
use clap::Parser;
use hoh_core::Config;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "hoh-analyzer")]
#[command(about = "Heroes of History startup analyzer", long_about = None)]
struct Cli {
    /// Directory for raw input and generated output
    #[arg(short, long, env = "HOH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Startup JSON document, relative to the working directory
    /// (defaults to <data-dir>/raw/startup.json)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the CSV exports
    #[arg(long)]
    no_csv: bool,

    /// Skip the HTML dashboard
    #[arg(long)]
    no_dashboard: bool,

    /// Do not empty the output folders before writing
    #[arg(long)]
    keep_existing: bool,

    /// Log at debug level unless HOH_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Load the config file (if any) and apply flag overrides.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(dir) = &self.data_dir {
            config.output.data_dir = dir.clone();
        }
        if let Some(input) = &self.input {
            let input = if input.is_absolute() {
                input.clone()
            } else {
                std::env::current_dir()
                    .context("Failed to resolve working directory")?
                    .join(input)
            };
            config.input.startup_file = input.to_string_lossy().into_owned();
        }
        if self.no_csv {
            config.output.write_csv = false;
        }
        if self.no_dashboard {
            config.output.write_dashboard = false;
        }
        if self.keep_existing {
            config.output.clean_on_start = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.resolve_config().and_then(|config| run::run(&config)) {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
