use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fdesk_runtime::WidgetConfig;
use tracing::info;

use crate::catalog::InMemoryCatalog;
use crate::error::{DemoError, Result};
use crate::job_form::{self, JobForm};
use crate::logging;
use crate::modes::{self, ModesScreen};

const MIN_WIDTH: u16 = 40;
const MIN_HEIGHT: u16 = 20;

#[derive(Debug, Parser)]
#[command(
    name = "fdesk-demo",
    about = "Scripted sessions against the freightdesk selector, table and quick-add widgets",
    version
)]
pub struct Cli {
    /// Widget config file (TOML or JSON). Defaults come from FDESK_* variables.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Frame width in cells.
    #[arg(long, global = true, default_value_t = 72)]
    pub width: u16,

    /// Frame height in cells.
    #[arg(long, global = true, default_value_t = 24)]
    pub height: u16,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fill a job form: remote party search, carrier filtering, quick add.
    #[command(name = "job-form")]
    JobForm(JobFormArgs),

    /// Sort, page and search the mode-of-transport master table.
    Modes(ModesArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct JobFormArgs {
    /// Print only the final form values as JSON.
    #[arg(long)]
    pub values_only: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ModesArgs {
    /// Rows per page, overriding the config.
    #[arg(long)]
    pub page_size: Option<usize>,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_logs)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    if cli.width < MIN_WIDTH || cli.height < MIN_HEIGHT {
        return Err(DemoError::invalid(format!(
            "frame must be at least {MIN_WIDTH}x{MIN_HEIGHT}, got {}x{}",
            cli.width, cli.height
        )));
    }
    let catalog = InMemoryCatalog::seeded()?;
    match cli.command {
        Commands::JobForm(args) => {
            let mut form = JobForm::new(config, catalog, cli.width, cli.height);
            if args.values_only {
                let values = job_form::run_script(&mut form, &mut io::sink())?;
                writeln!(out, "{}", serde_json::to_string_pretty(&values)?)?;
            } else {
                job_form::run_script(&mut form, out)?;
            }
        }
        Commands::Modes(args) => {
            let config = match args.page_size {
                Some(0) => return Err(DemoError::invalid("--page-size must be at least 1")),
                Some(size) => config.with_page_size(size).ensure_valid()?,
                None => config,
            };
            let mut screen = ModesScreen::new(config, catalog, cli.width, cli.height);
            modes::run_script(&mut screen, out)?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<WidgetConfig> {
    let Some(path) = path else {
        return Ok(WidgetConfig::from_env());
    };
    if !path.exists() {
        return Err(DemoError::MissingConfig {
            path: path.to_path_buf(),
        });
    }
    let config = WidgetConfig::from_file(path)?.ensure_valid()?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}
