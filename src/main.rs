use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use repaint::account::load_accounts;
use repaint::clock::TokioClock;
use repaint::config::Config;
use repaint::image::ReferenceImage;
use repaint::{logging, RemoteCanvas, Scheduler};
use tracing::info;

/// Repaint a canvas region to match a reference image.
#[derive(Debug, Parser)]
#[command(name = "repaint", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Token file, one init-data token per line.
    #[arg(long)]
    accounts: Option<PathBuf>,

    /// Reference image, one row of color codes per line.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Run a single cycle and exit.
    #[arg(long)]
    once: bool,

    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(path) = cli.accounts {
        config.accounts_path = path;
    }
    if let Some(path) = cli.image {
        config.image.path = path;
    }

    let accounts = load_accounts(&config.accounts_path)?;
    let image = ReferenceImage::load(&config.image.path, config.image.skip_marker)?;
    let target = config.palette()?.resolve(&image)?;
    info!(
        accounts = accounts.len(),
        width = target.width(),
        height = target.height(),
        "loaded"
    );

    let canvas = RemoteCanvas::new(config.base_url()?, config.timeout(), config.retry_policy())?;
    let mut scheduler = Scheduler::new(
        canvas,
        TokioClock,
        StdRng::from_entropy(),
        accounts,
        target,
        config.geometry(),
    )
    .with_pacing(config.pacing())
    .with_period(config.cycle_period());

    if cli.once {
        scheduler.run_cycle().await;
    } else {
        scheduler.run_forever().await;
    }
    Ok(())
}
