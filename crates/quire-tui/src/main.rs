//! quire entry point.

use std::{
    fs::{self, File},
    sync::Mutex,
};

use clap::Parser;
use quire_tui::{Config, LocalBackend, Runtime, Style, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Terminal reader for a stash of markdown documents
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(about = "Read and annotate your markdown stash in the terminal")]
#[command(version)]
struct Args {
    /// Colour theme
    #[arg(short, long, value_enum, default_value_t = Style::Auto)]
    style: Style,
}

/// Log to a file in the data dir; the terminal belongs to the UI.
fn init_logging(config: &Config) -> Result<(), std::io::Error> {
    fs::create_dir_all(&config.data_dir)?;
    let file = File::create(config.log_path())?;
    let filter =
        EnvFilter::try_from_env("QUIRE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::from_env();
    init_logging(&config)?;

    let theme = args.style.resolve();
    tracing::info!(style = ?args.style, dark = theme.dark, "quire starting");

    let driver = TerminalDriver::new(theme)?;
    let app = Runtime::new(driver, LocalBackend::new(config)).run().await?;

    match app.error() {
        Some(error) => Err(error.clone().into()),
        None => Ok(()),
    }
}
