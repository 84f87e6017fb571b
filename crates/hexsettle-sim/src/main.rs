//! Headless hexsettle game played by bots.
//!
//! Prints the final snapshot as JSON on stdout; logs go to stderr.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod settings;
mod table;

use settings::Settings;
use table::Table;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::from_env()?;
    info!(
        players = settings.config.players,
        seed = ?settings.config.seed,
        turns = settings.turns,
        "Starting hexsettle simulation..."
    );

    let mut table = Table::new(settings.config, settings.difficulty, settings.turns)?;
    let snapshot = table.run()?;

    println!("{}", snapshot.to_json()?);
    Ok(())
}
