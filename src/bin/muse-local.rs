/// Wardrobe stylist backed by a local Ollama vision model.
///
/// Usage:
///   cargo run --bin muse-local
///
/// Requirements:
///   - Ollama running locally (default: http://localhost:11434)
///   - A vision-capable model pulled (default: ollama pull llava:7b)
use muse::app;
use muse::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::init_tracing();
    app::load_env(&std::env::current_dir()?);

    let config = MuseConfig::from_env()?;
    let state = app::local_state(&config)?;

    muse::web::serve(state, &config).await?;

    Ok(())
}
