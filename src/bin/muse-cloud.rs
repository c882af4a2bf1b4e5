/// Wardrobe stylist backed by the Gemini API.
///
/// Usage:
///   cargo run --bin muse-cloud
///
/// Requirements:
///   - GEMINI_API_KEY set in the environment or in a .env file
///     (create one with `cargo run --bin muse-setup-env`)
use muse::app;
use muse::credentials;
use muse::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::init_tracing();

    let start_dir = std::env::current_dir()?;
    let env_status = app::load_env(&start_dir);

    let config = MuseConfig::from_env()?;
    let state = match app::cloud_state(&config, |key| std::env::var(key).ok()) {
        Ok(state) => state,
        Err(MuseError::MissingCredential(_)) => {
            eprintln!("{}", credentials::remediation(&env_status));
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    muse::web::serve(state, &config).await?;

    Ok(())
}
