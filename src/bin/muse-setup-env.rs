/// Create the .env file holding the Gemini API key.
///
/// Usage:
///   cargo run --bin muse-setup-env
use muse::credentials::{self, API_KEY_URL, ENV_FILE_NAME};
use std::io::{self, BufRead, Write};
use std::path::Path;

fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn main() -> anyhow::Result<()> {
    let env_file = Path::new(ENV_FILE_NAME);

    if env_file.exists() {
        println!("{} file already exists!", ENV_FILE_NAME);
        let answer = prompt("Do you want to overwrite it? (y/n): ")?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Cancelled. Existing {} file preserved.", ENV_FILE_NAME);
            return Ok(());
        }
    }

    println!();
    println!("Gemini API Key Setup");
    println!("{}", "=".repeat(40));
    println!("You need a Gemini API key from Google AI Studio.");
    println!("Get it here: {}", API_KEY_URL);
    println!();

    let api_key = prompt("Enter your Gemini API key: ")?;
    if api_key.is_empty() {
        println!("No API key provided. Setup cancelled.");
        return Ok(());
    }

    credentials::write_env_file(env_file, &api_key)?;

    let location = std::fs::canonicalize(env_file)?;
    println!();
    println!("{} file created successfully!", ENV_FILE_NAME);
    println!("Location: {}", location.display());
    println!();
    println!("Keep {} out of version control.", ENV_FILE_NAME);
    println!("You can now run: cargo run --bin muse-cloud");

    Ok(())
}
