/// Check that the .env file is found, well formed, and loads GEMINI_API_KEY.
///
/// Usage:
///   cargo run --bin muse-check-env
use muse::credentials::{self, EnvLine, API_KEY_VAR};
use std::process::exit;

fn main() -> anyhow::Result<()> {
    let rule = "=".repeat(70);
    println!("{}", rule);
    println!("Testing .env File Loading");
    println!("{}", rule);

    let start_dir = std::env::current_dir()?;
    let env_path = credentials::locate_env_file(&start_dir);

    println!();
    println!("1. Start directory: {}", start_dir.display());
    println!("2. Expected .env path: {}", start_dir.join(credentials::ENV_FILE_NAME).display());
    println!("3. .env file exists: {}", env_path.is_some());

    let Some(env_path) = env_path else {
        println!();
        println!("4. .env file not found!");
        println!("   Create it with: cargo run --bin muse-setup-env");
        exit(1);
    };

    println!();
    println!("4. Reading {}...", env_path.display());
    let report = match credentials::inspect_env_file(&env_path) {
        Ok(report) => report,
        Err(e) => {
            println!("   Error reading file: {}", e);
            exit(1);
        }
    };
    println!("   File size: {} bytes", report.size);
    println!("   Number of lines: {}", report.line_count());
    for line in &report.lines {
        match line {
            EnvLine::Entry {
                line_no,
                key,
                masked_value,
                warnings,
            } => {
                println!("   Line {}: {} = {}", line_no, key, masked_value);
                for warning in warnings {
                    println!("      WARNING: {}", warning.message());
                }
            }
            EnvLine::Malformed { line_no } => {
                println!("   Line {}: not a KEY=value entry", line_no);
            }
            EnvLine::Blank | EnvLine::Comment => {}
        }
    }

    println!();
    println!("5. Loading .env file...");
    let status = credentials::load_env_file(&start_dir);
    println!("   Loaded: {}", status.loaded);
    if let Some(error) = &status.error {
        println!("   Error loading .env: {}", error);
        exit(1);
    }

    println!();
    println!("6. Checking environment variable...");
    match credentials::require_api_key(|key| std::env::var(key).ok()) {
        Ok(api_key) => {
            println!("   SUCCESS! {} found in environment", API_KEY_VAR);
            println!("   Length: {} characters", api_key.chars().count());
            println!("   Preview: {}", credentials::mask_secret(&api_key));
            println!();
            println!("All checks passed! .env file loading works correctly.");
        }
        Err(_) => {
            println!("   FAILED! {} not found in environment", API_KEY_VAR);
            println!();
            println!("Troubleshooting:");
            println!("   1. Check .env file format: {}=your-key (no spaces)", API_KEY_VAR);
            println!("   2. Make sure there are no quotes around the value");
            println!("   3. Make sure the file is saved as UTF-8");
            println!("   4. Try: export {}=your-key (to test if it works)", API_KEY_VAR);
            exit(1);
        }
    }

    println!("{}", rule);
    Ok(())
}
