//! Gemini credential file handling.
//!
//! The cloud stylist reads `GEMINI_API_KEY` from the process environment, usually
//! populated from a `.env` file. This module finds and loads that file, inspects it
//! for common formatting mistakes, and renders the remediation text shown when the
//! key is missing. It also backs the `muse-setup-env` and `muse-check-env` utilities.

use crate::error::{MuseError, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const API_KEY_URL: &str = "https://aistudio.google.com/apikey";
pub const ENV_FILE_NAME: &str = ".env";

/// Outcome of trying to load a `.env` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFileStatus {
    /// Where the file was expected: `.env` in the starting directory
    pub expected_path: PathBuf,
    /// The file actually used, which may be in a parent directory
    pub found_path: Option<PathBuf>,
    pub loaded: bool,
    pub error: Option<String>,
}

/// First `.env` in `start_dir` or any of its ancestors.
pub fn locate_env_file(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(ENV_FILE_NAME))
        .find(|path| path.is_file())
}

/// Load the nearest `.env` into the process environment.
///
/// Variables already set in the environment keep their values.
pub fn load_env_file(start_dir: &Path) -> EnvFileStatus {
    let expected_path = start_dir.join(ENV_FILE_NAME);

    let Some(path) = locate_env_file(start_dir) else {
        debug!("No {} file found from {}", ENV_FILE_NAME, start_dir.display());
        return EnvFileStatus {
            expected_path,
            found_path: None,
            loaded: false,
            error: None,
        };
    };

    match dotenv::from_path(&path) {
        Ok(()) => {
            debug!("Loaded environment from {}", path.display());
            EnvFileStatus {
                expected_path,
                found_path: Some(path),
                loaded: true,
                error: None,
            }
        }
        Err(e) => {
            warn!("Failed to load {}: {}", path.display(), e);
            EnvFileStatus {
                expected_path,
                found_path: Some(path),
                loaded: false,
                error: Some(e.to_string()),
            }
        }
    }
}

/// The Gemini key from `lookup`, or [`MuseError::MissingCredential`] if unset or blank.
pub fn require_api_key<F>(lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(API_KEY_VAR)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| MuseError::MissingCredential(API_KEY_VAR.to_string()))
}

/// `***` followed by the last four characters, or just `***` for short values.
pub fn mask_secret(value: &str) -> String {
    let count = value.chars().count();
    if count > 4 {
        let tail: String = value.chars().skip(count - 4).collect();
        format!("***{}", tail)
    } else {
        "***".to_string()
    }
}

/// Formatting problems worth pointing out in a credential line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvWarning {
    EmptyValue,
    QuotedValue,
    SpacesAroundEquals,
}

impl EnvWarning {
    pub fn message(&self) -> &'static str {
        match self {
            EnvWarning::EmptyValue => "Value is empty!",
            EnvWarning::QuotedValue => "Value has quotes - remove them!",
            EnvWarning::SpacesAroundEquals => "Check for spaces around = sign!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvLine {
    Blank,
    Comment,
    Entry {
        line_no: usize,
        key: String,
        masked_value: String,
        warnings: Vec<EnvWarning>,
    },
    Malformed {
        line_no: usize,
    },
}

/// Line-by-line view of a `.env` file with secrets masked
#[derive(Debug, Clone)]
pub struct EnvFileReport {
    pub path: PathBuf,
    pub size: usize,
    pub lines: Vec<EnvLine>,
}

impl EnvFileReport {
    pub fn has_api_key_entry(&self) -> bool {
        self.api_key_entry().is_some()
    }

    pub fn api_key_entry(&self) -> Option<&EnvLine> {
        self.lines
            .iter()
            .find(|line| matches!(line, EnvLine::Entry { key, .. } if key == API_KEY_VAR))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

pub fn inspect_env_file(path: &Path) -> Result<EnvFileReport> {
    let content = fs::read_to_string(path)?;
    Ok(EnvFileReport {
        path: path.to_path_buf(),
        size: content.len(),
        lines: parse_env_lines(&content),
    })
}

fn parse_env_lines(content: &str) -> Vec<EnvLine> {
    content
        .lines()
        .enumerate()
        .map(|(index, raw)| {
            let line_no = index + 1;
            let line = raw.trim();

            if line.is_empty() {
                return EnvLine::Blank;
            }
            if line.starts_with('#') {
                return EnvLine::Comment;
            }

            let Some((raw_key, raw_value)) = line.split_once('=') else {
                return EnvLine::Malformed { line_no };
            };

            let key = raw_key.trim().to_string();
            let value = raw_value.trim();

            let mut warnings = Vec::new();
            if key == API_KEY_VAR {
                if value.is_empty() {
                    warnings.push(EnvWarning::EmptyValue);
                }
                if is_quoted(value) {
                    warnings.push(EnvWarning::QuotedValue);
                }
                if raw_key.ends_with(char::is_whitespace) || raw_value.starts_with(char::is_whitespace)
                {
                    warnings.push(EnvWarning::SpacesAroundEquals);
                }
            }

            EnvLine::Entry {
                line_no,
                key,
                masked_value: mask_secret(value),
                warnings,
            }
        })
        .collect()
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
}

/// Write a fresh credential file containing only the Gemini key.
pub fn write_env_file(path: &Path, api_key: &str) -> Result<()> {
    fs::write(path, format!("{}={}\n", API_KEY_VAR, api_key))?;
    Ok(())
}

/// Text shown when the cloud stylist cannot start for lack of a key.
pub fn remediation(status: &EnvFileStatus) -> String {
    let mut out = String::new();
    let file_path = status.found_path.as_deref().unwrap_or(&status.expected_path);

    let _ = writeln!(out, "{} environment variable not found.", API_KEY_VAR);
    let _ = writeln!(out);
    let _ = writeln!(out, "Debug information:");
    let _ = writeln!(out, "  Expected .env path: {}", status.expected_path.display());
    if let Some(found) = &status.found_path {
        let _ = writeln!(out, "  Found .env path:    {}", found.display());
    }
    let _ = writeln!(out, "  .env file exists:   {}", status.found_path.is_some());
    let _ = writeln!(out, "  Environment loaded: {}", status.loaded);
    if let Some(error) = &status.error {
        let _ = writeln!(out, "  Error: {}", error);
    }

    if status.found_path.is_some() {
        match inspect_env_file(file_path) {
            Ok(report) => {
                let _ = writeln!(out, "  .env file found with {} line(s)", report.line_count());
                for line in &report.lines {
                    if let EnvLine::Entry { key, .. } = line {
                        let _ = writeln!(out, "    {}=***HIDDEN***", key);
                    }
                }
                if report.has_api_key_entry() {
                    let _ = writeln!(
                        out,
                        "  {} found in .env file but not loaded into environment.",
                        API_KEY_VAR
                    );
                    let _ = writeln!(
                        out,
                        "  Check the file format (no spaces around =, no quotes) and that it is UTF-8."
                    );
                }
            }
            Err(e) => {
                let _ = writeln!(out, "  Error reading .env file: {}", e);
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Solution: create a .env file at {} containing:", status.expected_path.display());
    let _ = writeln!(out, "  {}=your-api-key-here", API_KEY_VAR);
    let _ = writeln!(out, "Get your API key from: {}", API_KEY_URL);
    let _ = writeln!(out, "Or run: muse-setup-env");
    let _ = write!(out, "Then restart the server.");

    out
}
