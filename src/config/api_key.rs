use crate::utils::error::{InfosearchError, Result};
use std::path::Path;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

const PLACEHOLDER_VALUE: &str = "your_api_key_here";
const KEY_FILE_TEMPLATE: &str =
    "# Add your Google Gemini API key below:\n# GEMINI_API_KEY=your_api_key_here\n";

/// Reads `GEMINI_API_KEY` from a dotenv-style file.
///
/// A missing file is created from a template so the user only has to fill
/// in the key; the call still fails so the run stops before any request.
pub fn load_api_key(path: &Path) -> Result<String> {
    let shown = path.display().to_string();

    if !path.exists() {
        std::fs::write(path, KEY_FILE_TEMPLATE)?;
        tracing::warn!("'{}' file created! Add your Google Gemini API key and re-run", shown);
        return Err(InfosearchError::MissingApiKeyError {
            path: shown,
            message: "key file was missing and has been created".to_string(),
        });
    }

    let entries = dotenvy::from_path_iter(path).map_err(|e| InfosearchError::ConfigError {
        message: format!("cannot read '{}': {}", shown, e),
    })?;

    for entry in entries {
        let (key, value) = entry.map_err(|e| InfosearchError::ConfigError {
            message: format!("cannot parse '{}': {}", shown, e),
        })?;
        if key != API_KEY_VAR {
            continue;
        }

        let value = value.trim();
        if value.is_empty() || value == PLACEHOLDER_VALUE {
            return Err(InfosearchError::MissingApiKeyError {
                path: shown,
                message: "API key is empty".to_string(),
            });
        }
        tracing::info!("✅ API key loaded successfully");
        return Ok(value.to_string());
    }

    Err(InfosearchError::MissingApiKeyError {
        path: shown,
        message: format!("no valid '{}' entry", API_KEY_VAR),
    })
}
