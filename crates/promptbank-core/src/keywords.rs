use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::{ConfigError, Keyword};

#[derive(Debug, Deserialize)]
pub struct KeywordsFile {
    pub keywords: Vec<Keyword>,
}

/// Load and validate keyword definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_keywords(path: &Path) -> Result<KeywordsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::KeywordsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_keywords(&content)
}

/// Parse and validate keyword definitions from YAML text.
///
/// Bound ordering is deliberately left unchecked: a keyword whose start is
/// after its end is accepted and simply never matches.
///
/// # Errors
///
/// Returns `ConfigError` if the text cannot be parsed or fails validation.
pub fn parse_keywords(content: &str) -> Result<KeywordsFile, ConfigError> {
    let keywords_file: KeywordsFile = serde_yaml::from_str(content)?;
    validate_keywords(&keywords_file)?;
    Ok(keywords_file)
}

fn validate_keywords(keywords_file: &KeywordsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for keyword in &keywords_file.keywords {
        if !seen.insert(keyword) {
            let mode = if keyword.uses_pattern_match {
                "pattern"
            } else {
                "literal"
            };
            return Err(ConfigError::Validation(format!(
                "duplicate keyword: '{}' ({mode} mode, same bounds)",
                keyword.text
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "keywords_test.rs"]
mod tests;
