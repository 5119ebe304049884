//! Language configuration for executing submissions

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Configuration for a supported submission language
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Name of the source file the submission is written to (e.g. "main.py")
    pub source_file: String,
    /// Run command; the submission's argument tuple is appended to it
    pub run_command: Vec<String>,
}

/// Raw TOML configuration for a language
#[derive(Debug, Deserialize)]
struct RawLanguageConfig {
    source_file: String,
    run_command: String,
    #[serde(default)]
    aliases: Vec<String>,
}

/// Registry of supported languages, loaded once at startup and owned by the
/// runner rather than kept as process-wide state.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: HashMap<String, LanguageConfig>,
}

impl LanguageRegistry {
    /// Load the registry from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read language config {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parse the registry from TOML text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let raw_configs: HashMap<String, RawLanguageConfig> =
            toml::from_str(content).context("Failed to parse language config")?;

        let mut languages = HashMap::new();
        for (name, raw) in raw_configs {
            let config = LanguageConfig {
                source_file: raw.source_file,
                run_command: into_command(&raw.run_command),
            };

            languages.insert(name.to_lowercase(), config.clone());
            for alias in raw.aliases {
                languages.insert(alias.to_lowercase(), config.clone());
            }
        }

        Ok(Self { languages })
    }

    /// Look up a language configuration by name, case-insensitively.
    pub fn get(&self, language: &str) -> Option<&LanguageConfig> {
        self.languages.get(&language.to_lowercase())
    }

    /// All supported language names, including aliases.
    pub fn supported(&self) -> Vec<String> {
        self.languages.keys().cloned().collect()
    }
}

fn into_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(|s| s.to_string()).collect()
}
