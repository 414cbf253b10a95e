use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const DICTIONARY_PASSING_ENV: &str = "PRIME_TRAITS_DICTIONARIES";
pub const LOG_ENV: &str = "PRIME_TRAITS_LOG";

/// When a leading Dictionary argument is treated as explicit instance
/// evidence rather than an ordinary positional argument.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DictionaryPassing {
    #[default]
    Leading,
    Tagged,
}

impl DictionaryPassing {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "leading" => Some(DictionaryPassing::Leading),
            "tagged" => Some(DictionaryPassing::Tagged),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RuntimeConfig {
    pub dictionary_passing: DictionaryPassing,
    pub alias_expansion_limit: usize,
    pub log: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            dictionary_passing: DictionaryPassing::Leading,
            alias_expansion_limit: 32,
            log: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid value `{value}` for {key}; expected `leading` or `tagged`")]
    InvalidOverride { key: &'static str, value: String },
}

impl RuntimeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|error| error.to_string())
    }

    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(value) = env::var(DICTIONARY_PASSING_ENV) {
            self.dictionary_passing =
                DictionaryPassing::parse(&value).ok_or(ConfigError::InvalidOverride {
                    key: DICTIONARY_PASSING_ENV,
                    value,
                })?;
        }
        if let Ok(filter) = env::var(LOG_ENV) {
            self.log = Some(filter);
        }
        Ok(self)
    }

    pub fn log_filter(&self) -> &str {
        self.log.as_deref().unwrap_or("warn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_keys_take_defaults() {
        let config = RuntimeConfig::parse("log = \"debug\"").expect("parse");
        assert_eq!(config.dictionary_passing, DictionaryPassing::Leading);
        assert_eq!(config.alias_expansion_limit, 32);
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn loads_tagged_mode_from_file() {
        let mut file = NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            "dictionary-passing = \"tagged\"\nalias-expansion-limit = 4"
        )
        .expect("write config");
        let config = RuntimeConfig::load(file.path()).expect("load");
        assert_eq!(config.dictionary_passing, DictionaryPassing::Tagged);
        assert_eq!(config.alias_expansion_limit, 4);
    }

    #[test]
    fn reports_unknown_passing_mode() {
        let err = RuntimeConfig::parse("dictionary-passing = \"sniff\"").unwrap_err();
        assert!(err.contains("dictionary-passing") || err.contains("unknown variant"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = RuntimeConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
