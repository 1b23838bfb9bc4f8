#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! eproto Configuration
//!
//! This crate provides configuration management for the eproto compiler.
//! It handles loading, saving, and managing configuration files that specify:
//! - The default emitter strategy (`native`, `evolved`, `zod`, or `skip`)
//! - The default output directory for generated files
//! - Logging verbosity
//!
//! Configuration is stored in TOML format as an optional `eproto.toml` at the
//! source root. Unlike a connection profile, absence of the file is not an
//! error: callers fall back to [`Config::default`].

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Configuration file was not found at the specified path.
    #[error("Config file not found at: {0}")]
    NotFound(PathBuf),
    /// Could not locate the user's configuration directory.
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Emitter selection, mirroring the `-g`/`--gen` CLI flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Protobuf-wire-compatible output.
    Native,
    /// Relaxed, compact encoding for `Nullable` and nested `Array`.
    Evolved,
    /// Zod schema output (validation only, no wire codec).
    Zod,
    /// Skip emission entirely.
    Skip,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Native
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Strategy::Native => "native",
            Strategy::Evolved => "evolved",
            Strategy::Zod => "zod",
            Strategy::Skip => "skip",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(Strategy::Native),
            "evolved" => Ok(Strategy::Evolved),
            "zod" => Ok(Strategy::Zod),
            "skip" => Ok(Strategy::Skip),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Code generation settings.
    pub codegen: CodegenConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Code generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Default emitter strategy, used when `-g` is not passed on the command line.
    pub strategy: Strategy,
    /// Where to write generated modules by default.
    pub output_dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration for a compilation rooted at `source_root`.
    ///
    /// Looks for `eproto.toml` directly inside `source_root`; if it isn't
    /// there, [`Config::default`] is returned rather than an error.
    pub fn load<P: AsRef<Path>>(source_root: P) -> Result<Self, ConfigError> {
        let path = source_root.as_ref().join("eproto.toml");
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::FileRead(err)),
        }
    }

    /// Save this configuration as a pretty-printed TOML file at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path: `{config_dir()}/eproto/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("eproto");
        Ok(config_dir.join("config.toml"))
    }

    /// Get the default output directory for generated code.
    pub fn default_output_dir() -> PathBuf {
        Self::default_output_dir_internal(
            std::env::var("OUT_DIR").ok(),
            std::env::current_dir().ok(),
        )
    }

    fn default_output_dir_internal(
        out_dir: Option<String>,
        current_dir: Option<PathBuf>,
    ) -> PathBuf {
        if let Some(out_dir) = out_dir {
            return PathBuf::from(out_dir);
        }

        if let Some(current_dir) = current_dir {
            return current_dir;
        }

        PathBuf::from(".")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            codegen: CodegenConfig { strategy: Strategy::default(), output_dir: Self::default_output_dir() },
            logging: LoggingConfig { level: "info".to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_file() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        let toml_content = r#"
            [codegen]
            strategy = "evolved"
            output_dir = "generated"

            [logging]
            level = "debug"
        "#;
        fs::write(&temp_file, toml_content)
            .expect("Failed to write TOML content to temporary file");

        let loaded_config =
            Config::from_file(&temp_file).expect("Failed to load config from temporary file");
        assert_eq!(loaded_config.codegen.strategy, Strategy::Evolved);
        assert_eq!(loaded_config.codegen.output_dir, PathBuf::from("generated"));
        assert_eq!(loaded_config.logging.level, "debug");

        let result = Config::from_file("nonexistent_file.toml");
        assert!(result.is_err());
        match result.expect_err("Expected error for nonexistent file") {
            ConfigError::FileRead(_) => {}
            _ => panic!("Expected FileRead error"),
        }

        let temp_file =
            NamedTempFile::new().expect("Failed to create temporary file for parse error test");
        fs::write(&temp_file, "invalid toml content")
            .expect("Failed to write invalid TOML content");

        let result = Config::from_file(&temp_file);
        assert!(result.is_err());
        match result.expect_err("Expected parse error for invalid TOML") {
            ConfigError::Parse(_) => {}
            _ => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn test_load_falls_back_to_default_when_absent() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let config = Config::load(temp_dir.path()).expect("load should not fail when file is absent");
        assert_eq!(config.codegen.strategy, Strategy::Native);
    }

    #[test]
    fn test_load_reads_eproto_toml_from_source_root() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        fs::write(
            temp_dir.path().join("eproto.toml"),
            "[codegen]\nstrategy = \"zod\"\noutput_dir = \"out\"\n\n[logging]\nlevel = \"trace\"\n",
        )
        .expect("Failed to write eproto.toml");

        let config = Config::load(temp_dir.path()).expect("load should succeed");
        assert_eq!(config.codegen.strategy, Strategy::Zod);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_save() {
        let config = Config::default();
        let temp_file =
            NamedTempFile::new().expect("Failed to create temporary file for save test");

        let result = config.save(&temp_file);
        assert!(result.is_ok());

        let contents = fs::read_to_string(&temp_file).expect("Failed to read saved config file");
        assert!(contents.contains("native"));
        assert!(contents.contains("info"));

        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let non_existent_subdir = temp_dir.path().join("nonexistent").join("config.toml");

        let result = config.save(&non_existent_subdir);
        assert!(result.is_err());
        match result.expect_err("Expected file write error for non-existent directory") {
            ConfigError::FileRead(_) => (),
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_path() {
        let path = Config::default_path().expect("Failed to get default config path");
        let path_str = path.to_str().expect("Path should be valid UTF-8");
        assert!(path_str.contains("eproto"));
        assert!(path_str.ends_with("config.toml"));
    }

    #[test]
    fn test_default_output_dir_internal() {
        let dir = Config::default_output_dir_internal(
            Some("/tmp/out_dir".to_string()),
            Some(PathBuf::from("/tmp/current")),
        );
        assert_eq!(dir, PathBuf::from("/tmp/out_dir"));

        let dir = Config::default_output_dir_internal(None, Some(PathBuf::from("/tmp/current")));
        assert_eq!(dir, PathBuf::from("/tmp/current"));

        let dir = Config::default_output_dir_internal(None, None);
        assert_eq!(dir, PathBuf::from("."));
    }

    #[test]
    fn test_default() {
        let config = Config::default();
        assert_eq!(config.codegen.strategy, Strategy::Native);
        assert_eq!(config.logging.level, "info");
        assert!(!config
            .codegen
            .output_dir
            .to_str()
            .expect("Output directory path should be valid UTF-8")
            .is_empty());
    }

    #[test]
    fn strategy_from_str_roundtrips_through_display() {
        for s in [Strategy::Native, Strategy::Evolved, Strategy::Zod, Strategy::Skip] {
            let parsed: Strategy = s.to_string().parse().expect("valid strategy string");
            assert_eq!(parsed, s);
        }
        assert!("bogus".parse::<Strategy>().is_err());
    }
}
