//! Run configuration from `.env.json` with CLI overrides.
//!
//! The config file is optional; a missing file falls back to defaults.
//! CLI flags take precedence over the file, the file over the defaults.
//! The only thing that must come from somewhere is at least one module
//! name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_SERVER: &str = "localhost";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_OUT_PATH: &str = "schema";

/// Raw contents of `.env.json`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "SERVER_ADDRESS")]
    pub server_address: Option<String>,
    #[serde(rename = "PORT")]
    pub port: Option<u16>,
    #[serde(rename = "MODULE")]
    pub module: Option<ModuleList>,
    #[serde(rename = "OUT_PATH")]
    pub out_path: Option<PathBuf>,
}

/// `MODULE` accepts a single name or a list of names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModuleList {
    One(String),
    Many(Vec<String>),
}

impl ModuleList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ModuleList::One(module) => vec![module],
            ModuleList::Many(modules) => modules,
        }
    }
}

impl ConfigFile {
    /// Read the config file; a missing file is an empty config, a
    /// malformed one is an error.
    pub fn read(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(ConfigFile::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read config file {}: {err}", path.display()))?;
        serde_json::from_str(&contents)
            .map_err(|err| format!("Failed to parse config file {}: {err}", path.display()))
    }
}

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    server_address: String,
    port: u16,
    modules: Vec<String>,
    out_path: PathBuf,
}

impl Config {
    /// Layer CLI overrides on top of the file, then the defaults.
    pub fn resolve(
        file: ConfigFile,
        server: Option<String>,
        port: Option<u16>,
        modules: &[String],
        out_path: Option<PathBuf>,
    ) -> Result<Self, String> {
        let resolved_modules = if modules.is_empty() {
            file.module.map(ModuleList::into_vec).unwrap_or_default()
        } else {
            modules.to_vec()
        };
        if resolved_modules.iter().all(|m| m.trim().is_empty()) {
            return Err(
                "No module configured: pass --module or set MODULE in .env.json".to_string(),
            );
        }
        Ok(Config {
            server_address: server
                .or(file.server_address)
                .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            port: port.or(file.port).unwrap_or(DEFAULT_PORT),
            modules: resolved_modules,
            out_path: out_path
                .or(file.out_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_PATH)),
        })
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_is_empty_config() {
        let file = ConfigFile::read(Path::new("/nonexistent/.env.json")).unwrap();
        assert!(file.server_address.is_none());
        assert!(file.module.is_none());
    }

    #[test]
    fn test_reads_single_and_many_modules() {
        let single: ConfigFile = serde_json::from_str(r#"{"MODULE": "game"}"#).unwrap();
        assert_eq!(single.module.unwrap().into_vec(), ["game"]);

        let many: ConfigFile =
            serde_json::from_str(r#"{"MODULE": ["game", "second_module"]}"#).unwrap();
        assert_eq!(many.module.unwrap().into_vec(), ["game", "second_module"]);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env.json");
        let mut f = fs::File::create(&path).unwrap();
        write!(
            f,
            r#"{{"SERVER_ADDRESS": "10.0.0.5", "PORT": 4000, "MODULE": "game", "OUT_PATH": "bindings"}}"#
        )
        .unwrap();
        let file = ConfigFile::read(&path).unwrap();
        let config = Config::resolve(file, None, None, &[], None).unwrap();
        assert_eq!(config.server_address(), "10.0.0.5");
        assert_eq!(config.port(), 4000);
        assert_eq!(config.modules(), ["game"]);
        assert_eq!(config.out_path(), Path::new("bindings"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file: ConfigFile =
            serde_json::from_str(r#"{"SERVER_ADDRESS": "10.0.0.5", "MODULE": "game"}"#).unwrap();
        let config = Config::resolve(
            file,
            Some("192.168.1.9".to_string()),
            Some(5000),
            &["other".to_string()],
            None,
        )
        .unwrap();
        assert_eq!(config.server_address(), "192.168.1.9");
        assert_eq!(config.port(), 5000);
        assert_eq!(config.modules(), ["other"]);
        assert_eq!(config.out_path(), Path::new("schema"));
    }

    #[test]
    fn test_no_module_anywhere_is_an_error() {
        let err = Config::resolve(ConfigFile::default(), None, None, &[], None).unwrap_err();
        assert!(err.contains("No module configured"));
    }
}
