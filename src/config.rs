//! Editor Configuration
//! Prefixes for generated names and defaults for new documents.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::csm::MemoryMode;

pub const CONFIG_ENV_VAR: &str = "CSM_EDITOR_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config '{}': {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("CSM_EDITOR_CONFIG is not valid unicode")]
    NotUnicode,
}

/// Prefix used when generating a unique name for each entity category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NamePrefixes {
    pub state: String,
    pub state_machine: String,
    pub action: String,
    pub guard: String,
    pub event: String,
    pub context: String,
    pub service_type: String,
}

impl Default for NamePrefixes {
    fn default() -> Self {
        Self {
            state: "State".to_string(),
            state_machine: "StateMachine".to_string(),
            action: "action".to_string(),
            guard: "guard".to_string(),
            event: "event".to_string(),
            context: "context".to_string(),
            service_type: "service".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub prefixes: NamePrefixes,
    pub default_name: String,
    pub default_version: String,
    pub memory_mode: MemoryMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            prefixes: NamePrefixes::default(),
            default_name: "csm".to_string(),
            default_version: "1.0".to_string(),
            memory_mode: MemoryMode::default(),
        }
    }
}

impl EditorConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&source).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the file named by `CSM_EDITOR_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(&path)),
            Ok(_) | Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "prefixes": { "state": "S" }, "defaultVersion": "3" }"#)
                .expect("Should deserialize");

        assert_eq!(config.prefixes.state, "S");
        assert_eq!(config.prefixes.state_machine, "StateMachine");
        assert_eq!(config.default_version, "3");
        assert_eq!(config.default_name, "csm");
        assert_eq!(config.memory_mode, MemoryMode::Distributed);
    }

    #[test]
    fn test_memory_mode_is_lowercase() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "memoryMode": "shared" }"#).expect("Should deserialize");
        assert_eq!(config.memory_mode, MemoryMode::Shared);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = EditorConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_reads_file() {
        let path = env::temp_dir().join(format!("csm-editor-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "defaultName": "plant" }"#).expect("write");

        let config = EditorConfig::load(&path).expect("Should load");
        fs::remove_file(&path).ok();

        assert_eq!(config.default_name, "plant");
    }
}
