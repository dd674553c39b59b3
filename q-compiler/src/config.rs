//! Compiler configuration and settings

use crate::backend::{CodegenOptions, CompilationTarget};
use crate::names::Substitutions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_TARGET: &str = "java";
const DEFAULT_INDENT_WIDTH: usize = 4;
const DEFAULT_HOLDER_TYPE: &str = "Functions";
const DEFAULT_SELF_NAME: &str = "self";

/// Main compiler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub target: String,
    pub indent_width: usize,
    /// Name of the class hosting each package's free functions
    pub holder_type: String,
    /// Receiver name bound inside method macros
    pub self_name: String,
    /// Emit the `Builtins` runtime class next to the sources
    pub emit_runtime: bool,
    /// Source identifiers replaced on output
    pub builtins: Substitutions,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            indent_width: DEFAULT_INDENT_WIDTH,
            holder_type: DEFAULT_HOLDER_TYPE.to_string(),
            self_name: DEFAULT_SELF_NAME.to_string(),
            emit_runtime: false,
            builtins: Substitutions::java(),
        }
    }
}

impl CompilerConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e,
        })
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize { error: e })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                error: e,
            })?;
        }

        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.is_empty() {
            return Err(ConfigError::Invalid {
                field: "target".to_string(),
                message: "Target must not be empty".to_string(),
            });
        }

        if !(1..=16).contains(&self.indent_width) {
            return Err(ConfigError::Invalid {
                field: "indent_width".to_string(),
                message: "Indent width must be 1-16".to_string(),
            });
        }

        if !is_identifier(&self.holder_type) {
            return Err(ConfigError::Invalid {
                field: "holder_type".to_string(),
                message: format!("`{}` is not a valid class name", self.holder_type),
            });
        }

        if !is_identifier(&self.self_name) {
            return Err(ConfigError::Invalid {
                field: "self_name".to_string(),
                message: format!("`{}` is not a valid identifier", self.self_name),
            });
        }

        if let Some((from, _)) = self.builtins.iter().find(|(from, to)| from.is_empty() || to.is_empty()) {
            return Err(ConfigError::Invalid {
                field: "builtins".to_string(),
                message: format!("Substitution for `{from}` has an empty side"),
            });
        }

        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(&mut self, other: CompilerConfig) {
        if other.target != DEFAULT_TARGET {
            self.target = other.target;
        }
        if other.indent_width != DEFAULT_INDENT_WIDTH {
            self.indent_width = other.indent_width;
        }
        if other.holder_type != DEFAULT_HOLDER_TYPE {
            self.holder_type = other.holder_type;
        }
        if other.self_name != DEFAULT_SELF_NAME {
            self.self_name = other.self_name;
        }
        if other.emit_runtime {
            self.emit_runtime = other.emit_runtime;
        }

        // Merge substitution tables
        self.builtins.extend(other.builtins);
    }

    /// Backend options for `target` under this configuration
    pub fn codegen_options(&self, target: CompilationTarget) -> CodegenOptions {
        CodegenOptions {
            target,
            indent_width: self.indent_width,
            holder_type: self.holder_type.clone(),
            self_name: self.self_name.clone(),
            builtins: self.builtins.clone(),
            emit_runtime: self.emit_runtime,
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error for {path:?}: {error}")]
    Io { path: PathBuf, error: std::io::Error },

    #[error("Parse error for {path:?}: {error}")]
    Parse { path: PathBuf, error: toml::de::Error },

    #[error("Serialization error: {error}")]
    Serialize { error: toml::ser::Error },

    #[error("Invalid configuration for {field}: {message}")]
    Invalid { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::JavaBackend;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::default();
        assert_eq!(config.target, "java");
        assert_eq!(config.indent_width, 4);
        assert_eq!(config.holder_type, "Functions");
        assert!(!config.emit_runtime);
        assert_eq!(config.builtins.get("int"), Some("Integer"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CompilerConfig::default();
        config.indent_width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "indent_width"
        ));

        config.indent_width = 2;
        assert!(config.validate().is_ok());

        config.holder_type = "2Functions".to_string();
        assert!(config.validate().is_err());

        config.holder_type = "Statics".to_string();
        config.self_name = String::new();
        assert!(config.validate().is_err());

        config.self_name = "me".to_string();
        config.builtins.insert("str", "");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "builtins"
        ));
    }

    #[test]
    fn test_config_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("q-lang.toml");

        let mut config = CompilerConfig::default();
        config.emit_runtime = true;
        config.indent_width = 2;
        config.builtins.insert("str", "String");

        config.to_file(&config_path).unwrap();
        let loaded_config = CompilerConfig::from_file(&config_path).unwrap();

        assert_eq!(loaded_config, config);
    }

    #[test]
    fn test_partial_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("q-lang.toml");
        std::fs::write(&config_path, "holder_type = \"Statics\"\n").unwrap();

        let config = CompilerConfig::from_file(&config_path).unwrap();
        assert_eq!(config.holder_type, "Statics");
        assert_eq!(config.indent_width, 4);
        assert_eq!(config.builtins, Substitutions::java());
    }

    #[test]
    fn test_config_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            CompilerConfig::from_file(&missing),
            Err(ConfigError::Io { .. })
        ));

        let broken = temp_dir.path().join("broken.toml");
        std::fs::write(&broken, "indent_width = \"wide\"\n").unwrap();
        assert!(matches!(
            CompilerConfig::from_file(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_config_merge() {
        let mut base_config = CompilerConfig::default();

        let mut override_config = CompilerConfig::default();
        override_config.emit_runtime = true;
        override_config.indent_width = 2;
        override_config.builtins = Substitutions::new();
        override_config.builtins.insert("str", "String");

        base_config.merge(override_config);

        assert!(base_config.emit_runtime);
        assert_eq!(base_config.indent_width, 2);
        assert_eq!(base_config.holder_type, "Functions");
        assert_eq!(base_config.builtins.get("str"), Some("String"));
        assert_eq!(base_config.builtins.get("int"), Some("Integer"));
    }

    #[test]
    fn test_codegen_options() {
        let mut config = CompilerConfig::default();
        config.holder_type = "Statics".to_string();

        let options = config.codegen_options(JavaBackend::target());
        assert_eq!(options.target.name, "java");
        assert_eq!(options.holder_type, "Statics");
        assert_eq!(options.indent_width, 4);
        assert_eq!(options.builtins, config.builtins);
    }
}
