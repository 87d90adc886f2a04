use crate::domain::TagPattern;
use crate::error::{CiBumpError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "cibump.toml";

/// Represents the complete configuration for ci-bump.
///
/// Every field is optional in the file; missing fields fall back to the
/// behavior of a plain pipeline run (push to `origin`, append to `build.env`).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Remote that receives tags and the version commit
    #[serde(default = "default_remote")]
    pub remote: String,

    /// File the CI build number is appended to
    #[serde(default = "default_build_env_file")]
    pub build_env_file: PathBuf,

    /// Commit message template, `{version}` is replaced
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// Tag annotation template, `{version}` is replaced
    #[serde(default = "default_tag_message")]
    pub tag_message: String,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_build_env_file() -> PathBuf {
    PathBuf::from("build.env")
}

fn default_commit_message() -> String {
    "ci: Version updated to {version} [skip ci]".to_string()
}

fn default_tag_message() -> String {
    "Version {version}".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote: default_remote(),
            build_env_file: default_build_env_file(),
            commit_message: default_commit_message(),
            tag_message: default_tag_message(),
        }
    }
}

impl Config {
    /// Commit message pattern
    pub fn commit_pattern(&self) -> TagPattern {
        TagPattern::new(self.commit_message.clone())
    }

    /// Tag annotation pattern
    pub fn tag_pattern(&self) -> TagPattern {
        TagPattern::new(self.tag_message.clone())
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.remote.trim().is_empty() {
            return Err(CiBumpError::config("remote must not be empty"));
        }
        if self.build_env_file.as_os_str().is_empty() {
            return Err(CiBumpError::config("build_env_file must not be empty"));
        }
        self.commit_pattern().validate()?;
        self.tag_pattern().validate()?;
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `cibump.toml` in current directory
/// 3. `~/.config/.cibump.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        PathBuf::from(CONFIG_FILE_NAME)
    } else {
        match dirs::config_dir().map(|dir| dir.join(format!(".{}", CONFIG_FILE_NAME))) {
            Some(path) if path.exists() => path,
            _ => return Ok(Config::default()),
        }
    };

    let config_str = fs::read_to_string(&path)
        .map_err(|e| CiBumpError::config(format!("Cannot read {}: {}", path.display(), e)))?;
    let config: Config = toml::from_str(&config_str)
        .map_err(|e| CiBumpError::config(format!("Cannot parse {}: {}", path.display(), e)))?;

    config.validate()?;
    Ok(config)
}
