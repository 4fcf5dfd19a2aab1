//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `TEI_ARTICLE_*` environment variables (nested keys use `__`, e.g.
//! `TEI_ARTICLE_OUTPUT__FORMAT=json`).

mod file_config;

pub use file_config::{ConfigFileError, LogFormat, LoggingConfig, OutputConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "TEI_ARTICLE";
const LOCAL_CONFIG_FILE: &str = "tei-article.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Section assembly vocabulary
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Output settings for the command line tool
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings for the command line tool
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Heading vocabulary used when assembling sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Canonical section names rendered as top-level (`# `) headings.
    /// Compared after lowercasing and removing whitespace.
    #[serde(default = "default_top_level_headings")]
    pub top_level_headings: Vec<String>,

    /// Sections whose heading contains any of these (case-insensitive) are dropped
    #[serde(default = "default_boilerplate_headings")]
    pub boilerplate_headings: Vec<String>,

    /// Heading emitted in front of the abstract
    #[serde(default = "default_abstract_heading")]
    pub abstract_heading: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            top_level_headings: default_top_level_headings(),
            boilerplate_headings: default_boilerplate_headings(),
            abstract_heading: default_abstract_heading(),
        }
    }
}

fn default_top_level_headings() -> Vec<String> {
    [
        "abstract",
        "introduction",
        "materialandmethods",
        "materialsandmethods",
        "methods",
        "results",
        "discussion",
        "conclusion",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_boilerplate_headings() -> Vec<String> {
    [
        "acknowledgement",
        "acknowledgment",
        "conflict of interest",
        "funding",
        "author contribution",
        "competing interests",
        "supplementary material",
        "additional information",
        "supplementary information",
        "data availability",
        "appendix",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_abstract_heading() -> String {
    "Abstract".to_string()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Get the configuration from defaults and environment variables only
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(environment())
        .build()?
        .try_deserialize()
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Look for a config file in the working directory, then in the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    let user = default_config_path()?;
    user.is_file().then_some(user)
}

/// `$XDG_CONFIG_HOME/tei-article/config.toml` (or the platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tei-article").join("config.toml"))
}
