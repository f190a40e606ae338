//! Configuration structures for the startup analyzer.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the startup messages come from.
    pub input: InputConfig,
    /// Identifier naming conventions.
    pub naming: NamingConfig,
    /// Output locations and toggles.
    pub output: OutputConfig,
}

impl Config {
    /// Load a (possibly partial) JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            Error::config(format!("cannot parse config file {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.naming.hero_prefix.is_empty() {
            return Err(Error::config("naming.hero_prefix must not be empty"));
        }
        if !self.input.messages_pointer.starts_with('/') {
            return Err(Error::config(format!(
                "input.messages_pointer must be a JSON pointer starting with '/', got {:?}",
                self.input.messages_pointer
            )));
        }
        Ok(())
    }

    /// Resolved path of the startup JSON document.
    pub fn startup_path(&self) -> PathBuf {
        let file = Path::new(&self.input.startup_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.output.data_dir.join(file)
        }
    }
}

/// Input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Startup JSON file, relative to the data directory unless absolute.
    pub startup_file: String,
    /// JSON pointer to the message array inside the startup document.
    pub messages_pointer: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            startup_file: "raw/startup.json".to_string(),
            messages_pointer: "/rootContext/messages".to_string(),
        }
    }
}

/// Identifier naming conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Namespace prefix stripped from hero definition ids for display.
    pub hero_prefix: String,
    /// Prefix of building definition ids, stripped when humanizing names.
    pub building_prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            hero_prefix: "hero.".to_string(),
            building_prefix: "building.Building_".to_string(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the working directory tree.
    pub data_dir: PathBuf,
    /// Empty the output subfolders before a run.
    pub clean_on_start: bool,
    /// Write the parsed raw/master bundles.
    pub write_parsed: bool,
    /// Write `analysis/player_analysis.json`.
    pub write_analysis: bool,
    /// Write the CSV exports.
    pub write_csv: bool,
    /// Write the HTML dashboard.
    pub write_dashboard: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("hoh_local_data"),
            clean_on_start: true,
            write_parsed: true,
            write_analysis: true,
            write_csv: true,
            write_dashboard: true,
        }
    }
}
