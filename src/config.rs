use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::LapvizError;
use crate::analysis::AnalysisConfig;

const CONFIG_DIR_NAME: &str = "lapviz";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    /// Indent JSON output
    pub pretty_output: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            pretty_output: true,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, LapvizError> {
        Ok(dirs::config_dir()
            .ok_or(LapvizError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Reads the config from the user's config directory. `Ok(None)` when
    /// there is no config file yet.
    pub fn from_local_file() -> Result<Option<Self>, LapvizError> {
        match dirs::config_dir() {
            Some(dir) => Self::from_path(&dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)),
            None => Ok(None),
        }
    }

    pub fn from_path(config_path: &Path) -> Result<Option<Self>, LapvizError> {
        if !config_path.exists() {
            debug!("No config file at {:?}", config_path);
            return Ok(None);
        }
        let file =
            File::open(config_path).map_err(|e| LapvizError::ConfigIOError { source: e })?;
        let config: AppConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| LapvizError::ConfigSerializeError { source: e })?;
        config.analysis.validate()?;
        Ok(Some(config))
    }

    pub fn save(&self) -> Result<PathBuf, LapvizError> {
        let config_path = Self::default_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), LapvizError> {
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| LapvizError::ConfigIOError { source: e })?;
            }
        }

        let file =
            File::create(config_path).map_err(|e| LapvizError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| LapvizError::ConfigSerializeError { source: e })
    }
}
