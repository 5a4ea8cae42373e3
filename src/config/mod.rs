use crate::models::Settings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the settings file inside the configuration directory
pub const SETTINGS_FILE_NAME: &str = "Area Selector.yaml";

/// Prefix of environment variables overriding settings
/// (e.g. `AREA_SELECTOR_MAIN_PATTERN`)
pub const ENV_PREFIX: &str = "AREA_SELECTOR";

/// Loads run defaults from the settings file and the environment.
///
/// Layers, lowest to highest priority:
/// 1. [`Settings::default()`]
/// 2. `Area Selector.yaml` in the configuration directory, if present
/// 3. `AREA_SELECTOR_*` environment variables
///
/// Settings are read only; a run never writes them back.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    env_override: Option<::config::Map<String, String>>,
}

impl ConfigManager {
    /// Create a manager for `config_dir`, creating the directory if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE_NAME),
            config_dir,
            env_override: None,
        })
    }

    /// Read environment overrides from `vars` instead of the process
    /// environment. Keys keep their `AREA_SELECTOR_` prefix.
    pub fn with_environment<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_override = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Load the layered settings.
    ///
    /// A missing settings file is not an error; defaults are used.
    pub fn load_settings(&self) -> Result<Settings> {
        if self.settings_path.exists() {
            tracing::info!("Loading settings from {}", self.settings_path);
        } else {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
        }

        let environment = ::config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(self.env_override.clone());

        let layered = ::config::Config::builder()
            .add_source(
                ::config::File::new(self.settings_path.as_str(), ::config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let settings: Settings = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::debug!("Effective settings: {:?}", settings);
        Ok(settings)
    }

    /// Write a settings file holding the defaults, unless one exists.
    ///
    /// Returns `true` if a file was written.
    pub fn init_settings_file(&self) -> Result<bool> {
        if self.settings_path.exists() {
            tracing::info!("Settings file already exists at {}", self.settings_path);
            return Ok(false);
        }

        fs::write(&self.settings_path, default_settings_yaml()?)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Wrote default settings to {}", self.settings_path);
        Ok(true)
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}

/// The default settings rendered as YAML.
pub fn default_settings_yaml() -> Result<String> {
    serde_yaml_ng::to_string(&Settings::default())
        .context("Failed to serialize default settings to YAML")
}
