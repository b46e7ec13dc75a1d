//! Configuration and credential handling for SmartSpend.
//!
//! Settings are read from `$SMARTSPEND_HOME/config.json`, which is optional, as is every key in
//! it. The Gemini API key is read from `$SMARTSPEND_HOME/.secrets/secrets.json` and, failing that,
//! from the `GEMINI_API_KEY` environment variable (or `--api-key`).

use crate::model::DEFAULT_CURRENCY_SYMBOL;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const APP_NAME: &str = "smartspend";
const SECRETS: &str = ".secrets";
const SECRETS_JSON: &str = "secrets.json";
const CONFIG_JSON: &str = "config.json";
const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_PREVIEW_ROWS: usize = 5;

/// The environment variable that holds the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$SMARTSPEND_HOME`, from which it loads the optional `config.json` and the secret
/// store.
#[derive(Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    secrets_path: PathBuf,
    config_file: ConfigFile,
    api_key: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("root", &self.root)
            .field("config_file", &self.config_file)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// This will
    /// - load `config.json` if it exists, otherwise use defaults
    /// - look for the API key in the secret store, then in `env_api_key`
    ///
    /// The home directory does not have to exist. A missing API key is not an error here, see
    /// `Config::api_key`.
    pub async fn load(home: impl Into<PathBuf>, env_api_key: Option<String>) -> Result<Self> {
        let root = home.into();
        let config_path = root.join(CONFIG_JSON);
        let secrets_path = root.join(SECRETS).join(SECRETS_JSON);

        let config_file = if config_path.is_file() {
            ConfigFile::load(&config_path).await?
        } else {
            debug!("No config file at {}, using defaults", config_path.display());
            ConfigFile::default()
        };

        let stored_key = if secrets_path.is_file() {
            SecretsFile::load(&secrets_path).await?.gemini_api_key
        } else {
            None
        };

        let api_key = non_blank(stored_key).or_else(|| non_blank(env_api_key));

        Ok(Self {
            root,
            config_path,
            secrets_path,
            config_file,
            api_key,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets_path(&self) -> &Path {
        &self.secrets_path
    }

    /// The Gemini API key.
    ///
    /// # Errors
    /// - Returns an error explaining where to put the key if none was found.
    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) => Ok(key),
            None => bail!(
                "API key for Gemini not found. Please set {API_KEY_ENV} in your environment or add \
                it to {}",
                self.secrets_path.display()
            ),
        }
    }

    pub fn model(&self) -> &str {
        &self.config_file.model
    }

    pub fn base_url(&self) -> &str {
        &self.config_file.base_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.timeout_secs)
    }

    pub fn currency_symbol(&self) -> &str {
        &self.config_file.currency_symbol
    }

    pub fn preview_rows(&self) -> usize {
        self.config_file.preview_rows
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Represents the serialization and deserialization format of the configuration file. Every key
/// is optional.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "smartspend",
///   "model": "gemini-1.5-pro-latest",
///   "base_url": "https://generativelanguage.googleapis.com/v1beta",
///   "timeout_secs": 120,
///   "currency_symbol": "₹",
///   "preview_rows": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
struct ConfigFile {
    /// Application name, should always be "smartspend"
    app_name: String,

    /// The Gemini model that answers questions.
    model: String,

    /// The root of the Gemini REST API.
    base_url: String,

    /// How long to wait for an answer before giving up.
    timeout_secs: u64,

    /// Prefixed to every amount in the digest.
    currency_symbol: String,

    /// How many rows `smartspend stats` previews.
    preview_rows: usize,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl ConfigFile {
    async fn load(path: &Path) -> Result<Self> {
        let config_file: ConfigFile = utils::deserialize(path).await?;
        if config_file.app_name != APP_NAME {
            bail!(
                "The app_name in {} should be '{APP_NAME}' but is '{}'",
                path.display(),
                config_file.app_name
            )
        }
        Ok(config_file)
    }
}

/// The secret store, `$SMARTSPEND_HOME/.secrets/secrets.json`:
/// ```json
/// { "GEMINI_API_KEY": "..." }
/// ```
#[derive(Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "GEMINI_API_KEY", default)]
    gemini_api_key: Option<String>,
}

impl SecretsFile {
    async fn load(path: &Path) -> Result<Self> {
        utils::deserialize(path)
            .await
            .context("The secrets file could not be read")
    }
}
