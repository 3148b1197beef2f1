use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "servicefinder";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Web API key of the Firebase project
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub storage_bucket: String,
    /// Endpoint roots; override to point at the emulator suite
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default = "default_listings_collection")]
    pub listings_collection: String,
    #[serde(default = "default_users_collection")]
    pub users_collection: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default)]
    pub vim_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub identity: String,
    pub token: String,
    pub firestore: String,
    pub storage: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            identity: "https://identitytoolkit.googleapis.com/v1".to_string(),
            token: "https://securetoken.googleapis.com/v1".to_string(),
            firestore: "https://firestore.googleapis.com/v1".to_string(),
            storage: "https://firebasestorage.googleapis.com/v0".to_string(),
        }
    }
}

impl Endpoints {
    /// Every root pointing at the same server (emulators, test servers)
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            identity: format!("{}/v1", base),
            token: format!("{}/v1", base),
            firestore: format!("{}/v1", base),
            storage: format!("{}/v0", base),
        }
    }
}

fn default_listings_collection() -> String {
    "services".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_page_size() -> usize {
    9
}

fn default_search_debounce_ms() -> u64 {
    300
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text).context("Invalid config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&text)
    }

    /// Settings for `--demo`, which never talks to a remote backend
    pub fn demo() -> Self {
        Self {
            api_key: String::new(),
            project_id: "demo".to_string(),
            storage_bucket: "demo.appspot.com".to_string(),
            endpoints: Endpoints::default(),
            listings_collection: default_listings_collection(),
            users_collection: default_users_collection(),
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            vim_mode: false,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("Config is missing api_key");
        }
        if self.project_id.trim().is_empty() {
            anyhow::bail!("Config is missing project_id");
        }
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        Ok(())
    }

    /// Bucket name, defaulting to the project's standard bucket
    pub fn bucket(&self) -> String {
        if self.storage_bucket.is_empty() {
            format!("{}.appspot.com", self.project_id)
        } else {
            self.storage_bucket.clone()
        }
    }
}

/// Find the config file: `--config`, then the platform config dir, then `./config.yaml`
pub fn resolve_config_path(cli_path: Option<PathBuf>) -> Result<PathBuf> {
    resolve_from(cli_path, dirs::config_dir(), Path::new("config.yaml"))
}

fn resolve_from(
    cli_path: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    local: &Path,
) -> Result<PathBuf> {
    if let Some(path) = cli_path {
        if path.exists() {
            return Ok(path);
        }
        anyhow::bail!("Config file not found at specified path: {}", path.display());
    }

    let preferred = config_dir.map(|dir| dir.join(APP_DIR).join("config.yaml"));
    if let Some(path) = &preferred {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    if local.exists() {
        return Ok(local.to_path_buf());
    }

    let expected = preferred
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| format!("~/.config/{}/config.yaml", APP_DIR));

    anyhow::bail!(
        "Config file not found. Expected locations:\n\
         1. {} (preferred)\n\
         2. ./config.yaml (fallback)\n\
         \n\
         Use --config <path> to specify a custom location, or --demo to run offline.",
        expected
    )
}
