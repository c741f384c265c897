//! Settings structures for client configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure matching clarifai.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub search: SearchSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (CLARIFAI_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Apply CLARIFAI_* overrides from `lookup`; an unparsable timeout is ignored
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CLARIFAI_PAT") {
            self.api.pat = Some(val);
        }
        if let Some(val) = lookup("CLARIFAI_USER_ID") {
            self.api.user_id = Some(val);
        }
        if let Some(val) = lookup("CLARIFAI_API_BASE") {
            self.api.base_url = val;
        }
        if let Some(val) = lookup("CLARIFAI_REQUEST_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                self.api.request_timeout = timeout;
            }
        }
    }
}

/// API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the API, without the `/v2` prefix
    pub base_url: String,
    /// Account that owns the apps being searched
    pub user_id: Option<String>,
    /// Personal access token
    pub pat: Option<String>,
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Appended to the SDK user agent
    pub useragent_suffix: Option<String>,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: crate::DEFAULT_BASE_URL.to_string(),
            user_id: None,
            pat: None,
            request_timeout: 30.0,
            useragent_suffix: None,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Defaults applied to every search built from these settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Maximum hits per query when pagination is off
    pub top_k: Option<usize>,
    /// Distance metric: "euclidean" or "cosine"
    pub metric: String,
    /// Search algorithm: "nearest_neighbor" or "brute_force"
    pub algorithm: String,
    /// Hits requested per page
    pub page_size: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            top_k: None,
            metric: "euclidean".to_string(),
            algorithm: "nearest_neighbor".to_string(),
            page_size: crate::DEFAULT_PAGE_SIZE,
        }
    }
}
