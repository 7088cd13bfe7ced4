//! Runtime configuration resolved from environment variables.
//!
//! Each setting is looked up under its `STODO_*` name first and then under the
//! conventional names used by the hosted services, so an existing `.env` for
//! a Supabase/Gemini front-end works unchanged.

use crate::error::{Result, TodoError};

pub const DEFAULT_TABLE: &str = "todos";
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Persistence API settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`
    pub url: String,
    pub api_key: String,
    pub table: String,
    pub schema: String,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            table: DEFAULT_TABLE.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
        }
    }

    /// Resolve from env. Both the URL and the key are required.
    pub fn resolve() -> Result<Self> {
        let url = resolve_field(&["STODO_SUPABASE_URL", "SUPABASE_URL"]);
        let api_key = resolve_field(&["STODO_SUPABASE_KEY", "SUPABASE_ANON_KEY"]);

        let (url, api_key) = match (url, api_key) {
            (Some(url), Some(api_key)) => (url, api_key),
            _ => {
                return Err(TodoError::NotConfigured(
                    "Task store not configured. Set STODO_SUPABASE_URL and STODO_SUPABASE_KEY (or SUPABASE_URL and SUPABASE_ANON_KEY).".to_string(),
                ))
            },
        };

        let mut config = Self::new(url, api_key);
        if let Some(table) = resolve_field(&["STODO_TABLE"]) {
            config.table = table;
        }
        Ok(config)
    }

    /// REST endpoint of the table, e.g. `https://abc.supabase.co/rest/v1/todos`
    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), self.table)
    }

    /// `public.todos`; the name the backend uses in "relation missing" messages
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

/// Generative model settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Empty when no key is configured; every analysis then falls back
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn resolve() -> Self {
        let defaults = Self::default();
        Self {
            api_key: resolve_field(&["STODO_GEMINI_API_KEY", "GEMINI_API_KEY", "API_KEY"])
                .unwrap_or_default(),
            model: resolve_field(&["STODO_GEMINI_MODEL"]).unwrap_or(defaults.model),
            endpoint: resolve_field(&["STODO_GEMINI_ENDPOINT"]).unwrap_or(defaults.endpoint),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// `POST` target for a one-shot `generateContent` call
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// Everything the binary needs
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub analyzer: AnalyzerConfig,
}

impl AppConfig {
    pub fn resolve() -> Result<Self> {
        Ok(Self {
            store: StoreConfig::resolve()?,
            analyzer: AnalyzerConfig::resolve(),
        })
    }
}

/// First non-empty value among `env_vars`
fn resolve_field(env_vars: &[&str]) -> Option<String> {
    env_vars
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|val| val.trim().to_string())
        .find(|val| !val.is_empty())
}
