use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const API_ENDPOINT: &str = "https://hn.algolia.com/api/v1/search?query=";
pub const STORAGE_KEY: &str = "search";
pub const DEFAULT_TERM: &str = "React";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_endpoint: String,
    pub storage_key: String,
    pub default_term: String,
    pub database_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let mut config = Self {
            api_endpoint: API_ENDPOINT.to_string(),
            storage_key: STORAGE_KEY.to_string(),
            default_term: DEFAULT_TERM.to_string(),
            database_path: Self::get_app_data_dir()?.join("stories.db"),
            request_timeout_secs: 30,
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn get_app_data_dir() -> Result<PathBuf> {
        let home_dir = dirs_next::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home_dir.join(".hacker_stories"))
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("HACKER_STORIES_API_ENDPOINT") {
            self.api_endpoint = v;
        }
        if let Some(v) = var("HACKER_STORIES_DEFAULT_TERM") {
            self.default_term = v;
        }
        if let Some(v) = var("HACKER_STORIES_DB") {
            self.database_path = PathBuf::from(v);
        }
        if let Some(v) = var("HACKER_STORIES_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_secs = parsed;
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base() -> AppConfig {
        AppConfig {
            api_endpoint: API_ENDPOINT.to_string(),
            storage_key: STORAGE_KEY.to_string(),
            default_term: DEFAULT_TERM.to_string(),
            database_path: PathBuf::from("stories.db"),
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let mut config = base();
        config.apply_overrides(|_| None);

        assert_eq!(config.api_endpoint, API_ENDPOINT);
        assert_eq!(config.default_term, "React");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn env_overrides_replace_values() {
        let vars: HashMap<&str, &str> = [
            ("HACKER_STORIES_API_ENDPOINT", "http://localhost:8080/search?query="),
            ("HACKER_STORIES_DEFAULT_TERM", "Rust"),
            ("HACKER_STORIES_DB", "/tmp/hs.db"),
            ("HACKER_STORIES_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();

        let mut config = base();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_endpoint, "http://localhost:8080/search?query=");
        assert_eq!(config.default_term, "Rust");
        assert_eq!(config.database_path, PathBuf::from("/tmp/hs.db"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.storage_key, "search");
    }

    #[test]
    fn unparsable_timeout_is_ignored() {
        let mut config = base();
        config.apply_overrides(|name| {
            (name == "HACKER_STORIES_TIMEOUT_SECS").then(|| "soon".to_string())
        });

        assert_eq!(config.request_timeout_secs, 30);
    }
}
