//! Application configuration.

use std::path::Path;

use chrono::Duration;
use serde::Deserialize;

use crate::error::{AdminError, Result};

/// Settings shared by the pages, the services and the CLI.
///
/// Every field has a default, so a JSON config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// SQLite connection string.
    pub database_url: String,
    /// Lifetime of cached profile reads, in seconds.
    pub cache_ttl_secs: u64,
    /// Rows per table page.
    pub page_size: usize,
    /// Name of the navigation flag cookie.
    pub flag_cookie_name: String,
    /// `Max-Age` of the navigation flag cookie, in seconds.
    pub flag_cookie_max_age: u64,
    /// Title shown in the sidebar and the browser tab.
    pub site_title: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:fleet.sqlite3".to_string(),
            cache_ttl_secs: 300,
            page_size: fleet_table::DEFAULT_PAGE_SIZE,
            flag_cookie_name: "fleet_nav".to_string(),
            flag_cookie_max_age: 60 * 60 * 24 * 365,
            site_title: "Fleet Compliance".to_string(),
        }
    }
}

impl AdminConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AdminError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    /// Sets the cache TTL in seconds.
    #[must_use]
    pub fn cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Sets the table page size.
    #[must_use]
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Sets the flag cookie name.
    #[must_use]
    pub fn flag_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.flag_cookie_name = name.into();
        self
    }

    /// Sets the flag cookie lifetime in seconds.
    #[must_use]
    pub fn flag_cookie_max_age(mut self, secs: u64) -> Self {
        self.flag_cookie_max_age = secs;
        self
    }

    /// Sets the site title.
    #[must_use]
    pub fn site_title(mut self, title: impl Into<String>) -> Self {
        self.site_title = title.into();
        self
    }

    /// Returns the cache TTL as a duration.
    pub fn cache_ttl(&self) -> Duration {
        let secs = i64::try_from(self.cache_ttl_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs.min(i64::MAX / 1000))
    }

    /// Checks the values a file or the environment may have broken.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(AdminError::Config("page_size must be at least 1".to_string()));
        }
        if self.flag_cookie_name.is_empty()
            || self
                .flag_cookie_name
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, ';' | ',' | '='))
        {
            return Err(AdminError::Config(format!(
                "invalid flag cookie name: {:?}",
                self.flag_cookie_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AdminConfig =
            serde_json::from_str(r#"{"page_size": 25, "site_title": "Depot North"}"#).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.site_title, "Depot North");
        assert_eq!(config.flag_cookie_name, "fleet_nav");
        assert_eq!(config.cache_ttl(), Duration::seconds(300));
    }

    #[test]
    fn test_builder() {
        let config = AdminConfig::new()
            .database_url("sqlite::memory:")
            .cache_ttl_secs(5)
            .page_size(3);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.cache_ttl(), Duration::seconds(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(AdminConfig::new().page_size(0).validate().is_err());
        assert!(AdminConfig::new().flag_cookie_name("nav flags").validate().is_err());
        assert!(AdminConfig::new().flag_cookie_name("").validate().is_err());
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = AdminConfig::from_json_file("/nonexistent/fleet.json").unwrap_err();
        assert!(matches!(err, AdminError::Config(_)));
    }
}
