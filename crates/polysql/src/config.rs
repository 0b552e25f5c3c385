use serde::{Deserialize, Serialize};

/// Default prefix for generated savepoint names.
pub const DEFAULT_SAVEPOINT_PREFIX: &str = "polysql_sp";

/// Configuration for an [`Adapter`](crate::Adapter).
///
/// By default, SQL logging is disabled and must be explicitly enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Prefix of generated savepoint names (`{prefix}_{n}`).
    pub savepoint_prefix: String,
    /// Whether executed statements are logged (`tracing` feature).
    pub log_sql: bool,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_logged_sql_length: Option<usize>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            savepoint_prefix: DEFAULT_SAVEPOINT_PREFIX.to_string(),
            log_sql: false,
            max_logged_sql_length: Some(200),
        }
    }
}

impl AdapterConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the savepoint name prefix.
    ///
    /// Characters other than ASCII letters and digits become `_`.
    pub fn with_savepoint_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.savepoint_prefix = prefix.into();
        self
    }

    /// Enable logging of executed statements.
    pub fn enable_sql_logging(mut self) -> Self {
        self.log_sql = true;
        self
    }

    /// Disable logging of executed statements.
    pub fn disable_sql_logging(mut self) -> Self {
        self.log_sql = false;
        self
    }

    /// Set maximum SQL length to log.
    pub fn with_max_logged_sql_length(mut self, len: usize) -> Self {
        self.max_logged_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_sql_length = None;
        self
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_logged_sql_length {
            Some(max) if sql.len() > max => {
                let mut end = max;
                while end > 0 && !sql.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &sql[..end]).into()
            }
            _ => sql.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdapterConfig::new();
        assert_eq!(config.savepoint_prefix, "polysql_sp");
        assert!(!config.log_sql);
        assert_eq!(config.max_logged_sql_length, Some(200));
    }

    #[test]
    fn test_builder_chain() {
        let config = AdapterConfig::new()
            .with_savepoint_prefix("app")
            .enable_sql_logging()
            .with_max_logged_sql_length(8);
        assert_eq!(config.savepoint_prefix, "app");
        assert!(config.log_sql);
        assert_eq!(config.truncate_sql("SELECT * FROM users"), "SELECT *...");
        assert_eq!(config.clone().no_truncate().truncate_sql("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let config = AdapterConfig::new().with_max_logged_sql_length(2);
        assert_eq!(config.truncate_sql("é1"), "é...");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: AdapterConfig = serde_json::from_str(r#"{"log_sql": true}"#).unwrap();
        assert!(config.log_sql);
        assert_eq!(config.savepoint_prefix, DEFAULT_SAVEPOINT_PREFIX);
    }
}
