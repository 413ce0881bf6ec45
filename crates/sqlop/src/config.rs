use crate::dialect::DEFAULT_DIALECT;
use crate::log::DEFAULT_SQL_LOG_LIMIT;

/// Settings for a [`Db`](crate::Db) handle.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Registered dialect name. Defaults to `mysql`.
    pub dialect: String,
    /// Joins a nested record's tag to its children's column names.
    pub separator: &'static str,
    /// Logged SQL is cut to this many bytes.
    pub sql_log_limit: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            dialect: DEFAULT_DIALECT.to_string(),
            separator: "_",
            sql_log_limit: DEFAULT_SQL_LOG_LIMIT,
        }
    }
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a dialect by its registry name.
    pub fn with_dialect(mut self, name: impl Into<String>) -> Self {
        self.dialect = name.into();
        self
    }

    /// Set the nested-column separator used when scanning records.
    pub fn with_separator(mut self, separator: &'static str) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_sql_log_limit(mut self, limit: usize) -> Self {
        self.sql_log_limit = limit;
        self
    }
}
