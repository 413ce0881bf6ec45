//! Column descriptors for SELECT lists.

use std::fmt;

use crate::dialect::Dialect;

/// A possibly table-qualified column with an optional alias.
///
/// ```ignore
/// let c = Column::of("u", "id").alias("user_id");
/// // MySQL: `u`.`id` AS `user_id`
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    table: Option<String>,
    name: String,
    alias: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
            alias: None,
        }
    }

    /// Column qualified by a table name or alias.
    pub fn of(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// The name rows will carry for this column.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Render with the dialect's quoting.
    pub fn render(&self, dialect: &dyn Dialect) -> String {
        let mut out = match &self.table {
            Some(table) => format!("{}.{}", dialect.quote(table), dialect.quote(&self.name)),
            None => dialect.quote(&self.name),
        };
        if let Some(alias) = &self.alias {
            out.push_str(" AS ");
            out.push_str(&dialect.quote_alias(alias));
        }
        out
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(table) = &self.table {
            write!(f, "{table}.")?;
        }
        f.write_str(&self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::new(name)
    }
}

impl From<&String> for Column {
    fn from(name: &String) -> Self {
        Column::new(name.as_str())
    }
}
