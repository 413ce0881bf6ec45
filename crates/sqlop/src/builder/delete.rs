//! DELETE builder.

use std::sync::Arc;

use super::traits::Statement;
use super::{push_conditions, require_table};
use crate::args::ArgsBuilder;
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::op::Op;
use crate::value::Value;

/// DELETE builder.
///
/// Rendering without a WHERE clause panics unless [`allow_all`](Self::allow_all)
/// was called.
#[derive(Debug, Clone)]
pub struct Delete {
    table: String,
    filters: Vec<Op>,
    allow_all: bool,
}

impl Delete {
    pub fn new(table: &str) -> Self {
        require_table("DELETE", table);
        Self {
            table: table.to_string(),
            filters: Vec::new(),
            allow_all: false,
        }
    }

    /// AND a condition into WHERE.
    pub fn filter(mut self, op: Op) -> Self {
        self.filters.push(op);
        self
    }

    pub fn filters(mut self, ops: impl IntoIterator<Item = Op>) -> Self {
        self.filters.extend(ops);
        self
    }

    /// Permit deleting every row.
    pub fn allow_all(mut self) -> Self {
        self.allow_all = true;
        self
    }
}

impl Statement for Delete {
    fn build_with(&self, dialect: Arc<dyn Dialect>) -> SqlResult<(String, Vec<Value>)> {
        let mut args = ArgsBuilder::new(dialect);
        let mut sql = format!("DELETE FROM {}", args.quote(&self.table));
        let filtered = push_conditions(&mut sql, &mut args, "WHERE", &self.filters)?;
        assert!(
            filtered || self.allow_all,
            "sqlop: DELETE FROM {} without WHERE; call allow_all() to delete every row",
            self.table
        );
        Ok((sql, args.into_values()))
    }
}
