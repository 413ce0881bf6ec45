//! UPDATE builder.

use std::sync::Arc;

use super::traits::Statement;
use super::{check_build_error, push_conditions, require_table};
use crate::args::ArgsBuilder;
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::mapper::{Purpose, plan_for};
use crate::op::{Kind, Op, compile_list};
use crate::record::Record;
use crate::value::Value;

/// UPDATE builder. Assignments are setter ops (`Op::set`, `Op::inc`,
/// `Op::add`, ...).
#[derive(Debug, Clone)]
pub struct Update {
    table: String,
    setters: Vec<Op>,
    filters: Vec<Op>,
    build_error: Option<String>,
}

impl Update {
    pub fn new(table: &str) -> Self {
        require_table("UPDATE", table);
        Self {
            table: table.to_string(),
            setters: Vec::new(),
            filters: Vec::new(),
            build_error: None,
        }
    }

    /// Add an assignment.
    pub fn set(mut self, op: Op) -> Self {
        self.setters.push(op);
        self
    }

    pub fn set_all(mut self, ops: impl IntoIterator<Item = Op>) -> Self {
        self.setters.extend(ops);
        self
    }

    /// Assign every mapped column of `record`, leaving out zero `omitempty`
    /// fields.
    pub fn set_record<T: Record>(mut self, record: &T) -> Self {
        match plan_for::<T>(Purpose::WRITE).values(record, true) {
            Ok(pairs) => self
                .setters
                .extend(pairs.into_iter().map(|(column, value)| Op::set(column, value))),
            Err(e) => self.build_error = Some(e.to_string()),
        }
        self
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
}

impl Statement for Update {
    fn build_with(&self, dialect: Arc<dyn Dialect>) -> SqlResult<(String, Vec<Value>)> {
        check_build_error(&self.build_error)?;
        let mut args = ArgsBuilder::new(dialect);
        let set = compile_list(&mut args, &self.setters, Kind::BATCH)?;
        assert!(!set.is_empty(), "sqlop: UPDATE {} has an empty SET list", self.table);

        let mut sql = format!("UPDATE {} SET {}", args.quote(&self.table), set);
        push_conditions(&mut sql, &mut args, "WHERE", &self.filters)?;
        Ok((sql, args.into_values()))
    }
}
