//! INSERT builder.

use std::sync::Arc;

use super::traits::Statement;
use super::{check_build_error, quote_list, require_table};
use crate::args::ArgsBuilder;
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::mapper::{Purpose, plan_for};
use crate::record::Record;
use crate::value::Value;

/// INSERT builder with one or more VALUES rows.
#[derive(Debug, Clone)]
pub struct Insert {
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    returning: Vec<String>,
    build_error: Option<String>,
}

impl Insert {
    pub fn new(table: &str) -> Self {
        require_table("INSERT", table);
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            returning: Vec::new(),
            build_error: None,
        }
    }

    /// Set the column list.
    ///
    /// # Panics
    /// If rows were already added with a different width.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        if let Some(row) = self.rows.first() {
            check_width(&self.columns, row.len());
        }
        self
    }

    /// Add one VALUES row.
    ///
    /// # Panics
    /// If the row width differs from the column list.
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let row: Vec<Value> = values.into_iter().map(Into::into).collect();
        check_width(&self.columns, row.len());
        self.rows.push(row);
        self
    }

    /// Insert one record through its write plan. Fields tagged `omitempty`
    /// are left out while zero.
    ///
    /// # Panics
    /// If columns were already set and this record maps to different ones.
    pub fn record<T: Record>(mut self, record: &T) -> Self {
        let plan = plan_for::<T>(Purpose::WRITE);
        match plan.values(record, true) {
            Ok(pairs) => {
                let (columns, row): (Vec<String>, Vec<Value>) = pairs.into_iter().unzip();
                self.adopt_columns(columns);
                self.rows.push(row);
            }
            Err(e) => self.build_error = Some(e.to_string()),
        }
        self
    }

    /// Insert several records as a multi-row VALUES list. Every mapped
    /// column is written so the rows line up.
    pub fn records<'a, T, I>(mut self, records: I) -> Self
    where
        T: Record,
        I: IntoIterator<Item = &'a T>,
    {
        let plan = plan_for::<T>(Purpose::WRITE);
        for record in records {
            match plan.values(record, false) {
                Ok(pairs) => {
                    let (columns, row): (Vec<String>, Vec<Value>) = pairs.into_iter().unzip();
                    self.adopt_columns(columns);
                    self.rows.push(row);
                }
                Err(e) => {
                    self.build_error = Some(e.to_string());
                    break;
                }
            }
        }
        self
    }

    /// Add a `RETURNING` list (Postgres, SQLite).
    pub fn returning<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning.extend(columns.into_iter().map(Into::into));
        self
    }

    fn adopt_columns(&mut self, columns: Vec<String>) {
        if self.columns.is_empty() && self.rows.is_empty() {
            self.columns = columns;
            return;
        }
        assert!(
            self.columns == columns,
            "sqlop: INSERT INTO {} mixes column lists {:?} and {:?}",
            self.table,
            self.columns,
            columns
        );
    }
}

fn check_width(columns: &[String], got: usize) {
    assert!(
        columns.len() == got,
        "sqlop: INSERT has {} columns but {} values",
        columns.len(),
        got
    );
}

impl Statement for Insert {
    fn build_with(&self, dialect: Arc<dyn Dialect>) -> SqlResult<(String, Vec<Value>)> {
        check_build_error(&self.build_error)?;
        assert!(
            !self.columns.is_empty() && !self.rows.is_empty(),
            "sqlop: INSERT INTO {} has no values",
            self.table
        );

        let width = self.columns.len();
        let mut args = ArgsBuilder::with_capacity(dialect, width * self.rows.len());
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ",
            args.quote(&self.table),
            quote_list(&args, &self.columns)
        );

        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            let placeholders: Vec<String> = row.iter().map(|v| args.add(v.clone())).collect();
            sql.push('(');
            sql.push_str(&placeholders.join(", "));
            sql.push(')');
        }

        if !self.returning.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&quote_list(&args, &self.returning));
        }

        Ok((sql, args.into_values()))
    }
}
