//! SELECT builder.

use std::future::Future;
use std::sync::Arc;

use super::traits::Statement;
use super::{check_build_error, push_conditions, require_table};
use crate::args::ArgsBuilder;
use crate::client::Executor;
use crate::column::Column;
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::mapper::{Purpose, plan_for};
use crate::op::{Op, compile};
use crate::record::Record;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    fn as_sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// SELECT query builder.
#[derive(Debug, Clone, Default)]
pub struct Select {
    columns: Vec<Column>,
    table: Option<String>,
    filters: Vec<Op>,
    group_by: Vec<String>,
    having: Vec<Op>,
    order_by: Vec<(String, Order)>,
    limit: Option<i64>,
    offset: Option<i64>,
    build_error: Option<String>,
}

impl Select {
    pub fn new<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    pub fn column(mut self, column: impl Into<Column>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Append every mapped column of `T`, in plan order.
    pub fn columns_of<T: Record>(self) -> Self {
        self.columns_for::<T>(Purpose::SCAN)
    }

    /// Append every mapped column of `T` as named by `purpose`.
    ///
    /// A dotted nested column such as `audit.created_by` is read from the
    /// `audit` table alias and labelled with its full name, so the result
    /// binds back with the same separator.
    pub fn columns_for<T: Record>(mut self, purpose: Purpose) -> Self {
        let plan = plan_for::<T>(purpose);
        self.columns.extend(plan.fields().iter().map(|f| {
            let column = Column::new(f.column.as_str());
            if f.column.contains('.') {
                column.alias(f.column.as_str())
            } else {
                column
            }
        }));
        self
    }

    // ==================== WHERE ====================

    /// AND a condition into WHERE.
    pub fn filter(mut self, op: Op) -> Self {
        self.filters.push(op);
        self
    }

    pub fn filters(mut self, ops: impl IntoIterator<Item = Op>) -> Self {
        self.filters.extend(ops);
        self
    }

    // ==================== GROUP / ORDER ====================

    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by.push(column.to_string());
        self
    }

    /// AND a condition into HAVING.
    pub fn having(mut self, op: Op) -> Self {
        self.having.push(op);
        self
    }

    pub fn order_by(self, column: &str) -> Self {
        self.order(column, Order::Asc)
    }

    pub fn order_by_desc(self, column: &str) -> Self {
        self.order(column, Order::Desc)
    }

    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.order_by.push((column.to_string(), order));
        self
    }

    // ==================== Pagination ====================

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// 1-based page of `size` rows. Pages below 1 are treated as 1.
    pub fn paginate(mut self, page: i64, size: i64) -> Self {
        if size < 0 {
            self.build_error = Some(format!("page size must be non-negative, got {size}"));
            return self;
        }
        let page = page.max(1);
        self.limit = Some(size);
        self.offset = Some((page - 1).saturating_mul(size));
        self
    }

    // ==================== Build helpers ====================

    fn table(&self) -> &str {
        let table = self.table.as_deref().unwrap_or_default();
        require_table("SELECT", table);
        table
    }

    fn render_columns(&self, args: &ArgsBuilder) -> String {
        if self.columns.is_empty() {
            return "*".to_string();
        }
        self.columns
            .iter()
            .map(|c| c.render(&**args.dialect()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// FROM ... WHERE ... GROUP BY ... HAVING ...
    fn render_body(&self, sql: &mut String, args: &mut ArgsBuilder) -> SqlResult<()> {
        sql.push_str(" FROM ");
        sql.push_str(&args.quote(self.table()));
        push_conditions(sql, args, "WHERE", &self.filters)?;
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&super::quote_list(args, &self.group_by));
        }
        push_conditions(sql, args, "HAVING", &self.having)?;
        Ok(())
    }

    fn render_tail(&self, sql: &mut String, args: &mut ArgsBuilder) -> SqlResult<()> {
        if !self.order_by.is_empty() {
            let order = self
                .order_by
                .iter()
                .map(|(c, o)| format!("{} {}", args.quote(c), o.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }
        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                let page = compile(args, &Op::limit_offset(limit, offset.unwrap_or(0)))?;
                sql.push(' ');
                sql.push_str(&page);
            }
            (None, Some(offset)) if offset > 0 => {
                return Err(SqlError::invalid_argument("OFFSET requires a LIMIT"));
            }
            _ => {}
        }
        Ok(())
    }

    /// Render the `COUNT(*)` form: no ordering or pagination, and grouped
    /// queries are counted through a subquery.
    pub fn build_count_with(&self, dialect: Arc<dyn Dialect>) -> SqlResult<(String, Vec<Value>)> {
        check_build_error(&self.build_error)?;
        let mut args = ArgsBuilder::new(dialect);
        let sql = if self.group_by.is_empty() && self.having.is_empty() {
            let mut sql = String::from("SELECT COUNT(*)");
            self.render_body(&mut sql, &mut args)?;
            sql
        } else {
            let mut inner = String::from("SELECT 1");
            self.render_body(&mut inner, &mut args)?;
            format!("SELECT COUNT(*) FROM ({inner}) AS t")
        };
        Ok((sql, args.into_values()))
    }

    /// Run the `COUNT(*)` form.
    pub fn count(&self, conn: &impl Executor) -> impl Future<Output = SqlResult<i64>> + Send {
        async move {
            let (sql, args) = self.build_count_with(conn.dialect())?;
            let row = conn.query_row(&sql, &args).await?;
            let mut n = 0i64;
            row.scan(&mut [&mut n])?;
            Ok(n)
        }
    }
}

impl Statement for Select {
    fn build_with(&self, dialect: Arc<dyn Dialect>) -> SqlResult<(String, Vec<Value>)> {
        check_build_error(&self.build_error)?;
        let mut args = ArgsBuilder::new(dialect);
        let mut sql = String::with_capacity(64);
        sql.push_str("SELECT ");
        sql.push_str(&self.render_columns(&args));
        self.render_body(&mut sql, &mut args)?;
        self.render_tail(&mut sql, &mut args)?;
        Ok((sql, args.into_values()))
    }
}
