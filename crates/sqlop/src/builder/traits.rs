//! Shared behaviour of statement builders.

use std::future::Future;
use std::sync::Arc;

use crate::binder::{Binder, Destination, binder_for};
use crate::client::{ExecResult, Executor};
use crate::dialect::{self, Dialect};
use crate::error::SqlResult;
use crate::log::{sql_debug, truncate_sql};
use crate::rows::{Row, Rows};
use crate::value::Value;

/// A statement that renders to SQL text plus ordered arguments.
pub trait Statement: Sync {
    /// Render against `dialect`.
    fn build_with(&self, dialect: Arc<dyn Dialect>) -> SqlResult<(String, Vec<Value>)>;

    /// Render against the process-wide default dialect.
    fn build(&self) -> SqlResult<(String, Vec<Value>)> {
        self.build_with(dialect::default_dialect())
    }

    /// Debug helper: the SQL text under the default dialect, or an empty
    /// string if rendering fails.
    fn to_sql(&self) -> String {
        self.build().map(|(sql, _)| sql).unwrap_or_default()
    }

    /// Execute and return affected row count.
    fn execute(
        &self,
        conn: &impl Executor,
    ) -> impl Future<Output = SqlResult<ExecResult>> + Send {
        async move {
            let (sql, args) = prepare(self, conn)?;
            conn.exec(&sql, &args).await
        }
    }

    /// Execute and buffer all rows.
    fn query(&self, conn: &impl Executor) -> impl Future<Output = SqlResult<Rows>> + Send {
        async move {
            let (sql, args) = prepare(self, conn)?;
            conn.query(&sql, &args).await
        }
    }

    /// Execute and return the first row, or [`SqlError::NotFound`](crate::SqlError::NotFound).
    fn query_row(&self, conn: &impl Executor) -> impl Future<Output = SqlResult<Row>> + Send {
        async move {
            let (sql, args) = prepare(self, conn)?;
            conn.query_row(&sql, &args).await
        }
    }

    /// Execute and bind every row into `dest`.
    fn bind<D: Destination>(
        &self,
        conn: &impl Executor,
        dest: &mut D,
    ) -> impl Future<Output = SqlResult<()>> + Send {
        async move {
            let mut rows = self.query(conn).await?;
            binder_for(conn.scan_purpose()).bind(&mut rows, dest)
        }
    }
}

fn prepare<S, E>(stmt: &S, conn: &E) -> SqlResult<(String, Vec<Value>)>
where
    S: Statement + ?Sized,
    E: Executor,
{
    let dialect = conn.dialect();
    let (sql, args) = stmt.build_with(dialect.clone())?;
    sql_debug!(
        target: "sqlop.sql",
        dialect = dialect.name(),
        args = args.len(),
        sql = truncate_sql(&sql, conn.sql_log_limit()),
        "executing statement"
    );
    Ok((sql, args))
}
