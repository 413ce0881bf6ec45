//! Executor boundary.
//!
//! Statement builders hand `(sql, args)` to an [`Executor`]. Anything that can
//! run SQL implements it: a tokio-postgres client or transaction, a pooled
//! connection, or a test double.
//!
//! Cancellation is by dropping the returned future; timeouts and retries
//! belong to the executor.

use std::future::Future;
use std::sync::Arc;

use crate::dialect::{self, Dialect};
use crate::error::{SqlError, SqlResult};
use crate::log::DEFAULT_SQL_LOG_LIMIT;
use crate::mapper::Purpose;
use crate::rows::{Row, Rows};
use crate::value::Value;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
}

/// Runs rendered statements.
pub trait Executor: Send + Sync {
    /// Execute a statement and report affected rows.
    fn exec(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = SqlResult<ExecResult>> + Send;

    /// Execute a query and buffer all rows.
    fn query(&self, sql: &str, args: &[Value]) -> impl Future<Output = SqlResult<Rows>> + Send;

    /// Execute a query and return the **first** row.
    ///
    /// Returns [`SqlError::NotFound`] when the query yields no rows; extra
    /// rows are ignored.
    fn query_row(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = SqlResult<Row>> + Send {
        async move {
            let rows = self.query(sql, args).await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| SqlError::not_found("Expected one row, got none"))
        }
    }

    /// Dialect statement builders render with when run on this executor.
    fn dialect(&self) -> Arc<dyn Dialect> {
        dialect::default_dialect()
    }

    /// Mapper purpose used when binding query results.
    fn scan_purpose(&self) -> Purpose {
        Purpose::SCAN
    }

    /// Cap on logged SQL length.
    fn sql_log_limit(&self) -> usize {
        DEFAULT_SQL_LOG_LIMIT
    }
}

impl<E: Executor> Executor for &E {
    fn exec(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = SqlResult<ExecResult>> + Send {
        (**self).exec(sql, args)
    }

    fn query(&self, sql: &str, args: &[Value]) -> impl Future<Output = SqlResult<Rows>> + Send {
        (**self).query(sql, args)
    }

    fn query_row(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = SqlResult<Row>> + Send {
        (**self).query_row(sql, args)
    }

    fn dialect(&self) -> Arc<dyn Dialect> {
        (**self).dialect()
    }

    fn scan_purpose(&self) -> Purpose {
        (**self).scan_purpose()
    }

    fn sql_log_limit(&self) -> usize {
        (**self).sql_log_limit()
    }
}

#[cfg(feature = "postgres")]
mod postgres {
    use std::sync::Arc;

    use super::{ExecResult, Executor};
    use crate::dialect::{Dialect, Postgres};
    use crate::error::SqlResult;
    use crate::pg::{decode_rows, params};
    use crate::rows::Rows;
    use crate::value::Value;

    impl Executor for tokio_postgres::Client {
        async fn exec(&self, sql: &str, args: &[Value]) -> SqlResult<ExecResult> {
            let rows_affected = tokio_postgres::Client::execute(self, sql, &params(args)).await?;
            Ok(ExecResult { rows_affected })
        }

        async fn query(&self, sql: &str, args: &[Value]) -> SqlResult<Rows> {
            let stmt = tokio_postgres::Client::prepare(self, sql).await?;
            let rows = tokio_postgres::Client::query(self, &stmt, &params(args)).await?;
            decode_rows(stmt.columns(), rows)
        }

        fn dialect(&self) -> Arc<dyn Dialect> {
            Arc::new(Postgres)
        }
    }

    impl Executor for tokio_postgres::Transaction<'_> {
        async fn exec(&self, sql: &str, args: &[Value]) -> SqlResult<ExecResult> {
            let rows_affected =
                tokio_postgres::Transaction::execute(self, sql, &params(args)).await?;
            Ok(ExecResult { rows_affected })
        }

        async fn query(&self, sql: &str, args: &[Value]) -> SqlResult<Rows> {
            let stmt = tokio_postgres::Transaction::prepare(self, sql).await?;
            let rows = tokio_postgres::Transaction::query(self, &stmt, &params(args)).await?;
            decode_rows(stmt.columns(), rows)
        }

        fn dialect(&self) -> Arc<dyn Dialect> {
            Arc::new(Postgres)
        }
    }
}

#[cfg(feature = "pool")]
mod pool {
    use std::sync::Arc;

    use super::{ExecResult, Executor};
    use crate::dialect::{Dialect, Postgres};
    use crate::error::SqlResult;
    use crate::rows::Rows;
    use crate::value::Value;

    impl Executor for deadpool_postgres::Object {
        async fn exec(&self, sql: &str, args: &[Value]) -> SqlResult<ExecResult> {
            let client: &tokio_postgres::Client = self;
            Executor::exec(client, sql, args).await
        }

        async fn query(&self, sql: &str, args: &[Value]) -> SqlResult<Rows> {
            let client: &tokio_postgres::Client = self;
            Executor::query(client, sql, args).await
        }

        fn dialect(&self) -> Arc<dyn Dialect> {
            Arc::new(Postgres)
        }
    }
}
