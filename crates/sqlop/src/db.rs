//! An executor paired with a dialect and settings.

use std::future::Future;
use std::sync::Arc;

use crate::binder::{Binder, Destination, binder_for};
use crate::builder::{Delete, Insert, Select, Update};
use crate::client::{ExecResult, Executor};
use crate::column::Column;
use crate::config::DbConfig;
use crate::dialect::{self, Dialect};
use crate::error::SqlResult;
use crate::log::{sql_debug, truncate_sql};
use crate::mapper::Purpose;
use crate::record::Record;
use crate::rows::{Row, Rows};
use crate::value::Value;

/// Database handle.
///
/// Statements run through a `Db` render with its configured dialect, and
/// query results bind with its nested-column separator.
///
/// ```ignore
/// let db = Db::with_config(client, DbConfig::new().with_dialect("postgres"))?;
/// let mut users: Vec<User> = Vec::new();
/// db.select(["*"]).from("users").filter(Op::eq("id", 1)).bind(&db, &mut users).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Db<E> {
    executor: E,
    dialect: Arc<dyn Dialect>,
    config: DbConfig,
}

impl<E: Executor> Db<E> {
    /// Wrap `executor` with the default configuration.
    pub fn new(executor: E) -> SqlResult<Self> {
        Self::with_config(executor, DbConfig::default())
    }

    /// Wrap `executor`, resolving the configured dialect.
    ///
    /// Fails with [`SqlError::Dialect`](crate::SqlError::Dialect) if the
    /// dialect name is not registered.
    pub fn with_config(executor: E, config: DbConfig) -> SqlResult<Self> {
        let dialect = dialect::lookup(&config.dialect)?;
        Ok(Self {
            executor,
            dialect,
            config,
        })
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    // ==================== Builders ====================

    pub fn select<I, C>(&self, columns: I) -> Select
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        Select::new(columns)
    }

    /// SELECT every mapped column of `T`, named with this handle's separator.
    pub fn select_record<T: Record>(&self) -> Select {
        Select::new(Vec::<Column>::new()).columns_for::<T>(self.scan_purpose())
    }

    pub fn insert_into(&self, table: &str) -> Insert {
        Insert::new(table)
    }

    pub fn update(&self, table: &str) -> Update {
        Update::new(table)
    }

    pub fn delete_from(&self, table: &str) -> Delete {
        Delete::new(table)
    }

    // ==================== Raw SQL ====================

    /// Run `sql` and bind every row into `dest`.
    pub fn bind<D: Destination>(
        &self,
        sql: &str,
        args: &[Value],
        dest: &mut D,
    ) -> impl Future<Output = SqlResult<()>> + Send {
        async move {
            let mut rows = self.query(sql, args).await?;
            binder_for(self.scan_purpose()).bind(&mut rows, dest)
        }
    }
}

impl<E: Executor> Executor for Db<E> {
    async fn exec(&self, sql: &str, args: &[Value]) -> SqlResult<ExecResult> {
        self.log(sql, args);
        self.executor.exec(sql, args).await
    }

    async fn query(&self, sql: &str, args: &[Value]) -> SqlResult<Rows> {
        self.log(sql, args);
        self.executor.query(sql, args).await
    }

    async fn query_row(&self, sql: &str, args: &[Value]) -> SqlResult<Row> {
        self.log(sql, args);
        self.executor.query_row(sql, args).await
    }

    fn dialect(&self) -> Arc<dyn Dialect> {
        self.dialect.clone()
    }

    fn scan_purpose(&self) -> Purpose {
        Purpose::SCAN.with_separator(self.config.separator)
    }

    fn sql_log_limit(&self) -> usize {
        self.config.sql_log_limit
    }
}

impl<E> Db<E> {
    #[allow(unused_variables)]
    fn log(&self, sql: &str, args: &[Value]) {
        sql_debug!(
            target: "sqlop.sql",
            dialect = self.dialect.name(),
            args = args.len(),
            sql = truncate_sql(sql, self.config.sql_log_limit),
            "db query"
        );
    }
}
