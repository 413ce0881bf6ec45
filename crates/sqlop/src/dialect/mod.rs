//! SQL dialects: placeholder syntax, identifier quoting and pagination.
//!
//! Three dialects are built in:
//!
//! | name       | placeholder | quoting    |
//! |------------|-------------|------------|
//! | `mysql`    | `?`         | `` `x` ``  |
//! | `postgres` | `$n`        | `"x"`      |
//! | `sqlite3`  | `?`         | `"x"`      |
//!
//! More can be added at runtime with [`register`], or at startup with
//! `inventory::submit!`:
//!
//! ```ignore
//! inventory::submit! {
//!     sqlop::dialect::DialectRegistration::new(|| std::sync::Arc::new(MyDialect))
//! }
//! ```

mod quote;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::error::{SqlError, SqlResult};
use crate::log::{sql_debug, sql_warn};
use crate::snapshot::Snapshot;

pub(crate) use quote::{quote_ident, quote_whole};

/// Name of the dialect used when nothing else is configured.
pub const DEFAULT_DIALECT: &str = "mysql";

/// Rendering rules for one SQL variant.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Registry key, e.g. `"postgres"`.
    fn name(&self) -> &str;

    /// Token for the `index`-th positional argument (1-based).
    fn placeholder(&self, index: usize) -> String;

    /// Token for a named argument.
    fn named_placeholder(&self, name: &str) -> String {
        format!("@{name}")
    }

    /// Quote an identifier. Must be idempotent.
    fn quote(&self, ident: &str) -> String;

    /// Quote a column alias, which is always a single name even when it
    /// contains dots.
    fn quote_alias(&self, alias: &str) -> String {
        self.quote(alias)
    }

    /// Render the pagination clause.
    ///
    /// Fails with [`SqlError::InvalidArgument`] for a negative limit; the
    /// `OFFSET` part is omitted when `offset` is zero or negative.
    fn limit_offset(&self, limit: i64, offset: i64) -> SqlResult<String> {
        if limit < 0 {
            return Err(SqlError::invalid_argument(format!(
                "limit must be non-negative, got {limit}"
            )));
        }
        if offset > 0 {
            Ok(format!("LIMIT {limit} OFFSET {offset}"))
        } else {
            Ok(format!("LIMIT {limit}"))
        }
    }
}

/// MySQL: `?` placeholders, backtick quoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &str {
        "mysql"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn quote(&self, ident: &str) -> String {
        quote_ident(ident, '`', '`')
    }

    fn quote_alias(&self, alias: &str) -> String {
        quote_whole(alias, '`', '`')
    }
}

/// PostgreSQL: `$n` placeholders, double-quote quoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn named_placeholder(&self, name: &str) -> String {
        format!(":{name}")
    }

    fn quote(&self, ident: &str) -> String {
        quote_ident(ident, '"', '"')
    }

    fn quote_alias(&self, alias: &str) -> String {
        quote_whole(alias, '"', '"')
    }
}

/// SQLite: `?` placeholders, double-quote quoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite3;

impl Dialect for Sqlite3 {
    fn name(&self) -> &str {
        "sqlite3"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn quote(&self, ident: &str) -> String {
        quote_ident(ident, '"', '"')
    }

    fn quote_alias(&self, alias: &str) -> String {
        quote_whole(alias, '"', '"')
    }
}

/// Startup registration of an extra dialect, collected with `inventory`.
pub struct DialectRegistration {
    pub build: fn() -> Arc<dyn Dialect>,
}

impl DialectRegistration {
    pub const fn new(build: fn() -> Arc<dyn Dialect>) -> Self {
        Self { build }
    }
}

inventory::collect!(DialectRegistration);

static REGISTRY: LazyLock<Snapshot<String, Arc<dyn Dialect>>> = LazyLock::new(|| {
    let mut map: HashMap<String, Arc<dyn Dialect>> = HashMap::new();
    for d in [
        Arc::new(MySql) as Arc<dyn Dialect>,
        Arc::new(Postgres),
        Arc::new(Sqlite3),
    ] {
        map.insert(d.name().to_string(), d);
    }
    for reg in inventory::iter::<DialectRegistration> {
        let d = (reg.build)();
        let name = d.name().to_string();
        if map.contains_key(&name) {
            sql_warn!(target: "sqlop.registry", dialect = %name, "duplicate dialect registration ignored");
            continue;
        }
        sql_debug!(target: "sqlop.registry", dialect = %name, "registered dialect from inventory");
        map.insert(name, d);
    }
    Snapshot::new(map)
});

static DEFAULT: LazyLock<RwLock<Arc<dyn Dialect>>> =
    LazyLock::new(|| RwLock::new(Arc::new(MySql)));

/// Register a dialect under its own name.
///
/// A name that is already taken is rejected unless `force` is set, in which
/// case the new dialect replaces the old one.
pub fn register(dialect: Arc<dyn Dialect>, force: bool) -> SqlResult<()> {
    let name = dialect.name().to_string();
    REGISTRY.update(|map| {
        if !force && map.contains_key(&name) {
            return Err(SqlError::Dialect(format!(
                "dialect '{name}' is already registered"
            )));
        }
        sql_debug!(target: "sqlop.registry", dialect = %name, force, "registered dialect");
        map.insert(name.clone(), dialect);
        Ok(())
    })
}

/// Look up a dialect by name.
pub fn get(name: &str) -> Option<Arc<dyn Dialect>> {
    REGISTRY.get(&name.to_string())
}

/// Look up a dialect by name, failing with [`SqlError::Dialect`] when absent.
pub fn lookup(name: &str) -> SqlResult<Arc<dyn Dialect>> {
    get(name).ok_or_else(|| SqlError::Dialect(format!("unknown dialect '{name}'")))
}

/// Names of every registered dialect, sorted.
pub fn names() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY.load().keys().cloned().collect();
    names.sort();
    names
}

/// The process-wide default dialect.
pub fn default_dialect() -> Arc<dyn Dialect> {
    DEFAULT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Make the registered dialect `name` the process-wide default.
pub fn set_default(name: &str) -> SqlResult<()> {
    let dialect = lookup(name)?;
    *DEFAULT.write().unwrap_or_else(PoisonError::into_inner) = dialect;
    sql_debug!(target: "sqlop.registry", dialect = %name, "default dialect changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Oracle;

    impl Dialect for Oracle {
        fn name(&self) -> &str {
            "test-oracle"
        }

        fn placeholder(&self, index: usize) -> String {
            format!(":{index}")
        }

        fn quote(&self, ident: &str) -> String {
            quote_ident(ident, '"', '"')
        }
    }

    #[test]
    fn test_builtin_placeholders() {
        assert_eq!(MySql.placeholder(3), "?");
        assert_eq!(Postgres.placeholder(3), "$3");
        assert_eq!(Sqlite3.placeholder(3), "?");
    }

    #[test]
    fn test_builtin_quoting() {
        assert_eq!(MySql.quote("users.id"), "`users`.`id`");
        assert_eq!(Postgres.quote("users.id"), r#""users"."id""#);
        assert_eq!(Sqlite3.quote("id"), r#""id""#);
    }

    #[test]
    fn test_limit_offset_rules() {
        assert_eq!(MySql.limit_offset(10, 0).unwrap(), "LIMIT 10");
        assert_eq!(MySql.limit_offset(10, 20).unwrap(), "LIMIT 10 OFFSET 20");
        assert_eq!(Postgres.limit_offset(0, -5).unwrap(), "LIMIT 0");
        assert!(matches!(
            MySql.limit_offset(-1, 0),
            Err(SqlError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_builtins_are_registered() {
        for name in ["mysql", "postgres", "sqlite3"] {
            assert_eq!(lookup(name).unwrap().name(), name);
        }
        assert!(lookup("nope").is_err());
    }

    #[test]
    fn test_duplicate_registration_needs_force() {
        register(Arc::new(Oracle), false).unwrap();
        let err = register(Arc::new(Oracle), false).unwrap_err();
        assert!(matches!(err, SqlError::Dialect(_)));
        register(Arc::new(Oracle), true).unwrap();
        assert_eq!(get("test-oracle").unwrap().placeholder(2), ":2");
    }

    #[test]
    fn test_builtin_cannot_be_replaced_silently() {
        assert!(register(Arc::new(MySql), false).is_err());
    }
}
