//! Statement builders.
//!
//! Thin SELECT / INSERT / UPDATE / DELETE builders over the expression
//! compiler. Conditions and assignments are [`Op`] trees; identifiers are
//! quoted and placeholders emitted by the dialect chosen at build time.
//!
//! ```ignore
//! use sqlop::{Op, builder::{Statement, select}};
//!
//! let (sql, args) = select(["*"])
//!     .from("users")
//!     .filter(Op::eq("id", 123))
//!     .build_with(std::sync::Arc::new(sqlop::dialect::MySql))?;
//! assert_eq!(sql, "SELECT * FROM `users` WHERE `id`=?");
//! ```
//!
//! Missing tables, mismatched column/value counts, an empty SET list and an
//! unguarded DELETE are programming errors and panic. Everything else is
//! returned as [`SqlError`](crate::SqlError).

mod delete;
mod insert;
mod select;
mod traits;
mod update;

#[cfg(test)]
mod tests;

pub use delete::Delete;
pub use insert::Insert;
pub use select::{Order, Select};
pub use traits::Statement;
pub use update::Update;

use crate::args::ArgsBuilder;
use crate::column::Column;
use crate::error::{SqlError, SqlResult};
use crate::op::{Kind, Op, compile_list};
use crate::record::Record;

/// Start a SELECT with the given columns. An empty list selects `*`.
pub fn select<I, C>(columns: I) -> Select
where
    I: IntoIterator<Item = C>,
    C: Into<Column>,
{
    Select::new(columns)
}

/// Start a SELECT projecting every mapped column of `T`.
pub fn select_record<T: Record>() -> Select {
    Select::new(Vec::<Column>::new()).columns_of::<T>()
}

/// Start an INSERT into `table`.
pub fn insert_into(table: &str) -> Insert {
    Insert::new(table)
}

/// Start an UPDATE of `table`.
pub fn update(table: &str) -> Update {
    Update::new(table)
}

/// Start a DELETE from `table`. Requires a filter or [`Delete::allow_all`].
pub fn delete_from(table: &str) -> Delete {
    Delete::new(table)
}

fn require_table(verb: &str, table: &str) {
    assert!(!table.trim().is_empty(), "sqlop: {verb} requires a table name");
}

fn check_build_error(build_error: &Option<String>) -> SqlResult<()> {
    match build_error {
        Some(err) => Err(SqlError::invalid_argument(err.clone())),
        None => Ok(()),
    }
}

/// Append ` {keyword} {ops joined by AND}` unless the ops render empty.
fn push_conditions(
    sql: &mut String,
    args: &mut ArgsBuilder,
    keyword: &str,
    ops: &[Op],
) -> SqlResult<bool> {
    if ops.is_empty() {
        return Ok(false);
    }
    let rendered = compile_list(args, ops, Kind::AND)?;
    if rendered.is_empty() {
        return Ok(false);
    }
    sql.push(' ');
    sql.push_str(keyword);
    sql.push(' ');
    sql.push_str(&rendered);
    Ok(true)
}

fn quote_list(args: &ArgsBuilder, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| args.quote(c))
        .collect::<Vec<_>>()
        .join(", ")
}
