//! # sqlop
//!
//! Operator-tree SQL compiler with dialect-aware placeholders, plus a
//! result-binding engine.
//!
//! ## Features
//!
//! - **Operator trees**: conditions and assignments are [`Op`] values
//!   compiled through a registry keyed by [`Kind`]; custom operators can be
//!   registered at startup
//! - **Dialects**: placeholder style, identifier quoting and pagination come
//!   from a [`Dialect`] chosen at build time (`mysql`, `postgres`, `sqlite3`
//!   built in)
//! - **Record mapping**: `#[derive(Record)]` describes a struct's fields once;
//!   column plans are computed on first use and cached
//! - **Row binding**: [`bind_rows`] fills `Vec<T>`, `HashMap<K, V>` and record
//!   collections through a chain of binders
//! - **Safe defaults**: DELETE requires WHERE, UPDATE requires SET
//!
//! ## Statement builders
//!
//! ```ignore
//! use sqlop::prelude::*;
//!
//! let (sql, args) = select(["*"])
//!     .from("users")
//!     .filter(Op::eq("id", 123))
//!     .build()?;
//! // MySQL: SELECT * FROM `users` WHERE `id`=?
//!
//! update("users")
//!     .set(Op::add("visits", 1))
//!     .set(Op::inc("version"))
//!     .filter(Op::eq("id", 123))
//!     .execute(&client)
//!     .await?;
//!
//! let mut users: Vec<User> = Vec::new();
//! select_record::<User>()
//!     .from("users")
//!     .filter(Op::in_list("id", [1, 2, 3]))
//!     .bind(&client, &mut users)
//!     .await?;
//! ```

extern crate self as sqlop;

mod log;
mod snapshot;

pub mod args;
pub mod binder;
pub mod builder;
pub mod client;
pub mod column;
pub mod config;
pub mod db;
pub mod dialect;
pub mod error;
pub mod mapper;
pub mod op;
pub mod prelude;
pub mod record;
pub mod rows;
pub mod value;

#[cfg(feature = "postgres")]
mod pg;

#[cfg(test)]
mod test_records;

pub use args::ArgsBuilder;
pub use binder::{
    Binder, ComposedBinder, Destination, RegistryBinder, bind_rows, binder_for, default_binder,
};
pub use builder::{
    Delete, Insert, Order, Select, Statement, Update, delete_from, insert_into, select,
    select_record, update,
};
pub use client::{ExecResult, Executor};
pub use column::Column;
pub use config::DbConfig;
pub use db::Db;
pub use dialect::{Dialect, DialectRegistration};
pub use error::{SqlError, SqlResult, exists, optional};
pub use log::DEFAULT_SQL_LOG_LIMIT;
pub use mapper::{Plan, Purpose, plan_for};
pub use op::{Kind, Op, Payload};
pub use record::{Field, FieldDef, Record, Shape};
pub use rows::{Row, RowSource, Rows};
pub use value::{Arg, Named, Value, named};

#[cfg(feature = "derive")]
pub use sqlop_derive::Record;

// Re-export inventory for dialect registration
pub use inventory;

#[doc(hidden)]
pub mod __private {
    pub use crate::record::{json_assign, json_value, not_a_value};
    pub use serde_json;
}
