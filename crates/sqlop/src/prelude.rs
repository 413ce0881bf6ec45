//! Convenient imports for typical `sqlop` usage.
//!
//! ```ignore
//! use sqlop::prelude::*;
//! ```

pub use crate::{
    Column, Db, DbConfig, Executor, Field, Op, Record, Rows, SqlError, SqlResult, Statement,
    Value, bind_rows, delete_from, insert_into, named, optional, select, select_record, update,
};
