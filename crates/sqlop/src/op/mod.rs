//! Operator nodes and the expression compiler.
//!
//! An [`Op`] describes one comparison, containment, range, boolean group or
//! assignment. [`compile`] renders it through the compiling function
//! registered for its [`Kind`], writing bound values into an
//! [`ArgsBuilder`](crate::ArgsBuilder).
//!
//! # Example
//! ```ignore
//! use sqlop::{ArgsBuilder, Op, dialect::MySql};
//!
//! let mut args = ArgsBuilder::new(std::sync::Arc::new(MySql));
//! let sql = sqlop::op::compile(&mut args, &Op::and(vec![
//!     Op::eq("id", 1),
//!     Op::in_list("status", ["open", "closed"]),
//! ]))?;
//! assert_eq!(sql, "(`id`=? AND `status` IN (?, ?))");
//! ```

mod compile;


use std::fmt;
use std::sync::Arc;

use crate::value::{Named, Value};

pub use compile::{CompileFn, compile, compile_list, register, registered};

/// Operator identity; the key of the compiler registry.
///
/// Custom operators use their own `Kind` and [`register`] a compiler for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kind(pub &'static str);

impl Kind {
    pub const IS_NULL: Kind = Kind("IS NULL");
    pub const IS_NOT_NULL: Kind = Kind("IS NOT NULL");
    pub const EQ: Kind = Kind("=");
    pub const NE: Kind = Kind("<>");
    pub const LT: Kind = Kind("<");
    pub const LE: Kind = Kind("<=");
    pub const GT: Kind = Kind(">");
    pub const GE: Kind = Kind(">=");
    pub const LIKE: Kind = Kind("LIKE");
    pub const NOT_LIKE: Kind = Kind("NOT LIKE");
    pub const IN: Kind = Kind("IN");
    pub const NOT_IN: Kind = Kind("NOT IN");
    pub const BETWEEN: Kind = Kind("BETWEEN");
    pub const NOT_BETWEEN: Kind = Kind("NOT BETWEEN");
    pub const AND: Kind = Kind("AND");
    pub const OR: Kind = Kind("OR");
    pub const SET: Kind = Kind("SET");
    pub const INC: Kind = Kind("INC");
    pub const DEC: Kind = Kind("DEC");
    pub const ADD: Kind = Kind("ADD");
    pub const SUB: Kind = Kind("SUB");
    pub const MUL: Kind = Kind("MUL");
    pub const DIV: Kind = Kind("DIV");
    pub const BATCH: Kind = Kind("BATCH");
    pub const PAGINATE: Kind = Kind("PAGINATE");

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Operand carried by an [`Op`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Value(Value),
    Named(Named),
    List(Vec<Value>),
    Pair(Value, Value),
    Ops(Vec<Op>),
    /// Another column; renders quoted and binds nothing.
    Column(String),
}

/// Deferred rewrite applied once, right before an op is compiled.
pub type Rewrite = Arc<dyn Fn(Op) -> Op + Send + Sync>;

/// A single operator node.
#[derive(Clone)]
pub struct Op {
    pub kind: Kind,
    pub key: String,
    /// Physical column used in the rendered SQL instead of `key`.
    pub column: Option<String>,
    pub payload: Payload,
    rewrite: Option<Rewrite>,
}

impl fmt::Debug for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Op")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("column", &self.column)
            .field("payload", &self.payload)
            .field("rewrite", &self.rewrite.is_some())
            .finish()
    }
}

impl PartialEq for Op {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.key == other.key
            && self.column == other.column
            && self.payload == other.payload
    }
}

impl Op {
    pub fn new(kind: Kind, key: impl Into<String>, payload: Payload) -> Self {
        Self {
            kind,
            key: key.into(),
            column: None,
            payload,
            rewrite: None,
        }
    }

    /// Render against `column` instead of the logical key.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Attach a rewrite evaluated once at compile time.
    pub fn with_rewrite(mut self, f: impl Fn(Op) -> Op + Send + Sync + 'static) -> Self {
        self.rewrite = Some(Arc::new(f));
        self
    }

    /// The column name the op renders against.
    pub fn target(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.key)
    }

    pub(crate) fn take_rewrite(&mut self) -> Option<Rewrite> {
        self.rewrite.take()
    }

    pub(crate) fn has_rewrite(&self) -> bool {
        self.rewrite.is_some()
    }

    fn cmp(kind: Kind, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(kind, key, Payload::Value(value.into()))
    }

    // ==================== Conditions ====================

    /// Create an IS NULL condition: key IS NULL
    pub fn is_null(key: impl Into<String>) -> Self {
        Self::new(Kind::IS_NULL, key, Payload::None)
    }

    /// Create an IS NOT NULL condition: key IS NOT NULL
    pub fn is_not_null(key: impl Into<String>) -> Self {
        Self::new(Kind::IS_NOT_NULL, key, Payload::None)
    }

    /// Create an equality condition: key=value
    pub fn eq(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Kind::EQ, key, value)
    }

    /// Create an inequality condition: key<>value
    pub fn ne(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Kind::NE, key, value)
    }

    /// Create a less-than condition: key<value
    pub fn lt(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Kind::LT, key, value)
    }

    /// Create a less-than-or-equal condition: key<=value
    pub fn lte(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Kind::LE, key, value)
    }

    /// Create a greater-than condition: key>value
    pub fn gt(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Kind::GT, key, value)
    }

    /// Create a greater-than-or-equal condition: key>=value
    pub fn gte(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Kind::GE, key, value)
    }

    /// Compare against a named argument instead of a positional one.
    pub fn cmp_named(kind: Kind, key: impl Into<String>, arg: Named) -> Self {
        Self::new(kind, key, Payload::Named(arg))
    }

    /// Compare two columns: left <kind> right. Binds nothing.
    pub fn cmp_columns(kind: Kind, left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::new(kind, left, Payload::Column(right.into()))
    }

    /// Create a column equality condition: left=right
    pub fn eq_column(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::cmp_columns(Kind::EQ, left, right)
    }

    /// Create a LIKE condition. A pattern without `%` is wrapped as `%pattern%`.
    pub fn like(key: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::cmp(Kind::LIKE, key, pattern.into())
    }

    /// Create a NOT LIKE condition, wrapping the pattern like [`Op::like`].
    pub fn not_like(key: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::cmp(Kind::NOT_LIKE, key, pattern.into())
    }

    /// Create an IN condition: key IN (values...)
    pub fn in_list<I>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::new(
            Kind::IN,
            key,
            Payload::List(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Create a NOT IN condition: key NOT IN (values...)
    pub fn not_in<I>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::new(
            Kind::NOT_IN,
            key,
            Payload::List(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Create an IN condition over the keys of a map; values are ignored.
    ///
    /// Works for presence sets (`HashMap<K, ()>`, `HashMap<K, bool>`) and any
    /// other `(key, value)` iterator.
    pub fn in_keys<I, K, V>(key: impl Into<String>, map: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
    {
        Self::in_list(key, map.into_iter().map(|(k, _)| k))
    }

    /// Create a BETWEEN condition: key BETWEEN lower AND upper
    pub fn between(
        key: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        Self::new(
            Kind::BETWEEN,
            key,
            Payload::Pair(lower.into(), upper.into()),
        )
    }

    /// Create a NOT BETWEEN condition: key NOT BETWEEN lower AND upper
    pub fn not_between(
        key: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        Self::new(
            Kind::NOT_BETWEEN,
            key,
            Payload::Pair(lower.into(), upper.into()),
        )
    }

    /// Join conditions with AND.
    pub fn and(ops: impl IntoIterator<Item = Op>) -> Self {
        Self::new(Kind::AND, "", Payload::Ops(ops.into_iter().collect()))
    }

    /// Join conditions with OR.
    pub fn or(ops: impl IntoIterator<Item = Op>) -> Self {
        Self::new(Kind::OR, "", Payload::Ops(ops.into_iter().collect()))
    }

    // ==================== Setters ====================

    /// key=value
    pub fn set(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Kind::SET, key, value)
    }

    /// key=key+1
    pub fn inc(key: impl Into<String>) -> Self {
        Self::new(Kind::INC, key, Payload::None)
    }

    /// key=key-1
    pub fn dec(key: impl Into<String>) -> Self {
        Self::new(Kind::DEC, key, Payload::None)
    }

    /// key=key+value
    pub fn add(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Kind::ADD, key, value)
    }

    /// key=key-value
    pub fn sub(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Kind::SUB, key, value)
    }

    /// key=key*value
    pub fn mul(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Kind::MUL, key, value)
    }

    /// key=key/value
    pub fn div(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Kind::DIV, key, value)
    }

    /// Arithmetic setter whose operand is another column, e.g.
    /// `Op::with_operand_column(Kind::ADD, "total", "delta")` renders
    /// `total=total+delta`.
    pub fn with_operand_column(
        kind: Kind,
        key: impl Into<String>,
        other: impl Into<String>,
    ) -> Self {
        Self::new(kind, key, Payload::Column(other.into()))
    }

    /// Several setters rendered as one comma-separated list.
    pub fn batch(ops: impl IntoIterator<Item = Op>) -> Self {
        Self::new(Kind::BATCH, "", Payload::Ops(ops.into_iter().collect()))
    }

    // ==================== Pagination ====================

    /// LIMIT/OFFSET rendered by the dialect.
    pub fn limit_offset(limit: i64, offset: i64) -> Self {
        Self::new(
            Kind::PAGINATE,
            "",
            Payload::Pair(Value::I64(limit), Value::I64(offset)),
        )
    }

    /// LIMIT/OFFSET for a 1-based page number. Pages below 1 are treated as 1.
    pub fn paginate(page: i64, size: i64) -> Self {
        let page = page.max(1);
        Self::limit_offset(size, (page - 1).saturating_mul(size.max(0)))
    }
}

/// A rewrite that caps text payloads to `max` characters.
///
/// ```ignore
/// Op::eq("name", long_name).with_rewrite(sqlop::op::truncate_text(32))
/// ```
pub fn truncate_text(max: usize) -> impl Fn(Op) -> Op + Send + Sync + 'static {
    move |mut op: Op| {
        if let Payload::Value(Value::Text(s)) = &mut op.payload {
            if let Some((idx, _)) = s.char_indices().nth(max) {
                s.truncate(idx);
            }
        }
        op
    }
}
