//! Argument accumulator.
//!
//! An [`ArgsBuilder`] collects bound values in emission order and hands back
//! the placeholder token for each one. It lives for one statement build.

use std::sync::{Arc, Mutex, PoisonError};

use crate::dialect::Dialect;
use crate::value::{Arg, Named, Value};

/// Upper bound on idle buffers kept by the pool.
const POOL_LIMIT: usize = 64;

static POOL: Mutex<Vec<Vec<Value>>> = Mutex::new(Vec::new());

/// Collects arguments for a single statement.
///
/// The n-th positional placeholder returned by [`add`](Self::add) always
/// corresponds to the n-th positional value. Named arguments render a
/// name-derived token and do not advance the positional counter.
#[derive(Debug)]
pub struct ArgsBuilder {
    dialect: Arc<dyn Dialect>,
    values: Vec<Value>,
    positional: usize,
    pooled: bool,
}

impl ArgsBuilder {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self::with_capacity(dialect, 0)
    }

    pub fn with_capacity(dialect: Arc<dyn Dialect>, capacity: usize) -> Self {
        Self {
            dialect,
            values: Vec::with_capacity(capacity),
            positional: 0,
            pooled: false,
        }
    }

    /// Take a builder backed by a pooled buffer.
    pub fn acquire(dialect: Arc<dyn Dialect>) -> Self {
        let values = POOL
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default();
        Self {
            dialect,
            values,
            positional: 0,
            pooled: true,
        }
    }

    /// Return the buffer to the pool. No-op for builders not made by
    /// [`acquire`](Self::acquire).
    pub fn release(mut self) {
        if !self.pooled {
            return;
        }
        self.reset();
        let mut pool = POOL.lock().unwrap_or_else(PoisonError::into_inner);
        if pool.len() < POOL_LIMIT {
            pool.push(std::mem::take(&mut self.values));
        }
    }

    /// Clear collected values, keeping capacity.
    pub fn reset(&mut self) {
        self.values.clear();
        self.positional = 0;
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// Quote an identifier with this builder's dialect.
    pub fn quote(&self, ident: &str) -> String {
        self.dialect.quote(ident)
    }

    /// Append a positional value and return its placeholder.
    pub fn add(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        self.positional += 1;
        self.dialect.placeholder(self.positional)
    }

    /// Append a named value and return its name-derived token.
    pub fn add_named(&mut self, arg: Named) -> String {
        self.values.push(arg.value);
        self.dialect.named_placeholder(&arg.name)
    }

    pub fn add_arg(&mut self, arg: Arg) -> String {
        match arg {
            Arg::Positional(v) => self.add(v),
            Arg::Named(n) => self.add_named(n),
        }
    }

    /// Values in emission order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(mut self) -> Vec<Value> {
        std::mem::take(&mut self.values)
    }

    /// Number of positional placeholders handed out so far.
    pub fn positional_count(&self) -> usize {
        self.positional
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres};
    use crate::value::named;

    #[test]
    fn test_numbered_placeholders_follow_position() {
        let mut args = ArgsBuilder::new(Arc::new(Postgres));
        assert_eq!(args.add(1), "$1");
        assert_eq!(args.add("x"), "$2");
        assert_eq!(args.values(), &[Value::I64(1), Value::Text("x".into())]);
    }

    #[test]
    fn test_named_args_skip_positional_counter() {
        let mut args = ArgsBuilder::new(Arc::new(Postgres));
        assert_eq!(args.add(1), "$1");
        assert_eq!(args.add_named(named("id", 7)), ":id");
        assert_eq!(args.add(2), "$2");
        assert_eq!(args.positional_count(), 2);
        assert_eq!(args.len(), 3);
        assert_eq!(args.values()[1], Value::I64(7));
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut args = ArgsBuilder::with_capacity(Arc::new(MySql), 16);
        args.add(1);
        args.reset();
        assert!(args.is_empty());
        assert_eq!(args.positional_count(), 0);
        assert_eq!(args.add(2), "?");
    }

    #[test]
    fn test_pooled_builder_comes_back_empty() {
        let mut args = ArgsBuilder::acquire(Arc::new(MySql));
        args.add(1);
        args.add(2);
        args.release();

        let args = ArgsBuilder::acquire(Arc::new(MySql));
        assert!(args.is_empty());
        assert_eq!(args.positional_count(), 0);
        args.release();
    }

    #[test]
    fn test_release_of_unpooled_builder_is_noop() {
        let mut args = ArgsBuilder::new(Arc::new(MySql));
        args.add(1);
        args.release();
    }
}
