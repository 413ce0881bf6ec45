//! Internal logging macros.
//!
//! With the `tracing` feature these forward to `tracing`; without it they
//! expand to nothing so callers do not need their own `cfg` guards.

macro_rules! sql_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::debug!($($arg)*);
        }
    }};
}

macro_rules! sql_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::trace!($($arg)*);
        }
    }};
}

macro_rules! sql_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::warn!($($arg)*);
        }
    }};
}

pub(crate) use sql_debug;
pub(crate) use sql_trace;
pub(crate) use sql_warn;

/// Default cap on logged SQL length, in bytes.
pub const DEFAULT_SQL_LOG_LIMIT: usize = 1024;

/// Truncate `sql` to at most `max` bytes on a char boundary.
pub(crate) fn truncate_sql(sql: &str, max: usize) -> &str {
    if sql.len() <= max {
        return sql;
    }
    let mut end = max;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::truncate_sql;

    #[test]
    fn test_truncate_respects_char_boundary() {
        assert_eq!(truncate_sql("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql("SELECT 1", 6), "SELECT");
        assert_eq!(truncate_sql("é", 1), "");
    }
}
