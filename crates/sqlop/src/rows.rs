//! Row sources.
//!
//! A [`RowSource`] is what binders read from: column names, a cursor and a
//! scan step. [`Rows`] is the in-memory implementation every executor returns.

use std::sync::Arc;

use crate::error::{SqlError, SqlResult};
use crate::record::{Field, Record};
use crate::value::Value;

/// Cursor over result rows.
pub trait RowSource {
    fn columns(&self) -> &[String];

    /// Advance to the next row. Returns `false` when exhausted.
    fn next_row(&mut self) -> bool;

    /// Copy the current row into `dest`, one field per column.
    fn scan(&mut self, dest: &mut [&mut dyn Field]) -> SqlResult<()>;

    /// Expected number of rows, if known.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

/// Buffered result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    columns: Arc<[String]>,
    rows: Vec<Vec<Value>>,
    // index of the next row to yield
    cursor: usize,
}

impl Rows {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.into(),
            rows,
            cursor: 0,
        }
    }

    /// Build from string-ish column names.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns.into_iter().map(Into::into).collect(), Vec::new())
    }

    /// Append a row. Panics if its width differs from the column count.
    pub fn push(&mut self, row: Vec<Value>) {
        assert_eq!(
            row.len(),
            self.columns.len(),
            "sqlop: row width does not match column count"
        );
        self.rows.push(row);
    }

    /// Builder-style [`Rows::push`].
    pub fn row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rewind the cursor to before the first row.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// The first row, if any.
    pub fn first(&self) -> Option<Row> {
        self.rows.first().map(|values| Row {
            columns: self.columns.clone(),
            values: values.clone(),
        })
    }

    fn current(&self) -> SqlResult<&[Value]> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .map(Vec::as_slice)
            .ok_or_else(|| SqlError::Other("scan called without a current row".to_string()))
    }
}

impl RowSource for Rows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> bool {
        if self.cursor < self.rows.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn scan(&mut self, dest: &mut [&mut dyn Field]) -> SqlResult<()> {
        let row = self.current()?;
        scan_values(row, dest)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.rows.len() - self.cursor.min(self.rows.len()))
    }
}

impl IntoIterator for Rows {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|values| Row {
                columns: columns.clone(),
                values,
            })
            .collect::<Vec<_>>()
            .into_iter()
    }
}

fn scan_values(row: &[Value], dest: &mut [&mut dyn Field]) -> SqlResult<()> {
    if row.len() != dest.len() {
        return Err(SqlError::ColumnCount {
            expected: dest.len(),
            got: row.len(),
        });
    }
    for (field, value) in dest.iter_mut().zip(row) {
        field.assign(value.clone())?;
    }
    Ok(())
}

/// A single result row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self {
            columns: columns.into(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get_by_name(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Convert the named column into `T`.
    pub fn try_get<T: Field + Default>(&self, column: &str) -> SqlResult<T> {
        let value = self
            .get_by_name(column)
            .ok_or_else(|| SqlError::Mapping(format!("column '{column}' not in row")))?;
        let mut out = T::default();
        out.assign(value.clone())?;
        Ok(out)
    }

    /// Scan the whole row into `dest`.
    pub fn scan(&self, dest: &mut [&mut dyn Field]) -> SqlResult<()> {
        scan_values(&self.values, dest)
    }

    /// Fill a record from this row by column name; unknown columns are ignored.
    pub fn to_record<T: Record + Default>(&self) -> SqlResult<T> {
        let mut out = T::default();
        let mut rows = Rows::new(self.columns.to_vec(), vec![self.values.clone()]);
        rows.next_row();
        crate::binder::scan_record(&mut rows, &mut out)?;
        Ok(out)
    }

    /// Wrap as a one-row [`Rows`].
    pub fn into_rows(self) -> Rows {
        Rows {
            columns: self.columns,
            rows: vec![self.values],
            cursor: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Rows {
        Rows::with_columns(["id", "name"])
            .row([Value::I64(1), Value::Text("a".into())])
            .row([Value::I64(2), Value::Text("b".into())])
    }

    #[test]
    fn test_cursor_and_scan() {
        let mut rows = sample();
        assert_eq!(rows.size_hint(), Some(2));
        assert!(rows.next_row());
        let (mut id, mut name) = (0i64, String::new());
        rows.scan(&mut [&mut id, &mut name]).unwrap();
        assert_eq!((id, name.as_str()), (1, "a"));
        assert_eq!(rows.size_hint(), Some(1));
        assert!(rows.next_row());
        assert!(!rows.next_row());
    }

    #[test]
    fn test_scan_before_next_fails() {
        let mut rows = sample();
        let mut id = 0i64;
        let mut name = String::new();
        assert!(rows.scan(&mut [&mut id, &mut name]).is_err());
    }

    #[test]
    fn test_scan_checks_width() {
        let mut rows = sample();
        rows.next_row();
        let mut id = 0i64;
        let err = rows.scan(&mut [&mut id]).unwrap_err();
        assert!(matches!(err, SqlError::ColumnCount { expected: 1, got: 2 }));
    }

    #[test]
    fn test_row_accessors() {
        let row = sample().first().unwrap();
        assert_eq!(row.get_by_name("name"), Some(&Value::Text("a".into())));
        assert_eq!(row.try_get::<i32>("id").unwrap(), 1);
        assert!(row.try_get::<i32>("missing").is_err());
    }

    #[test]
    fn test_into_iter_yields_rows() {
        let ids: Vec<i64> = sample()
            .into_iter()
            .map(|r| r.try_get("id").unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
