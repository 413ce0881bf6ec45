use std::any::TypeId;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use uuid::Uuid;

use super::{Binder, BinderFactory, Destination, ElementScanner, RecordScanner, capacity_hint};
use crate::error::{SqlError, SqlResult};
use crate::mapper::{Purpose, plan_for};
use crate::record::{Field, Record};
use crate::rows::RowSource;
use crate::value::Value;

pub(super) fn defaults() -> HashMap<TypeId, BinderFactory> {
    let mut map: HashMap<TypeId, BinderFactory> = HashMap::new();

    // scalar and key/value binders ignore the purpose
    fn fixed(binder: impl Binder + 'static) -> BinderFactory {
        let binder: Arc<dyn Binder> = Arc::new(binder);
        Arc::new(move |_| binder.clone())
    }

    fn scalar<T: Field + Default + 'static>(map: &mut HashMap<TypeId, BinderFactory>) {
        map.insert(TypeId::of::<Vec<T>>(), fixed(ScalarSliceBinder::<T>::new()));
    }

    fn kv<K, V>(map: &mut HashMap<TypeId, BinderFactory>)
    where
        K: Field + Default + Eq + Hash + 'static,
        V: Field + Default + 'static,
    {
        map.insert(TypeId::of::<HashMap<K, V>>(), fixed(KvMapBinder::<K, V>::new()));
    }

    scalar::<i32>(&mut map);
    scalar::<i64>(&mut map);
    scalar::<u64>(&mut map);
    scalar::<f64>(&mut map);
    scalar::<bool>(&mut map);
    scalar::<String>(&mut map);
    scalar::<Uuid>(&mut map);
    scalar::<Value>(&mut map);

    kv::<String, String>(&mut map);
    kv::<String, i64>(&mut map);
    kv::<i64, String>(&mut map);
    kv::<String, Value>(&mut map);

    map
}

fn downcast<'a, D: 'static>(dest: &'a mut dyn Destination) -> SqlResult<&'a mut D> {
    let name = dest.dest_type_name();
    dest.as_any_mut()
        .downcast_mut::<D>()
        .ok_or_else(|| SqlError::unsupported_binder(name))
}

/// `Vec<T>` of scalars, one column per row.
pub struct ScalarSliceBinder<T>(PhantomData<fn() -> T>);

impl<T> ScalarSliceBinder<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ScalarSliceBinder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Binder for ScalarSliceBinder<T>
where
    T: Field + Default + 'static,
{
    fn bind(&self, rows: &mut dyn RowSource, dest: &mut dyn Destination) -> SqlResult<()> {
        let out = downcast::<Vec<T>>(dest)?;
        out.reserve(capacity_hint(rows));
        while rows.next_row() {
            let mut item = T::default();
            rows.scan(&mut [&mut item])?;
            out.push(item);
        }
        Ok(())
    }
}

/// `Vec<T>` of records, filled by column name.
pub struct RecordSliceBinder<T> {
    purpose: Purpose,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RecordSliceBinder<T> {
    pub fn new() -> Self {
        Self::with_purpose(Purpose::SCAN)
    }

    pub fn with_purpose(purpose: Purpose) -> Self {
        Self {
            purpose,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for RecordSliceBinder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Binder for RecordSliceBinder<T>
where
    T: Record + Field + Default,
{
    fn bind(&self, rows: &mut dyn RowSource, dest: &mut dyn Destination) -> SqlResult<()> {
        let out = downcast::<Vec<T>>(dest)?;
        let mut scanner = RecordScanner::new(plan_for::<T>(self.purpose), rows.columns());
        out.reserve(capacity_hint(rows));
        while rows.next_row() {
            let mut item = T::default();
            scanner.scan(rows, &mut item)?;
            out.push(item);
        }
        Ok(())
    }
}

/// `HashMap<K, V>` where the row holds only the key; the value is derived
/// from it. With `|_| true` this fills a presence set.
pub struct KeyMapBinder<K, V> {
    derive: fn(&K) -> V,
}

impl<K, V> KeyMapBinder<K, V> {
    pub fn new(derive: fn(&K) -> V) -> Self {
        Self { derive }
    }
}

impl<K, V> Binder for KeyMapBinder<K, V>
where
    K: Field + Default + Eq + Hash + 'static,
    V: Field + Default + 'static,
{
    fn bind(&self, rows: &mut dyn RowSource, dest: &mut dyn Destination) -> SqlResult<()> {
        let out = downcast::<HashMap<K, V>>(dest)?;
        out.reserve(capacity_hint(rows));
        while rows.next_row() {
            let mut key = K::default();
            rows.scan(&mut [&mut key])?;
            let value = (self.derive)(&key);
            out.insert(key, value);
        }
        Ok(())
    }
}

/// `HashMap<K, V>` where the row holds only the value (a scalar or a
/// record); the key is derived from it.
pub struct ValueMapBinder<K, V> {
    key_of: fn(&V) -> K,
    purpose: Purpose,
}

impl<K, V> ValueMapBinder<K, V> {
    pub fn new(key_of: fn(&V) -> K) -> Self {
        Self {
            key_of,
            purpose: Purpose::SCAN,
        }
    }

    /// Map record values with `purpose` instead of the default scan plan.
    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = purpose;
        self
    }
}

impl<K, V> Binder for ValueMapBinder<K, V>
where
    K: Field + Default + Eq + Hash + 'static,
    V: Field + Default + 'static,
{
    fn bind(&self, rows: &mut dyn RowSource, dest: &mut dyn Destination) -> SqlResult<()> {
        let out = downcast::<HashMap<K, V>>(dest)?;
        let mut scanner = ElementScanner::new(self.purpose);
        out.reserve(capacity_hint(rows));
        while rows.next_row() {
            let mut value = V::default();
            scanner.scan(rows, &mut value)?;
            out.insert((self.key_of)(&value), value);
        }
        Ok(())
    }
}

/// `HashMap<K, V>` from rows of exactly two columns: key, value.
pub struct KvMapBinder<K, V>(PhantomData<fn() -> (K, V)>);

impl<K, V> KvMapBinder<K, V> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K, V> Default for KvMapBinder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Binder for KvMapBinder<K, V>
where
    K: Field + Default + Eq + Hash + 'static,
    V: Field + Default + 'static,
{
    fn bind(&self, rows: &mut dyn RowSource, dest: &mut dyn Destination) -> SqlResult<()> {
        let out = downcast::<HashMap<K, V>>(dest)?;
        check_two_columns(rows)?;
        out.reserve(capacity_hint(rows));
        while rows.next_row() {
            let mut key = K::default();
            let mut value = V::default();
            rows.scan(&mut [&mut key, &mut value])?;
            out.insert(key, value);
        }
        Ok(())
    }
}

// An empty result from a source that could not report its columns binds
// nothing rather than failing.
fn check_two_columns(rows: &dyn RowSource) -> SqlResult<()> {
    let got = rows.columns().len();
    if got != 2 && !(got == 0 && rows.size_hint() == Some(0)) {
        return Err(SqlError::ColumnCount { expected: 2, got });
    }
    Ok(())
}

/// Fallback for any `Vec<T>` destination.
#[derive(Debug, Clone, Copy)]
pub struct SequenceBinder {
    purpose: Purpose,
}

impl SequenceBinder {
    pub fn new(purpose: Purpose) -> Self {
        Self { purpose }
    }
}

impl Default for SequenceBinder {
    fn default() -> Self {
        Self::new(Purpose::SCAN)
    }
}

impl Binder for SequenceBinder {
    fn bind(&self, rows: &mut dyn RowSource, dest: &mut dyn Destination) -> SqlResult<()> {
        let name = dest.dest_type_name();
        let seq = dest
            .as_sequence()
            .ok_or_else(|| SqlError::unsupported_binder(name))?;
        let mut scanner = ElementScanner::new(self.purpose);
        seq.reserve_rows(capacity_hint(rows));
        while rows.next_row() {
            let elem = seq.push_default();
            if let Err(e) = scanner.scan(rows, elem) {
                seq.pop_last();
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Fallback for any `HashMap<K, V>` destination: two columns per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingBinder;

impl Binder for MappingBinder {
    fn bind(&self, rows: &mut dyn RowSource, dest: &mut dyn Destination) -> SqlResult<()> {
        let name = dest.dest_type_name();
        let map = dest
            .as_mapping()
            .ok_or_else(|| SqlError::unsupported_binder(name))?;
        check_two_columns(rows)?;
        map.reserve_rows(capacity_hint(rows));
        while rows.next_row() {
            map.insert_row(rows)?;
        }
        Ok(())
    }
}
