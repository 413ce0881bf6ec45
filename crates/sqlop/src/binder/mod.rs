//! Binding rows into destination containers.
//!
//! [`bind_rows`] tries, in order:
//!
//! 1. a binder registered for the exact destination type ([`register`]),
//! 2. the generic sequence binder for any `Vec<T>` (records are filled by
//!    column name through the mapper, scalars scan one column),
//! 3. the two-column key/value binder for any `HashMap<K, V>`.
//!
//! Binders report "this destination is not mine" with
//! [`SqlError::UnsupportedBinder`]; [`ComposedBinder`] moves on only for that
//! error and returns every other error as is.

mod builtin;


use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::sync::{Arc, LazyLock};

use crate::error::{SqlError, SqlResult};
use crate::log::sql_debug;
use crate::mapper::{Plan, Purpose, plan_of};
use crate::record::{Field, Record, field_at_mut};
use crate::rows::RowSource;
use crate::snapshot::Snapshot;
use crate::value::Value;

pub use builtin::{
    KeyMapBinder, KvMapBinder, MappingBinder, RecordSliceBinder, ScalarSliceBinder,
    SequenceBinder, ValueMapBinder,
};

/// Initial capacity used when the row source has no size hint.
pub const DEFAULT_CAPACITY: usize = 16;

/// Copies rows from a source into a destination.
pub trait Binder: Send + Sync {
    /// Must return [`SqlError::UnsupportedBinder`] without reading any row
    /// when `dest` is not a shape this binder handles.
    fn bind(&self, rows: &mut dyn RowSource, dest: &mut dyn Destination) -> SqlResult<()>;
}

/// Something rows can be bound into.
pub trait Destination: Any + Send {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn dest_type_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    fn dest_type_name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn as_sequence(&mut self) -> Option<&mut dyn Sequence> {
        None
    }

    fn as_mapping(&mut self) -> Option<&mut dyn Mapping> {
        None
    }
}

/// A growable ordered container.
pub trait Sequence {
    fn reserve_rows(&mut self, additional: usize);

    /// Append a default element and return it for filling.
    fn push_default(&mut self) -> &mut dyn Field;

    /// Drop the last element (used when filling it failed).
    fn pop_last(&mut self);
}

/// A keyed container filled from two-column rows.
pub trait Mapping {
    fn reserve_rows(&mut self, additional: usize);

    /// Scan the current row as `(key, value)` and insert it.
    fn insert_row(&mut self, rows: &mut dyn RowSource) -> SqlResult<()>;
}

impl<T> Destination for Vec<T>
where
    T: Field + Default + 'static,
{
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_sequence(&mut self) -> Option<&mut dyn Sequence> {
        Some(self)
    }
}

impl<T> Sequence for Vec<T>
where
    T: Field + Default + 'static,
{
    fn reserve_rows(&mut self, additional: usize) {
        self.reserve(additional);
    }

    fn push_default(&mut self) -> &mut dyn Field {
        self.push(T::default());
        let last = self.len() - 1;
        &mut self[last]
    }

    fn pop_last(&mut self) {
        self.pop();
    }
}

impl<K, V, S> Destination for HashMap<K, V, S>
where
    K: Field + Default + Eq + Hash + 'static,
    V: Field + Default + 'static,
    S: BuildHasher + Send + 'static,
{
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_mapping(&mut self) -> Option<&mut dyn Mapping> {
        Some(self)
    }
}

impl<K, V, S> Mapping for HashMap<K, V, S>
where
    K: Field + Default + Eq + Hash + 'static,
    V: Field + Default + 'static,
    S: BuildHasher + Send + 'static,
{
    fn reserve_rows(&mut self, additional: usize) {
        self.reserve(additional);
    }

    fn insert_row(&mut self, rows: &mut dyn RowSource) -> SqlResult<()> {
        let mut key = K::default();
        let mut value = V::default();
        rows.scan(&mut [&mut key, &mut value])?;
        self.insert(key, value);
        Ok(())
    }
}

/// Capacity to reserve before binding.
pub fn capacity_hint(rows: &dyn RowSource) -> usize {
    rows.size_hint().unwrap_or(DEFAULT_CAPACITY)
}

/// Tries binders in order until one accepts the destination.
#[derive(Clone, Default)]
pub struct ComposedBinder {
    binders: Vec<Arc<dyn Binder>>,
}

impl ComposedBinder {
    pub fn new(binders: Vec<Arc<dyn Binder>>) -> Self {
        Self { binders }
    }

    /// Append a binder to the end of the chain.
    pub fn with(mut self, binder: impl Binder + 'static) -> Self {
        self.binders.push(Arc::new(binder));
        self
    }

    /// Insert a binder ahead of the existing chain.
    pub fn prepend(mut self, binder: impl Binder + 'static) -> Self {
        self.binders.insert(0, Arc::new(binder));
        self
    }

    pub fn len(&self) -> usize {
        self.binders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binders.is_empty()
    }
}

impl Binder for ComposedBinder {
    fn bind(&self, rows: &mut dyn RowSource, dest: &mut dyn Destination) -> SqlResult<()> {
        for binder in &self.binders {
            match binder.bind(rows, dest) {
                Err(e) if e.is_unsupported_binder() => continue,
                other => return other,
            }
        }
        Err(SqlError::unsupported_binder(dest.dest_type_name()))
    }
}

/// Builds the binder for one bind, given the purpose its records map with.
pub type BinderFactory = Arc<dyn Fn(Purpose) -> Arc<dyn Binder> + Send + Sync>;

static BINDERS: LazyLock<Snapshot<TypeId, BinderFactory>> =
    LazyLock::new(|| Snapshot::new(builtin::defaults()));

/// Register `binder` for destinations of type `D`, replacing any previous one.
///
/// The same binder serves every purpose; use [`register_with`] when it maps
/// records and should follow the caller's separator.
pub fn register<D: Destination>(binder: impl Binder + 'static) {
    let binder: Arc<dyn Binder> = Arc::new(binder);
    register_with::<D>(move |_| binder.clone());
}

/// Register a purpose-aware binder factory for destinations of type `D`.
pub fn register_with<D: Destination>(
    factory: impl Fn(Purpose) -> Arc<dyn Binder> + Send + Sync + 'static,
) {
    let factory: BinderFactory = Arc::new(factory);
    BINDERS.update(|map| {
        map.insert(TypeId::of::<D>(), factory);
    });
    sql_debug!(target: "sqlop.registry", destination = type_name::<D>(), "registered binder");
}

/// Register the record binder for `Vec<T>`.
pub fn register_record<T>()
where
    T: Record + Field + Default,
{
    register_with::<Vec<T>>(|purpose| Arc::new(RecordSliceBinder::<T>::with_purpose(purpose)));
}

/// Whether a binder is registered for `D`.
pub fn registered<D: Destination>() -> bool {
    BINDERS.get(&TypeId::of::<D>()).is_some()
}

/// Dispatches to the binder registered for the destination's type.
#[derive(Debug, Clone, Copy)]
pub struct RegistryBinder {
    purpose: Purpose,
}

impl RegistryBinder {
    pub fn new(purpose: Purpose) -> Self {
        Self { purpose }
    }
}

impl Default for RegistryBinder {
    fn default() -> Self {
        Self::new(Purpose::SCAN)
    }
}

impl Binder for RegistryBinder {
    fn bind(&self, rows: &mut dyn RowSource, dest: &mut dyn Destination) -> SqlResult<()> {
        match BINDERS.get(&dest.dest_type_id()) {
            Some(factory) => (*factory)(self.purpose).bind(rows, dest),
            None => Err(SqlError::unsupported_binder(dest.dest_type_name())),
        }
    }
}

static DEFAULT_CHAIN: LazyLock<ComposedBinder> = LazyLock::new(|| {
    ComposedBinder::default()
        .with(RegistryBinder::default())
        .with(SequenceBinder::default())
        .with(MappingBinder)
});

/// The default chain used by [`bind_rows`].
pub fn default_binder() -> ComposedBinder {
    DEFAULT_CHAIN.clone()
}

/// The default chain with registered and fallback binders mapping records
/// for `purpose`.
pub fn binder_for(purpose: Purpose) -> ComposedBinder {
    if purpose == Purpose::SCAN {
        return default_binder();
    }
    ComposedBinder::default()
        .with(RegistryBinder::new(purpose))
        .with(SequenceBinder::new(purpose))
        .with(MappingBinder)
}

/// Bind every remaining row of `rows` into `dest`.
pub fn bind_rows(rows: &mut dyn RowSource, dest: &mut dyn Destination) -> SqlResult<()> {
    DEFAULT_CHAIN.bind(rows, dest)
}

/// Fills records column by column through a cached scan plan.
///
/// The column → field mapping is resolved once, on construction; columns
/// with no matching field are read and discarded.
pub(crate) struct RecordScanner {
    plan: Arc<Plan>,
    targets: Vec<Option<usize>>,
    slots: Vec<Value>,
}

impl RecordScanner {
    pub(crate) fn new(plan: Arc<Plan>, columns: &[String]) -> Self {
        let targets = columns.iter().map(|c| plan.position(c)).collect();
        Self {
            plan,
            targets,
            slots: vec![Value::Null; columns.len()],
        }
    }

    pub(crate) fn scan(&mut self, rows: &mut dyn RowSource, record: &mut dyn Record) -> SqlResult<()> {
        {
            let mut dest: Vec<&mut dyn Field> =
                self.slots.iter_mut().map(|v| v as &mut dyn Field).collect();
            rows.scan(&mut dest)?;
        }
        for (slot, target) in self.slots.iter_mut().zip(&self.targets) {
            let value = std::mem::take(slot);
            if let Some(i) = target {
                let path = &self.plan.fields()[*i].path;
                field_at_mut(record, path)?.assign(value)?;
            }
        }
        Ok(())
    }
}

/// Scan the current row of `rows` into `record` by column name.
pub fn scan_record(rows: &mut dyn RowSource, record: &mut dyn Record) -> SqlResult<()> {
    let plan = plan_of(record, Purpose::SCAN);
    RecordScanner::new(plan, rows.columns()).scan(rows, record)
}

/// Per-bind element filler: records by column name, scalars from one column.
pub(crate) struct ElementScanner {
    purpose: Purpose,
    record: Option<RecordScanner>,
}

impl ElementScanner {
    pub(crate) fn new(purpose: Purpose) -> Self {
        Self {
            purpose,
            record: None,
        }
    }

    pub(crate) fn scan(&mut self, rows: &mut dyn RowSource, elem: &mut dyn Field) -> SqlResult<()> {
        match elem.as_record_mut() {
            Some(record) => {
                if self.record.is_none() {
                    let plan = plan_of(record, self.purpose);
                    self.record = Some(RecordScanner::new(plan, rows.columns()));
                }
                match &mut self.record {
                    Some(scanner) => scanner.scan(rows, record),
                    None => Ok(()),
                }
            }
            None => rows.scan(&mut [elem]),
        }
    }
}
