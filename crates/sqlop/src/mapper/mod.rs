//! Record-to-column mapping.
//!
//! [`plan_for`] walks a record's static field layout once per
//! ([`Purpose`], type) pair and caches the resulting [`Plan`] for the life of
//! the process. Each [`FieldPlan`] carries the column name and the index path
//! that addresses the field, so later reads and writes never re-walk the type.
//!
//! Layout rules:
//! - a field tagged `-` is skipped
//! - the column defaults to the field name; the tag name overrides it
//! - a nested record is flattened; when the nested field has a tag name, its
//!   children are prefixed with `name` + separator
//! - `notpropagate` keeps a nested record as one opaque column
//! - `omitempty`/`omitzero` marks a field for elision on write when zero

mod tag;

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::error::{SqlError, SqlResult};
use crate::log::sql_trace;
use crate::record::{FieldDef, Record, Shape, field_at, field_at_mut};
use crate::snapshot::Snapshot;
use crate::value::Value;

use tag::Tag;

/// What a plan is built for, plus the nested-column separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Purpose {
    pub name: &'static str,
    pub separator: &'static str,
}

impl Purpose {
    pub const SCAN: Purpose = Purpose::new("scan", "_");
    pub const WRITE: Purpose = Purpose::new("write", "_");

    pub const fn new(name: &'static str, separator: &'static str) -> Self {
        Self { name, separator }
    }

    pub const fn with_separator(self, separator: &'static str) -> Self {
        Self {
            name: self.name,
            separator,
        }
    }
}

/// One addressable leaf of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    pub column: String,
    /// Field indexes from the outer record down to the leaf.
    pub path: Vec<usize>,
    /// Elide on write when the value is zero.
    pub omit_zero: bool,
    /// A nested record kept as one column (`notpropagate`).
    pub opaque: bool,
    /// The leaf converts to and from a single [`Value`].
    pub value_leaf: bool,
}

/// Ordered leaf fields of a record type.
#[derive(Debug)]
pub struct Plan {
    type_name: &'static str,
    fields: Vec<FieldPlan>,
    by_column: HashMap<String, usize>,
}

impl Plan {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldPlan] {
        &self.fields
    }

    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.column.as_str()).collect()
    }

    /// Position of `column` in [`Plan::fields`].
    pub fn position(&self, column: &str) -> Option<usize> {
        self.by_column.get(column).copied()
    }

    pub fn find(&self, column: &str) -> Option<&FieldPlan> {
        self.position(column).map(|i| &self.fields[i])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column/value pairs of `record` for writing.
    ///
    /// With `skip_zero`, fields flagged `omitempty` whose value is zero are
    /// left out.
    pub fn values(&self, record: &dyn Record, skip_zero: bool) -> SqlResult<Vec<(String, Value)>> {
        let mut out = Vec::with_capacity(self.fields.len());
        for plan in &self.fields {
            let field = field_at(record, &plan.path)?;
            if skip_zero && plan.omit_zero && field.is_zero() {
                continue;
            }
            out.push((plan.column.clone(), field.to_value()?));
        }
        Ok(out)
    }

    /// Assign `value` to the field mapped to `column`.
    pub fn assign(&self, record: &mut dyn Record, column: &str, value: Value) -> SqlResult<()> {
        let plan = self.find(column).ok_or_else(|| {
            SqlError::Mapping(format!("{} has no column '{column}'", self.type_name))
        })?;
        field_at_mut(record, &plan.path)?.assign(value)
    }
}

type PlanKey = (TypeId, Purpose);

static PLANS: LazyLock<Snapshot<PlanKey, Arc<Plan>>> =
    LazyLock::new(|| Snapshot::new(HashMap::new()));

/// The cached plan of `T` for `purpose`.
///
/// # Panics
/// If two fields of `T` map to the same column.
pub fn plan_for<T: Record>(purpose: Purpose) -> Arc<Plan> {
    cached(TypeId::of::<T>(), type_name::<T>(), T::fields(), purpose)
}

/// [`plan_for`] for a record behind `dyn Record`.
pub fn plan_of(record: &dyn Record, purpose: Purpose) -> Arc<Plan> {
    cached(
        record.record_type_id(),
        record.record_type_name(),
        record.field_defs(),
        purpose,
    )
}

fn cached(
    type_id: TypeId,
    type_name: &'static str,
    defs: &'static [FieldDef],
    purpose: Purpose,
) -> Arc<Plan> {
    PLANS.get_or_insert_with((type_id, purpose), || {
        Arc::new(build(type_name, defs, purpose))
    })
}

fn build(type_name: &'static str, defs: &[FieldDef], purpose: Purpose) -> Plan {
    let mut fields = Vec::new();
    let mut path = Vec::new();
    walk(defs, purpose, "", &mut path, &mut fields);

    let mut by_column = HashMap::with_capacity(fields.len());
    for (i, f) in fields.iter().enumerate() {
        if by_column.insert(f.column.clone(), i).is_some() {
            panic!(
                "sqlop: record {type_name} maps more than one field to column '{}'",
                f.column
            );
        }
    }

    sql_trace!(
        target: "sqlop.mapper",
        record = type_name,
        purpose = purpose.name,
        columns = fields.len(),
        "built field plan"
    );

    Plan {
        type_name,
        fields,
        by_column,
    }
}

fn walk(
    defs: &[FieldDef],
    purpose: Purpose,
    prefix: &str,
    path: &mut Vec<usize>,
    out: &mut Vec<FieldPlan>,
) {
    for (i, def) in defs.iter().enumerate() {
        let tag = Tag::parse(def.tag.unwrap_or(""));
        if tag.skip {
            continue;
        }
        let name = tag.name.unwrap_or(def.name);
        let column = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}{}{name}", purpose.separator)
        };

        path.push(i);
        match (def.shape)() {
            Shape::Record(children) if !tag.notpropagate => {
                let child_prefix = if tag.name.is_some() { column.as_str() } else { prefix };
                walk(children(), purpose, child_prefix, path, out);
            }
            shape => out.push(FieldPlan {
                column,
                path: path.clone(),
                omit_zero: tag.omit_zero,
                opaque: matches!(shape, Shape::Record(_)),
                value_leaf: matches!(shape, Shape::Value),
            }),
        }
        path.pop();
    }
}
