//! Field and record capabilities.
//!
//! Records expose a static field layout ([`FieldDef`]) and positional access
//! to each field as a [`Field`]. The derive macro (`#[derive(Record)]`)
//! generates both; the mapper turns the layout into cached column plans.

use std::any::{Any, TypeId, type_name};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::error::{SqlError, SqlResult};
use crate::value::Value;

/// How the mapper treats a field.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// A single column.
    Value,
    /// A nested record, flattened into its own fields.
    Record(fn() -> &'static [FieldDef]),
}

/// Static description of one declared field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Declared Rust field name.
    pub name: &'static str,
    /// Tag text: `name[,attr...]`, `-` to skip.
    pub tag: Option<&'static str>,
    pub shape: fn() -> Shape,
}

/// A value-capable field.
pub trait Field: Send + Sync {
    fn shape() -> Shape
    where
        Self: Sized,
    {
        Shape::Value
    }

    /// Convert into a bound value.
    fn to_value(&self) -> SqlResult<Value>;

    /// Overwrite from a scanned value.
    fn assign(&mut self, value: Value) -> SqlResult<()>;

    /// Whether this is the type's zero value (for write-time elision).
    fn is_zero(&self) -> bool;

    fn as_record(&self) -> Option<&dyn Record> {
        None
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        None
    }
}

/// A struct whose fields can be addressed by index.
pub trait Record: Any + Send + Sync {
    /// Declared fields in order.
    fn fields() -> &'static [FieldDef]
    where
        Self: Sized;

    /// Object-safe access to [`Record::fields`].
    fn field_defs(&self) -> &'static [FieldDef];

    fn field(&self, index: usize) -> Option<&dyn Field>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Field>;

    fn record_type_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    fn record_type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Follow `path` from `record` down to a leaf field.
pub fn field_at<'a>(record: &'a dyn Record, path: &[usize]) -> SqlResult<&'a dyn Field> {
    let Some((&last, parents)) = path.split_last() else {
        return Err(SqlError::Mapping("empty field path".to_string()));
    };
    let mut current = record;
    for &i in parents {
        current = current
            .field(i)
            .and_then(|f| f.as_record())
            .ok_or_else(|| bad_path(current.record_type_name(), path))?;
    }
    current
        .field(last)
        .ok_or_else(|| bad_path(current.record_type_name(), path))
}

/// Mutable variant of [`field_at`].
pub fn field_at_mut<'a>(
    record: &'a mut dyn Record,
    path: &[usize],
) -> SqlResult<&'a mut dyn Field> {
    let Some((&last, parents)) = path.split_last() else {
        return Err(SqlError::Mapping("empty field path".to_string()));
    };
    let mut current = record;
    for &i in parents {
        let name = current.record_type_name();
        current = current
            .field_mut(i)
            .and_then(|f| f.as_record_mut())
            .ok_or_else(|| bad_path(name, path))?;
    }
    let name = current.record_type_name();
    current.field_mut(last).ok_or_else(|| bad_path(name, path))
}

fn bad_path(type_name: &str, path: &[usize]) -> SqlError {
    SqlError::Mapping(format!("no field at path {path:?} in {type_name}"))
}

fn mismatch<T: ?Sized>(value: &Value) -> SqlError {
    SqlError::conversion(value.kind(), type_name::<T>())
}

macro_rules! int_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for $ty {
                fn to_value(&self) -> SqlResult<Value> {
                    Ok(Value::from(*self))
                }

                fn assign(&mut self, value: Value) -> SqlResult<()> {
                    *self = match &value {
                        Value::I64(v) => <$ty>::try_from(*v).map_err(|_| mismatch::<$ty>(&value))?,
                        Value::U64(v) => <$ty>::try_from(*v).map_err(|_| mismatch::<$ty>(&value))?,
                        Value::Bool(v) => <$ty>::from(*v),
                        Value::Text(s) => s.trim().parse().map_err(|_| mismatch::<$ty>(&value))?,
                        _ => return Err(mismatch::<$ty>(&value)),
                    };
                    Ok(())
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

int_field!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for $ty {
                fn to_value(&self) -> SqlResult<Value> {
                    Ok(Value::from(*self))
                }

                #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
                fn assign(&mut self, value: Value) -> SqlResult<()> {
                    *self = match &value {
                        Value::F64(v) => *v as $ty,
                        Value::I64(v) => *v as $ty,
                        Value::U64(v) => *v as $ty,
                        Value::Text(s) => s.trim().parse().map_err(|_| mismatch::<$ty>(&value))?,
                        _ => return Err(mismatch::<$ty>(&value)),
                    };
                    Ok(())
                }

                fn is_zero(&self) -> bool {
                    *self == 0.0
                }
            }
        )*
    };
}

float_field!(f32, f64);

impl Field for bool {
    fn to_value(&self) -> SqlResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn assign(&mut self, value: Value) -> SqlResult<()> {
        *self = match value {
            Value::Bool(v) => v,
            Value::I64(v) => v != 0,
            Value::U64(v) => v != 0,
            other => return Err(mismatch::<bool>(&other)),
        };
        Ok(())
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl Field for String {
    fn to_value(&self) -> SqlResult<Value> {
        Ok(Value::Text(self.clone()))
    }

    fn assign(&mut self, value: Value) -> SqlResult<()> {
        *self = match value {
            Value::Text(s) => s,
            Value::Bytes(b) => {
                String::from_utf8(b).map_err(|_| SqlError::conversion("bytes", "String"))?
            }
            Value::I64(v) => v.to_string(),
            Value::U64(v) => v.to_string(),
            Value::F64(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Uuid(v) => v.to_string(),
            other => return Err(mismatch::<String>(&other)),
        };
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Field for Vec<u8> {
    fn to_value(&self) -> SqlResult<Value> {
        Ok(Value::Bytes(self.clone()))
    }

    fn assign(&mut self, value: Value) -> SqlResult<()> {
        *self = match value {
            Value::Bytes(b) => b,
            Value::Text(s) => s.into_bytes(),
            other => return Err(mismatch::<Vec<u8>>(&other)),
        };
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Field for NaiveDate {
    fn to_value(&self) -> SqlResult<Value> {
        Ok(Value::Date(*self))
    }

    fn assign(&mut self, value: Value) -> SqlResult<()> {
        *self = match value {
            Value::Date(d) => d,
            Value::DateTime(dt) => dt.date(),
            Value::Timestamp(ts) => ts.date_naive(),
            other => return Err(mismatch::<NaiveDate>(&other)),
        };
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self == NaiveDate::default()
    }
}

impl Field for NaiveTime {
    fn to_value(&self) -> SqlResult<Value> {
        Ok(Value::Time(*self))
    }

    fn assign(&mut self, value: Value) -> SqlResult<()> {
        *self = match value {
            Value::Time(t) => t,
            Value::DateTime(dt) => dt.time(),
            other => return Err(mismatch::<NaiveTime>(&other)),
        };
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self == NaiveTime::default()
    }
}

impl Field for NaiveDateTime {
    fn to_value(&self) -> SqlResult<Value> {
        Ok(Value::DateTime(*self))
    }

    fn assign(&mut self, value: Value) -> SqlResult<()> {
        *self = match value {
            Value::DateTime(dt) => dt,
            Value::Timestamp(ts) => ts.naive_utc(),
            other => return Err(mismatch::<NaiveDateTime>(&other)),
        };
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self == NaiveDateTime::default()
    }
}

impl Field for DateTime<Utc> {
    fn to_value(&self) -> SqlResult<Value> {
        Ok(Value::Timestamp(*self))
    }

    fn assign(&mut self, value: Value) -> SqlResult<()> {
        *self = match value {
            Value::Timestamp(ts) => ts,
            Value::DateTime(dt) => dt.and_utc(),
            other => return Err(mismatch::<DateTime<Utc>>(&other)),
        };
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self == DateTime::<Utc>::default()
    }
}

impl Field for Uuid {
    fn to_value(&self) -> SqlResult<Value> {
        Ok(Value::Uuid(*self))
    }

    fn assign(&mut self, value: Value) -> SqlResult<()> {
        *self = match &value {
            Value::Uuid(u) => *u,
            Value::Text(s) => Uuid::parse_str(s).map_err(|_| mismatch::<Uuid>(&value))?,
            Value::Bytes(b) => Uuid::from_slice(b).map_err(|_| mismatch::<Uuid>(&value))?,
            _ => return Err(mismatch::<Uuid>(&value)),
        };
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_nil()
    }
}

impl Field for serde_json::Value {
    fn to_value(&self) -> SqlResult<Value> {
        Ok(Value::Json(self.clone()))
    }

    fn assign(&mut self, value: Value) -> SqlResult<()> {
        *self = match value {
            Value::Json(v) => v,
            Value::Null => serde_json::Value::Null,
            Value::Text(s) => serde_json::from_str(&s)
                .map_err(|_| SqlError::conversion("text", "serde_json::Value"))?,
            other => return Err(mismatch::<serde_json::Value>(&other)),
        };
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_null()
    }
}

impl Field for Value {
    fn to_value(&self) -> SqlResult<Value> {
        Ok(self.clone())
    }

    fn assign(&mut self, value: Value) -> SqlResult<()> {
        *self = value;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_null()
    }
}

impl<T> Field for Option<T>
where
    T: Field + Default,
{
    fn to_value(&self) -> SqlResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn assign(&mut self, value: Value) -> SqlResult<()> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.assign(value)?;
        *self = Some(inner);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

/// Convert a JSON-valued column into a serde type. Used by
/// `#[orm(json)]` records.
#[doc(hidden)]
pub fn json_assign<T: serde::de::DeserializeOwned>(value: Value) -> SqlResult<T> {
    let json = match value {
        Value::Json(v) => v,
        Value::Text(s) => serde_json::from_str(&s)
            .map_err(|_| SqlError::conversion("text", type_name::<T>()))?,
        Value::Bytes(b) => serde_json::from_slice(&b)
            .map_err(|_| SqlError::conversion("bytes", type_name::<T>()))?,
        other => return Err(mismatch::<T>(&other)),
    };
    serde_json::from_value(json).map_err(|_| SqlError::conversion("json", type_name::<T>()))
}

/// Serialize a serde type into a JSON value. Used by `#[orm(json)]` records.
#[doc(hidden)]
pub fn json_value<T: serde::Serialize>(value: &T) -> SqlResult<Value> {
    serde_json::to_value(value)
        .map(Value::Json)
        .map_err(|_| SqlError::conversion(type_name::<T>(), "json"))
}

/// Error for a nested record used where a single value is required.
#[doc(hidden)]
pub fn not_a_value(type_name: &'static str) -> SqlError {
    SqlError::Mapping(format!(
        "record {type_name} is not a single value; mark it #[orm(json)] or implement Field"
    ))
}

/// Downcast helper for records held as `dyn Record`.
pub fn downcast_ref<T: Record>(record: &dyn Record) -> Option<&T> {
    (record as &dyn Any).downcast_ref::<T>()
}
