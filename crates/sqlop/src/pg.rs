//! tokio-postgres encoding for [`Value`].

use std::error::Error;

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

use crate::error::SqlResult;
use crate::rows::Rows;
use crate::value::Value;

type BoxError = Box<dyn Error + Sync + Send>;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::I64(v) => int_to_sql(*v, ty, out),
            Value::U64(v) => int_to_sql(i64::try_from(*v)?, ty, out),
            Value::F64(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Text(s) => {
                if *ty == Type::JSON || *ty == Type::JSONB {
                    let json: serde_json::Value = serde_json::from_str(s)?;
                    json.to_sql(ty, out)
                } else {
                    s.as_str().to_sql(ty, out)
                }
            }
            Value::Bytes(b) => b.as_slice().to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Time(v) => v.to_sql(ty, out),
            Value::DateTime(v) => {
                if *ty == Type::TIMESTAMPTZ {
                    v.and_utc().to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Timestamp(v) => {
                if *ty == Type::TIMESTAMP {
                    v.naive_utc().to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Uuid(v) => v.to_sql(ty, out),
            Value::Json(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn int_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if *ty == Type::INT2 {
        i16::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::OID {
        u32::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::FLOAT8 {
        (v as f64).to_sql(ty, out)
    } else if *ty == Type::BOOL {
        (v != 0).to_sql(ty, out)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR {
        v.to_string().as_str().to_sql(ty, out)
    } else {
        v.to_sql(ty, out)
    }
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let value = if *ty == Type::BOOL {
            Value::Bool(bool::from_sql(ty, raw)?)
        } else if *ty == Type::CHAR {
            Value::I64(i64::from(i8::from_sql(ty, raw)?))
        } else if *ty == Type::INT2 {
            Value::I64(i64::from(i16::from_sql(ty, raw)?))
        } else if *ty == Type::INT4 {
            Value::I64(i64::from(i32::from_sql(ty, raw)?))
        } else if *ty == Type::INT8 {
            Value::I64(i64::from_sql(ty, raw)?)
        } else if *ty == Type::OID {
            Value::U64(u64::from(u32::from_sql(ty, raw)?))
        } else if *ty == Type::FLOAT4 {
            Value::F64(f64::from(f32::from_sql(ty, raw)?))
        } else if *ty == Type::FLOAT8 {
            Value::F64(f64::from_sql(ty, raw)?)
        } else if <&str as FromSql>::accepts(ty) {
            Value::Text(<&str>::from_sql(ty, raw)?.to_string())
        } else if *ty == Type::BYTEA {
            Value::Bytes(<&[u8]>::from_sql(ty, raw)?.to_vec())
        } else if *ty == Type::DATE {
            Value::Date(NaiveDate::from_sql(ty, raw)?)
        } else if *ty == Type::TIME {
            Value::Time(NaiveTime::from_sql(ty, raw)?)
        } else if *ty == Type::TIMESTAMP {
            Value::DateTime(NaiveDateTime::from_sql(ty, raw)?)
        } else if *ty == Type::TIMESTAMPTZ {
            Value::Timestamp(DateTime::<Utc>::from_sql(ty, raw)?)
        } else if *ty == Type::UUID {
            Value::Uuid(Uuid::from_sql(ty, raw)?)
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            Value::Json(serde_json::Value::from_sql(ty, raw)?)
        } else {
            // unknown types keep their binary representation
            Value::Bytes(raw.to_vec())
        };
        Ok(value)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(Value::Null)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Borrow values as tokio-postgres parameters.
pub(crate) fn params(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// Decode driver rows into a buffered [`Rows`].
///
/// Column names come from the prepared statement so an empty result still
/// carries its shape.
pub(crate) fn decode_rows(
    columns: &[tokio_postgres::Column],
    rows: Vec<tokio_postgres::Row>,
) -> SqlResult<Rows> {
    let columns: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut values = Vec::with_capacity(row.len());
        for i in 0..row.len() {
            values.push(row.try_get::<_, Value>(i)?);
        }
        out.push(values);
    }
    Ok(Rows::new(columns, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: &Value, ty: &Type) -> Value {
        let mut buf = BytesMut::new();
        match value.to_sql(ty, &mut buf).unwrap() {
            IsNull::Yes => Value::from_sql_null(ty).unwrap(),
            IsNull::No => Value::from_sql(ty, &buf).unwrap(),
        }
    }

    #[test]
    fn test_integers_narrow_to_column_type() {
        assert_eq!(roundtrip(&Value::I64(7), &Type::INT4), Value::I64(7));
        assert_eq!(roundtrip(&Value::I64(7), &Type::INT2), Value::I64(7));

        let mut buf = BytesMut::new();
        assert!(Value::I64(i64::MAX).to_sql(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn test_null_is_null() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            Value::Null.to_sql(&Type::TEXT, &mut buf).unwrap(),
            IsNull::Yes
        ));
    }

    #[test]
    fn test_text_and_json() {
        assert_eq!(
            roundtrip(&Value::Text("hi".into()), &Type::TEXT),
            Value::Text("hi".into())
        );
        assert_eq!(
            roundtrip(&Value::Text(r#"{"a":1}"#.into()), &Type::JSONB),
            Value::Json(serde_json::json!({"a": 1}))
        );
    }

    #[test]
    fn test_unknown_type_keeps_bytes() {
        let v = Value::from_sql(&Type::INET, &[1, 2, 3]).unwrap();
        assert_eq!(v, Value::Bytes(vec![1, 2, 3]));
    }
}
