//! Dialect-neutral operand values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::fmt;
use uuid::Uuid;

/// A value placed into a statement.
///
/// Literal variants are inlined (strings quoted through the connection's
/// escaper); [`Value::Param`] is deferred and rendered as the dialect's native
/// placeholder, its inner value returned in [`BuiltQuery::params`](crate::BuiltQuery).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    /// Identifier reference, rendered quoted (e.g. the right side of a join condition).
    Column(String),
    /// Verbatim SQL.
    Raw(String),
    /// Deferred bind parameter.
    Param(Box<Value>),
}

impl Value {
    /// Wrap a value as a deferred bind parameter.
    pub fn param(value: impl Into<Value>) -> Self {
        Value::Param(Box::new(value.into()))
    }

    /// Reference a column.
    pub fn column(name: impl Into<String>) -> Self {
        Value::Column(name.into())
    }

    /// Verbatim SQL expression (e.g. `NOW()`).
    pub fn raw(sql: impl Into<String>) -> Self {
        Value::Raw(sql.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) | Value::Column(s) | Value::Raw(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Value::Param(inner) => write!(f, "{inner}"),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::List(v.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Text(v.format("%Y-%m-%d").to_string())
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Text(v.format("%H:%M:%S%.f").to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Text(v.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value
where
    Tz::Offset: fmt::Display,
{
    fn from(v: DateTime<Tz>) -> Self {
        Value::Text(v.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or_else(|| Value::Text(n.to_string()), Value::Float),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            object @ serde_json::Value::Object(_) => Value::Text(object.to_string()),
        }
    }
}

#[cfg(feature = "postgres")]
mod pg {
    use super::Value;
    use bytes::BytesMut;
    use std::error::Error;
    use tokio_postgres::types::{IsNull, ToSql, Type};

    impl ToSql for Value {
        fn to_sql(
            &self,
            ty: &Type,
            out: &mut BytesMut,
        ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
            match self {
                Value::Null => Ok(IsNull::Yes),
                Value::Bool(b) => b.to_sql(ty, out),
                Value::Int(i) => {
                    if *ty == Type::INT2 {
                        i16::try_from(*i)?.to_sql(ty, out)
                    } else if *ty == Type::INT4 {
                        i32::try_from(*i)?.to_sql(ty, out)
                    } else if *ty == Type::FLOAT4 {
                        (*i as f32).to_sql(ty, out)
                    } else if *ty == Type::FLOAT8 {
                        (*i as f64).to_sql(ty, out)
                    } else {
                        i.to_sql(ty, out)
                    }
                }
                Value::Float(x) if *ty == Type::FLOAT4 => (*x as f32).to_sql(ty, out),
                Value::Float(x) => x.to_sql(ty, out),
                Value::Text(s) => s.to_sql(ty, out),
                Value::List(items) => items.to_sql(ty, out),
                Value::Param(inner) => inner.to_sql(ty, out),
                Value::Column(_) | Value::Raw(_) => {
                    Err(format!("{self} is SQL text and cannot be bound as a parameter").into())
                }
            }
        }

        fn accepts(_ty: &Type) -> bool {
            true
        }

        tokio_postgres::types::to_sql_checked!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_rust_scalars() {
        assert_eq!(Value::from(7_i32), Value::Int(7));
        assert_eq!(Value::from("x"), Value::Text("x".into()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(Value::from([true]), Value::List(vec![Value::Bool(true)]));
    }

    #[test]
    fn converts_json() {
        let json = serde_json::json!({"a": [1, 2.5, "x", null]});
        let items = Value::from(json["a"].clone());
        assert_eq!(
            items,
            Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::Text("x".into()),
                Value::Null,
            ])
        );
        assert_eq!(Value::from(json), Value::Text(r#"{"a":[1,2.5,"x",null]}"#.into()));
    }

    #[test]
    fn converts_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::from(date), Value::Text("2024-02-29".into()));
        let ts = date.and_hms_opt(13, 5, 0).unwrap();
        assert_eq!(Value::from(ts), Value::Text("2024-02-29 13:05:00".into()));
    }

    #[test]
    fn display_for_lists() {
        let v = Value::from(vec![Value::Int(1), Value::Text("a".into())]);
        assert_eq!(v.to_string(), "(1, a)");
    }
}
