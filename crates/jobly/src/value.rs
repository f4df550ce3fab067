//! Scalar parameter values.
//!
//! [`SqlValue`] is what travels in the `values` half of a fragment. Payloads arrive as
//! loosely typed JSON, so one value type covers every scalar the API accepts and
//! defers the exact wire encoding to bind time, when the parameter's Postgres type is known.

use bytes::BytesMut;
use rust_decimal::Decimal;
use serde::Serialize;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

use crate::error::{JoblyError, JoblyResult};

/// A bound parameter value: `null`, boolean, number or string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value, rejecting arrays and objects.
    ///
    /// `field` names the offending key in the error message.
    pub fn from_json(field: &str, value: serde_json::Value) -> JoblyResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Int(i)),
                None => n.as_f64().map(Self::Float).ok_or_else(|| {
                    JoblyError::validation(format!("{field} is not a representable number"))
                }),
            },
            Value::String(s) => Ok(Self::Text(s)),
            Value::Array(_) | Value::Object(_) => Err(JoblyError::validation(format!(
                "{field} must be a string, number, boolean or null"
            ))),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Bool(b) => b.to_sql_checked(ty, out),
            Self::Int(i) => bind_int(*i, ty, out),
            Self::Float(f) => {
                if *ty == Type::INT2 || *ty == Type::INT4 || *ty == Type::INT8 {
                    bind_int(whole_number(*f)?, ty, out)
                } else if *ty == Type::NUMERIC {
                    Decimal::try_from(*f)?.to_sql_checked(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*f as f32).to_sql_checked(ty, out)
                } else {
                    f.to_sql_checked(ty, out)
                }
            }
            // NUMERIC columns (job equity) are exchanged as decimal strings.
            Self::Text(s) => {
                if *ty == Type::NUMERIC {
                    s.parse::<Decimal>()?.to_sql_checked(ty, out)
                } else {
                    s.to_sql_checked(ty, out)
                }
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn bind_int(
    i: i64,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if *ty == Type::INT2 {
        i16::try_from(i)?.to_sql_checked(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(i)?.to_sql_checked(ty, out)
    } else if *ty == Type::NUMERIC {
        Decimal::from(i).to_sql_checked(ty, out)
    } else if *ty == Type::FLOAT8 {
        (i as f64).to_sql_checked(ty, out)
    } else {
        i.to_sql_checked(ty, out)
    }
}

/// JSON numbers such as `5.0` arrive as floats; integer columns take them only
/// when they carry no fraction.
fn whole_number(f: f64) -> Result<i64, Box<dyn Error + Sync + Send>> {
    // 2^63 is exact in f64; anything at or above it does not fit.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if !f.is_finite() || f.fract() != 0.0 {
        return Err(format!("{f} is not an integer").into());
    }
    if !(-LIMIT..LIMIT).contains(&f) {
        return Err(format!("{f} is out of range for an integer column").into());
    }
    Ok(f as i64)
}
