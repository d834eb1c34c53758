//! Binding JSON values to Postgres parameters.
//!
//! Request values arrive untyped, so the target column type reported by the
//! prepared statement picks the wire encoding.

use super::numeric::encode_decimal;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Number, Value};
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A JSON value bound as a statement parameter.
#[derive(Debug)]
pub(crate) struct JsonParam<'a>(pub &'a Value);

fn is_text(ty: &Type) -> bool {
    [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME, Type::UNKNOWN].contains(ty)
}

fn is_json(ty: &Type) -> bool {
    *ty == Type::JSON || *ty == Type::JSONB
}

fn mismatch(value: &Value, ty: &Type) -> BoxError {
    format!("cannot bind {} to a parameter of type {ty}", crate::descriptor::json_type(value)).into()
}

impl ToSql for JsonParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) if *ty == Type::BOOL => b.to_sql(ty, out),
            Value::Bool(b) if is_text(ty) => b.to_string().as_str().to_sql(ty, out),
            Value::Number(n) => number_to_sql(n, ty, out),
            Value::String(s) => string_to_sql(s, ty, out),
            value if is_json(ty) => value.to_sql(ty, out),
            value => Err(mismatch(value, ty)),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn number_to_sql(n: &Number, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    // Zero-fraction floats (`2.0`) count as integers.
    let int = || {
        n.as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| BoxError::from(format!("{n} is not an integer")))
    };
    let float = || {
        n.as_f64()
            .ok_or_else(|| BoxError::from(format!("{n} is not a number")))
    };

    if *ty == Type::INT2 {
        i16::try_from(int()?)?.to_sql(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(int()?)?.to_sql(ty, out)
    } else if *ty == Type::INT8 {
        int()?.to_sql(ty, out)
    } else if *ty == Type::FLOAT4 {
        (float()? as f32).to_sql(ty, out)
    } else if *ty == Type::FLOAT8 {
        float()?.to_sql(ty, out)
    } else if *ty == Type::NUMERIC {
        let text = match n.as_f64() {
            Some(f) if !(n.is_i64() || n.is_u64()) => f.to_string(),
            _ => n.to_string(),
        };
        encode_decimal(&text, out)?;
        Ok(IsNull::No)
    } else if is_text(ty) {
        n.to_string().as_str().to_sql(ty, out)
    } else if is_json(ty) {
        Value::Number(n.clone()).to_sql(ty, out)
    } else {
        Err(mismatch(&Value::Number(n.clone()), ty))
    }
}

fn string_to_sql(s: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if is_text(ty) {
        s.to_sql(ty, out)
    } else if *ty == Type::INT2 {
        s.trim().parse::<i16>()?.to_sql(ty, out)
    } else if *ty == Type::INT4 {
        s.trim().parse::<i32>()?.to_sql(ty, out)
    } else if *ty == Type::INT8 {
        s.trim().parse::<i64>()?.to_sql(ty, out)
    } else if *ty == Type::FLOAT4 {
        s.trim().parse::<f32>()?.to_sql(ty, out)
    } else if *ty == Type::FLOAT8 {
        s.trim().parse::<f64>()?.to_sql(ty, out)
    } else if *ty == Type::NUMERIC {
        encode_decimal(s.trim(), out)?;
        Ok(IsNull::No)
    } else if *ty == Type::BOOL {
        s.trim().parse::<bool>()?.to_sql(ty, out)
    } else if *ty == Type::UUID {
        Uuid::parse_str(s)?.to_sql(ty, out)
    } else if *ty == Type::DATE {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")?.to_sql(ty, out)
    } else if *ty == Type::TIME {
        parse_time(s)?.to_sql(ty, out)
    } else if *ty == Type::TIMESTAMP {
        parse_timestamp(s)?.to_sql(ty, out)
    } else if *ty == Type::TIMESTAMPTZ {
        DateTime::parse_from_rfc3339(s)?
            .with_timezone(&Utc)
            .to_sql(ty, out)
    } else if is_json(ty) {
        Value::String(s.to_string()).to_sql(ty, out)
    } else {
        Err(mismatch(&Value::String(s.to_string()), ty))
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, BoxError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(BoxError::from)
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, BoxError> {
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }
    // Accept a bare date as midnight.
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
    Ok(date.and_time(NaiveTime::MIN))
}
