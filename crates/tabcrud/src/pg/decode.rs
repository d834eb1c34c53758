//! Decoding result rows into JSON cells.

use super::numeric::Numeric;
use crate::error::{CrudError, CrudResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Number, Value};
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Type};
use uuid::Uuid;

fn cell<'a, T, F>(row: &'a Row, idx: usize, map: F) -> Result<Value, tokio_postgres::Error>
where
    T: FromSql<'a>,
    F: FnOnce(T) -> Value,
{
    Ok(row.try_get::<_, Option<T>>(idx)?.map_or(Value::Null, map))
}

fn float(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

fn time_text(v: NaiveTime) -> String {
    v.format("%H:%M:%S%.f").to_string()
}

fn column_value(row: &Row, idx: usize, ty: &Type) -> CrudResult<Value> {
    let name = row.columns()[idx].name();
    let decoded = if *ty == Type::BOOL {
        cell(row, idx, |v: bool| Value::Bool(v))
    } else if *ty == Type::INT2 {
        cell(row, idx, |v: i16| Value::from(v))
    } else if *ty == Type::INT4 {
        cell(row, idx, |v: i32| Value::from(v))
    } else if *ty == Type::INT8 {
        cell(row, idx, |v: i64| Value::from(v))
    } else if *ty == Type::FLOAT4 {
        cell(row, idx, |v: f32| float(f64::from(v)))
    } else if *ty == Type::FLOAT8 {
        cell(row, idx, float)
    } else if *ty == Type::NUMERIC {
        cell(row, idx, |v: Numeric| float(v.0))
    } else if [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME].contains(ty) {
        cell(row, idx, |v: String| Value::String(v))
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        cell(row, idx, |v: Value| v)
    } else if *ty == Type::UUID {
        cell(row, idx, |v: Uuid| Value::String(v.to_string()))
    } else if *ty == Type::DATE {
        cell(row, idx, |v: NaiveDate| Value::String(v.to_string()))
    } else if *ty == Type::TIME {
        cell(row, idx, |v: NaiveTime| Value::String(time_text(v)))
    } else if *ty == Type::TIMESTAMP {
        cell(row, idx, |v: NaiveDateTime| {
            Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        })
    } else if *ty == Type::TIMESTAMPTZ {
        cell(row, idx, |v: DateTime<Utc>| Value::String(v.to_rfc3339()))
    } else {
        return Err(CrudError::decode(
            name,
            format!("unsupported column type {ty}"),
        ));
    };
    decoded.map_err(|e| CrudError::decode(name, e.to_string()))
}

/// Decode every cell of a row, in column order.
pub(crate) fn row_values(row: &Row) -> CrudResult<Vec<Value>> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| column_value(row, idx, col.type_()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pg::bind::JsonParam;
    use bytes::BytesMut;
    use serde_json::json;
    use tokio_postgres::types::ToSql;

    #[test]
    fn time_round_trips_through_the_wire() {
        for text in ["13:45:30", "00:00:00", "23:59:59.500"] {
            let mut buf = BytesMut::new();
            JsonParam(&json!(text)).to_sql(&Type::TIME, &mut buf).unwrap();
            let decoded = NaiveTime::from_sql(&Type::TIME, &buf).unwrap();
            assert_eq!(time_text(decoded), text);
        }
    }
}
