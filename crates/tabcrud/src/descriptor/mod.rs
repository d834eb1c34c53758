//! Parsing of loosely-typed request descriptors into clauses.
//!
//! A WHERE descriptor is a JSON list of objects:
//!
//! ```json
//! [
//!   {"field": "category", "operator": "equals", "values": ["new"]},
//!   {"field": "region",   "operator": "in",     "values": ["EU", "US"], "exclude": true},
//!   {"field": "amount",   "operator": "range",  "values": [0, null], "includeNulls": true}
//! ]
//! ```
//!
//! An UPDATE descriptor is a JSON object mapping field name to new value.
//! Entries keep their insertion order, so parameter numbering is stable for a
//! given serialization.
//!
//! Every failure names the 1-based index of the offending WHERE entry.

mod request;

#[cfg(test)]
mod tests;

pub use request::{
    ReadParams, UpdateParams, parse_delete, parse_fields, parse_insert, parse_read,
    parse_update_request,
};

use crate::clause::Clause;
use crate::error::{CrudError, CrudResult};
use serde_json::{Map, Value};

/// Operator names accepted in a WHERE entry (exact, case-sensitive).
pub const OP_EQUALS: &str = "equals";
pub const OP_IN: &str = "in";
pub const OP_RANGE: &str = "range";

/// Short JSON type name for error messages.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Parse a WHERE descriptor list into predicate clauses.
pub fn parse_where(raw: &Value) -> CrudResult<Vec<Clause>> {
    let Value::Array(entries) = raw else {
        return Err(CrudError::structural(format!(
            "expected where to be a list but got {}",
            json_type(raw)
        )));
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_where_entry(i + 1, entry).map_err(|e| e.at(i + 1)))
        .collect()
}

fn parse_where_entry(index: usize, entry: &Value) -> CrudResult<Clause> {
    let Value::Object(map) = entry else {
        return Err(CrudError::structural_at(
            index,
            format!("expected an object but got {}", json_type(entry)),
        ));
    };

    let field = required_str(map, "field", index)?;
    let operator = required_str(map, "operator", index)?;
    let values = match map.get("values") {
        None => return Err(CrudError::structural_at(index, "missing 'values'")),
        Some(Value::Array(values)) => values,
        Some(other) => {
            return Err(CrudError::structural_at(
                index,
                format!("'values' is not a list (got {})", json_type(other)),
            ));
        }
    };

    match operator {
        OP_EQUALS => {
            let [value] = values.as_slice() else {
                return Err(CrudError::arity("equals operator", 1, values.len()));
            };
            Ok(Clause::equal(field, value.clone()))
        }
        OP_IN => {
            let exclude = optional_bool(map, "exclude", index)?;
            Ok(Clause::in_list(field, values.clone(), exclude))
        }
        OP_RANGE => {
            let include_nulls = optional_bool(map, "includeNulls", index)?;
            let [min, max] = values.as_slice() else {
                return Err(CrudError::arity("range operator", 2, values.len()));
            };
            if min.is_null() && max.is_null() {
                return Err(CrudError::RangeBoundsMissing {
                    entry: Some(index),
                    field: field.to_string(),
                });
            }
            let bound = |v: &Value| (!v.is_null()).then(|| v.clone());
            Ok(Clause::range(field, bound(min), bound(max), include_nulls))
        }
        other => Err(CrudError::UnknownOperator {
            entry: Some(index),
            operator: other.to_string(),
        }),
    }
}

fn required_str<'a>(map: &'a Map<String, Value>, key: &str, index: usize) -> CrudResult<&'a str> {
    match map.get(key) {
        None => Err(CrudError::structural_at(index, format!("missing '{key}'"))),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(CrudError::structural_at(
            index,
            format!("'{key}' is not a string (got {})", json_type(other)),
        )),
    }
}

fn optional_bool(map: &Map<String, Value>, key: &str, index: usize) -> CrudResult<bool> {
    match map.get(key) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(CrudError::structural_at(
            index,
            format!("'{key}' is not a boolean (got {})", json_type(other)),
        )),
    }
}

/// Parse an UPDATE descriptor object into assignment clauses, one per entry.
pub fn parse_update(raw: &Value) -> CrudResult<Vec<Clause>> {
    let Value::Object(map) = raw else {
        return Err(CrudError::structural(format!(
            "expected updates to be an object but got {}",
            json_type(raw)
        )));
    };
    Ok(map
        .iter()
        .map(|(field, value)| Clause::update(field.as_str(), value.clone()))
        .collect())
}
