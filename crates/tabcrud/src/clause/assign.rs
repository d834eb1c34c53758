//! SET assignments and the column/value lists of INSERT and SELECT.

use super::{Emit, SqlFragment, check_names};
use crate::dialect::Dialect;
use crate::error::CrudResult;
use crate::param::Param;
use serde_json::Value;

/// `"field"=@p` inside a SET list.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateClause {
    pub field: String,
    pub new_value: Value,
}

impl Emit for UpdateClause {
    fn arity(&self) -> usize {
        1
    }

    fn emit(&self, names: &[String], dialect: &Dialect) -> CrudResult<SqlFragment> {
        check_names("update clause", 1, names)?;
        let mut text = dialect.quote(&self.field);
        text.push('=');
        dialect.write_placeholder(&mut text, &names[0])?;
        Ok(SqlFragment {
            text,
            bindings: vec![Param::new(names[0].clone(), self.new_value.clone())],
        })
    }
}

/// Comma-joined quoted column names. Never parameterized.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldListClause {
    pub fields: Vec<String>,
}

impl Emit for FieldListClause {
    fn arity(&self) -> usize {
        0
    }

    fn emit(&self, names: &[String], dialect: &Dialect) -> CrudResult<SqlFragment> {
        check_names("field list clause", 0, names)?;
        Ok(SqlFragment {
            text: dialect.quote_list(&self.fields),
            bindings: Vec::new(),
        })
    }
}

/// Comma-joined placeholders, one per value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesClause {
    pub values: Vec<Value>,
}

impl Emit for ValuesClause {
    fn arity(&self) -> usize {
        self.values.len()
    }

    fn emit(&self, names: &[String], dialect: &Dialect) -> CrudResult<SqlFragment> {
        check_names("values clause", self.values.len(), names)?;
        let mut text = String::new();
        let mut bindings = Vec::with_capacity(names.len());
        for (i, (name, value)) in names.iter().zip(&self.values).enumerate() {
            if i > 0 {
                text.push(',');
            }
            dialect.write_placeholder(&mut text, name)?;
            bindings.push(Param::new(name.clone(), value.clone()));
        }
        Ok(SqlFragment { text, bindings })
    }
}
