//! WHERE predicates: equality, set membership, and range.

use super::{Emit, SqlFragment, check_names};
use crate::dialect::Dialect;
use crate::error::{CrudError, CrudResult};
use crate::ident::write_quoted;
use crate::param::Param;
use serde_json::Value;

/// `"field"=@p`
#[derive(Debug, Clone, PartialEq)]
pub struct EqualClause {
    pub field: String,
    pub value: Value,
}

impl Emit for EqualClause {
    fn arity(&self) -> usize {
        1
    }

    fn emit(&self, names: &[String], dialect: &Dialect) -> CrudResult<SqlFragment> {
        check_names("equals clause", 1, names)?;
        let mut text = dialect.quote(&self.field);
        text.push('=');
        dialect.write_placeholder(&mut text, &names[0])?;
        Ok(SqlFragment {
            text,
            bindings: vec![Param::new(names[0].clone(), self.value.clone())],
        })
    }
}

/// `"field" IN (@p1,@p2,...)`, wrapped in `NOT (...)` when `exclude` is set.
///
/// An empty value list matches nothing (`1=2`), or everything when excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct InClause {
    pub field: String,
    pub values: Vec<Value>,
    pub exclude: bool,
}

impl Emit for InClause {
    fn arity(&self) -> usize {
        self.values.len()
    }

    fn emit(&self, names: &[String], dialect: &Dialect) -> CrudResult<SqlFragment> {
        check_names("in clause", self.values.len(), names)?;

        let mut text = String::new();
        if self.exclude {
            text.push_str("NOT (");
        }
        if self.values.is_empty() {
            text.push_str("1=2");
        } else {
            write_quoted(&mut text, dialect.quote, &self.field);
            text.push_str(" IN (");
            for (i, name) in names.iter().enumerate() {
                if i > 0 {
                    text.push(',');
                }
                dialect.write_placeholder(&mut text, name)?;
            }
            text.push(')');
        }
        if self.exclude {
            text.push(')');
        }

        let bindings = names
            .iter()
            .zip(&self.values)
            .map(|(name, value)| Param::new(name.clone(), value.clone()))
            .collect();
        Ok(SqlFragment { text, bindings })
    }
}

/// `>=`, `<=` or `BETWEEN`, depending on which bounds are present.
///
/// A JSON `null` bound counts as absent. With `include_nulls` the comparison
/// becomes `(<cmp> OR "field" IS NULL)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeClause {
    pub field: String,
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub include_nulls: bool,
}

impl RangeClause {
    fn bounds(&self) -> (Option<&Value>, Option<&Value>) {
        fn present(v: &Option<Value>) -> Option<&Value> {
            v.as_ref().filter(|v| !v.is_null())
        }
        (present(&self.min), present(&self.max))
    }

    fn missing_bounds(&self) -> CrudError {
        CrudError::RangeBoundsMissing {
            entry: None,
            field: self.field.clone(),
        }
    }
}

impl Emit for RangeClause {
    fn arity(&self) -> usize {
        match self.bounds() {
            (Some(_), Some(_)) => 2,
            (None, None) => 0,
            _ => 1,
        }
    }

    fn emit(&self, names: &[String], dialect: &Dialect) -> CrudResult<SqlFragment> {
        let (min, max) = self.bounds();
        if min.is_none() && max.is_none() {
            return Err(self.missing_bounds());
        }
        check_names("range clause", self.arity(), names)?;

        let field = dialect.quote(&self.field);
        let mut text = String::new();
        if self.include_nulls {
            text.push('(');
        }
        text.push_str(&field);

        let mut bindings = Vec::with_capacity(names.len());
        match (min, max) {
            (Some(lo), Some(hi)) => {
                text.push_str(" BETWEEN ");
                dialect.write_placeholder(&mut text, &names[0])?;
                text.push_str(" AND ");
                dialect.write_placeholder(&mut text, &names[1])?;
                bindings.push(Param::new(names[0].clone(), lo.clone()));
                bindings.push(Param::new(names[1].clone(), hi.clone()));
            }
            (Some(lo), None) => {
                text.push_str(" >= ");
                dialect.write_placeholder(&mut text, &names[0])?;
                bindings.push(Param::new(names[0].clone(), lo.clone()));
            }
            (None, Some(hi)) => {
                text.push_str(" <= ");
                dialect.write_placeholder(&mut text, &names[0])?;
                bindings.push(Param::new(names[0].clone(), hi.clone()));
            }
            (None, None) => return Err(self.missing_bounds()),
        }

        if self.include_nulls {
            text.push_str(" OR ");
            text.push_str(&field);
            text.push_str(" IS NULL)");
        }
        Ok(SqlFragment { text, bindings })
    }
}
