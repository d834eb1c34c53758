//! The closed set of clause shapes a request can compile to.
//!
//! Predicates ([`EqualClause`], [`InClause`], [`RangeClause`]) are joined with
//! `AND` into a WHERE list; assignments ([`UpdateClause`]) are joined with `,`
//! into a SET list. [`FieldListClause`] and [`ValuesClause`] render the column
//! and value lists of an INSERT or SELECT.
//!
//! Every clause reports how many parameters it binds ([`Emit::arity`]) and is
//! then handed exactly that many parameter names by the combiner:
//!
//! ```ignore
//! use tabcrud::{Clause, Dialect, Emit};
//!
//! let clause = Clause::in_list("status", vec!["A".into(), "B".into()], true);
//! let frag = clause.emit(&["param1".into(), "param2".into()], &Dialect::ansi())?;
//! assert_eq!(frag.text, r#"NOT ("status" IN (@param1,@param2))"#);
//! ```

mod assign;
mod predicate;


pub use assign::{FieldListClause, UpdateClause, ValuesClause};
pub use predicate::{EqualClause, InClause, RangeClause};

use crate::dialect::Dialect;
use crate::error::{CrudError, CrudResult};
use crate::param::{Param, validate_param_name};
use serde_json::Value;

/// SQL text for one clause plus the values it binds, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub text: String,
    pub bindings: Vec<Param>,
}

/// Capability shared by every clause variant.
pub trait Emit {
    /// Number of parameter names [`Emit::emit`] expects.
    fn arity(&self) -> usize;

    /// Render the clause using the given parameter names.
    ///
    /// Fails with [`CrudError::ArityMismatch`] unless `names.len() == self.arity()`,
    /// and with [`CrudError::InvalidParamName`] if any name is unsafe.
    fn emit(&self, names: &[String], dialect: &Dialect) -> CrudResult<SqlFragment>;
}

/// Length check followed by per-name validation.
pub(crate) fn check_names(context: &'static str, expected: usize, names: &[String]) -> CrudResult<()> {
    if names.len() != expected {
        return Err(CrudError::arity(context, expected, names.len()));
    }
    for name in names {
        validate_param_name(name)?;
    }
    Ok(())
}

/// One compiled-request clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Equal(EqualClause),
    In(InClause),
    Range(RangeClause),
    Update(UpdateClause),
    FieldList(FieldListClause),
    Values(ValuesClause),
}

impl Clause {
    /// `field = value`
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Clause::Equal(EqualClause {
            field: field.into(),
            value: value.into(),
        })
    }

    /// `field IN (values...)`, negated when `exclude` is set.
    pub fn in_list(field: impl Into<String>, values: Vec<Value>, exclude: bool) -> Self {
        Clause::In(InClause {
            field: field.into(),
            values,
            exclude,
        })
    }

    /// Open or closed range over `field`.
    pub fn range(
        field: impl Into<String>,
        min: Option<Value>,
        max: Option<Value>,
        include_nulls: bool,
    ) -> Self {
        Clause::Range(RangeClause {
            field: field.into(),
            min,
            max,
            include_nulls,
        })
    }

    /// `field = new_value` in a SET list.
    pub fn update(field: impl Into<String>, new_value: impl Into<Value>) -> Self {
        Clause::Update(UpdateClause {
            field: field.into(),
            new_value: new_value.into(),
        })
    }

    /// Column-name projection.
    pub fn field_list<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Clause::FieldList(FieldListClause {
            fields: fields.into_iter().map(Into::into).collect(),
        })
    }

    /// Bare placeholder list, as in `VALUES (...)`.
    pub fn values(values: Vec<Value>) -> Self {
        Clause::Values(ValuesClause { values })
    }

    fn as_emit(&self) -> &dyn Emit {
        match self {
            Clause::Equal(c) => c,
            Clause::In(c) => c,
            Clause::Range(c) => c,
            Clause::Update(c) => c,
            Clause::FieldList(c) => c,
            Clause::Values(c) => c,
        }
    }
}

impl Emit for Clause {
    fn arity(&self) -> usize {
        self.as_emit().arity()
    }

    fn emit(&self, names: &[String], dialect: &Dialect) -> CrudResult<SqlFragment> {
        self.as_emit().emit(names, dialect)
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Clause {
                fn from(c: $ty) -> Self {
                    Clause::$variant(c)
                }
            }
        )*
    };
}

impl_from_variant!(
    Equal(EqualClause),
    In(InClause),
    Range(RangeClause),
    Update(UpdateClause),
    FieldList(FieldListClause),
    Values(ValuesClause),
);
