//! Parameter numbering across an ordered list of clauses.
//!
//! The combiner hands each clause `arity()` freshly generated names
//! (`param{n}`), concatenates the emitted text, and returns the next free
//! number so that a second combine over the same statement continues where
//! the first stopped:
//!
//! ```ignore
//! use tabcrud::{combine_update, combine_where, Dialect};
//!
//! let d = Dialect::ansi();
//! let set = combine_update(&updates, 1, &d)?;
//! let filter = combine_where(&wheres, set.next_param_index, &d)?;
//! // UPDATE t SET {set.text} WHERE {filter.text}
//! ```
//!
//! The counter is a plain value threaded through the calls; nothing is shared
//! between statements.

use crate::clause::Emit;
use crate::dialect::Dialect;
use crate::error::CrudResult;
use crate::param::{Param, param_name};

/// Separator between WHERE predicates.
pub const WHERE_SEPARATOR: &str = " AND ";

/// Separator between SET assignments.
pub const UPDATE_SEPARATOR: &str = ",";

/// The output of combining an ordered list of clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedPart {
    pub text: String,
    pub bindings: Vec<Param>,
    /// First parameter number not used by this part.
    pub next_param_index: usize,
}

impl CombinedPart {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Combine predicates with ` AND `.
pub fn combine_where<C: Emit>(
    clauses: &[C],
    start_index: usize,
    dialect: &Dialect,
) -> CrudResult<CombinedPart> {
    combine(clauses, start_index, WHERE_SEPARATOR, dialect)
}

/// Combine assignments with `,`.
pub fn combine_update<C: Emit>(
    clauses: &[C],
    start_index: usize,
    dialect: &Dialect,
) -> CrudResult<CombinedPart> {
    combine(clauses, start_index, UPDATE_SEPARATOR, dialect)
}

/// Combine clauses with an arbitrary separator.
///
/// The first failing clause aborts the whole combine; its error is returned
/// unchanged and no partial result is produced.
pub fn combine<C: Emit>(
    clauses: &[C],
    start_index: usize,
    separator: &str,
    dialect: &Dialect,
) -> CrudResult<CombinedPart> {
    let mut param_num = start_index;
    let mut texts = Vec::with_capacity(clauses.len());
    let mut bindings = Vec::new();

    for clause in clauses {
        let needed = clause.arity();
        let names: Vec<String> = (param_num..param_num + needed).map(param_name).collect();
        param_num += needed;

        let fragment = clause.emit(&names, dialect)?;
        texts.push(fragment.text);
        bindings.extend(fragment.bindings);
    }

    Ok(CombinedPart {
        text: texts.join(separator),
        bindings,
        next_param_index: param_num,
    })
}
