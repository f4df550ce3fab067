//! Parameterized SQL fragments.

use std::fmt::Write as _;

use crate::ident::push_quoted;
use crate::value::SqlValue;

/// A piece of SQL with `$n` placeholders plus the values bound to them, in order.
///
/// Not executable on its own: a caller splices `clause` into a statement that
/// supplies the table, the keyword (`SET` / `WHERE`) and any trailing conditions.
/// The number of placeholders in `clause` always equals `values.len()`, and their
/// ordinals are contiguous from the offset the fragment was built with plus one.
#[derive(Debug, Clone, PartialEq, Default)]
#[must_use]
pub struct SqlFragment {
    pub clause: String,
    pub values: Vec<SqlValue>,
}

impl SqlFragment {
    /// The empty fragment: no clause, no values.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// Ordinal a trailing parameter must use when this fragment was built at `offset`.
    ///
    /// For an UPDATE built from offset 0 this is `values.len() + 1`, the slot of the
    /// `WHERE id = $n` parameter.
    pub fn next_ordinal(&self, offset: usize) -> usize {
        offset + self.values.len() + 1
    }

    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.clause, self.values)
    }
}

/// Accumulates a fragment while numbering placeholders from a caller-supplied offset.
///
/// Shared by the SET and WHERE builders; ordinal state lives here and nowhere else.
#[derive(Debug)]
pub(crate) struct FragmentWriter {
    parts: Vec<String>,
    values: Vec<SqlValue>,
    param_count: usize,
    separator: &'static str,
}

impl FragmentWriter {
    /// `offset` is the number of parameters already used by the enclosing statement.
    pub(crate) fn with_offset(offset: usize, separator: &'static str) -> Self {
        Self {
            parts: Vec::new(),
            values: Vec::new(),
            param_count: offset,
            separator,
        }
    }

    /// Start a new part with a quoted column.
    pub(crate) fn begin(&mut self, column: &str) -> &mut String {
        let mut part = String::with_capacity(column.len() + 8);
        push_quoted(&mut part, column);
        self.parts.push(part);
        self.current()
    }

    /// Start a new part with raw, developer-authored SQL.
    pub(crate) fn begin_raw(&mut self, sql: &str) -> &mut String {
        self.parts.push(sql.to_string());
        self.current()
    }

    fn current(&mut self) -> &mut String {
        let last = self.parts.len() - 1;
        &mut self.parts[last]
    }

    /// Append the next `$n` placeholder to the current part and bind `value` to it.
    pub(crate) fn bind(&mut self, value: SqlValue) -> &mut String {
        self.param_count += 1;
        self.values.push(value);
        let n = self.param_count;
        let part = self.current();
        let _ = write!(part, "${n}");
        part
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub(crate) fn finish(self) -> SqlFragment {
        SqlFragment {
            clause: self.parts.join(self.separator),
            values: self.values,
        }
    }
}
