//! Column identifier quoting.
//!
//! Column names reaching SQL text come from two places only:
//!
//! - a developer-authored [`FieldMap`](crate::FieldMap), or
//! - payload keys that passed [`UpdatePayload::ensure_fields`](crate::UpdatePayload::ensure_fields)
//!   against a closed, per-resource allow-list.
//!
//! They are therefore trusted, and quoting only wraps them in double quotes to keep
//! case (`"lastName"`) and to avoid keyword collisions (`"order"`). No escaping is
//! applied. Values never pass through here; they always travel as bound parameters.
//!
//! # Example
//! ```ignore
//! use jobly::quote_identifier;
//!
//! assert_eq!(quote_identifier("num_employees"), r#""num_employees""#);
//! ```

/// Wrap a trusted column name in double quotes.
pub fn quote_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    push_quoted(&mut out, name);
    out
}

/// Append a quoted column name to `out` without an intermediate allocation.
pub(crate) fn push_quoted(out: &mut String, name: &str) {
    out.push('"');
    out.push_str(name);
    out.push('"');
}
