//! Dynamic WHERE fragments for list queries.
//!
//! Each resource declares a [`FilterCriteria`] type with a small, fixed set of
//! optional criteria. [`sql_for_filters`] validates it and renders the present
//! criteria, in the order the type emits them, joined with `AND`:
//!
//! ```ignore
//! use jobly::{sql_for_filters, models::CompanyFilter};
//!
//! let filter = CompanyFilter::default().name("net").min_employees(10);
//! let w = sql_for_filters(&filter)?;
//! assert_eq!(w.clause, r#"LOWER("name") LIKE LOWER($1) AND "num_employees" >= $2"#);
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::fragment::{FragmentWriter, SqlFragment};
use crate::value::SqlValue;

/// Reusable WHERE clause builder.
///
/// Conditions are rendered without the leading `WHERE`; placeholders are numbered
/// from the offset the builder was created with.
#[derive(Debug)]
pub struct WhereBuilder {
    writer: FragmentWriter,
}

impl WhereBuilder {
    /// Create a new WhereBuilder with param numbering starting at 1.
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Create a new WhereBuilder with param numbering starting after `offset`.
    ///
    /// For example, `with_offset(2)` means the first param will be `$3`.
    pub fn with_offset(offset: usize) -> Self {
        Self {
            writer: FragmentWriter::with_offset(offset, " AND "),
        }
    }

    /// Check if any conditions have been added.
    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    fn and_cmp(&mut self, col: &str, operator: &str, value: SqlValue) {
        let part = self.writer.begin(col);
        part.push(' ');
        part.push_str(operator);
        part.push(' ');
        self.writer.bind(value);
    }

    /// Add AND >= condition.
    pub fn and_gte(&mut self, col: &str, value: impl Into<SqlValue>) {
        self.and_cmp(col, ">=", value.into());
    }

    /// Add AND <= condition.
    pub fn and_lte(&mut self, col: &str, value: impl Into<SqlValue>) {
        self.and_cmp(col, "<=", value.into());
    }

    /// Add a case-insensitive substring match: `LOWER("col") LIKE LOWER($n)`.
    ///
    /// The bound value is `%text%`; `%` and `_` inside `text` keep their LIKE meaning.
    pub fn and_contains(&mut self, col: &str, text: &str) {
        let part = self.writer.begin_raw("LOWER(");
        crate::ident::push_quoted(part, col);
        part.push_str(") LIKE LOWER(");
        self.writer.bind(SqlValue::Text(format!("%{text}%"))).push(')');
    }

    /// Add `"col" > 0`. No parameter is bound.
    pub fn and_positive(&mut self, col: &str) {
        self.writer.begin(col).push_str(" > 0");
    }

    // ==================== Option-friendly helpers ====================

    pub fn and_gte_opt(&mut self, col: &str, value: Option<impl Into<SqlValue>>) {
        if let Some(v) = value {
            self.and_gte(col, v);
        }
    }

    pub fn and_lte_opt(&mut self, col: &str, value: Option<impl Into<SqlValue>>) {
        if let Some(v) = value {
            self.and_lte(col, v);
        }
    }

    pub fn and_contains_opt(&mut self, col: &str, text: Option<&str>) {
        if let Some(t) = text {
            self.and_contains(col, t);
        }
    }

    /// Build the WHERE clause fragment (without the `WHERE` keyword).
    pub fn build(self) -> SqlFragment {
        self.writer.finish()
    }
}

impl Default for WhereBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A resource's set of optional list filters.
pub trait FilterCriteria: Default {
    /// Accept one query-string parameter.
    ///
    /// Unknown keys fail with a validation error.
    fn set_param(&mut self, key: &str, value: &str) -> JoblyResult<()>;

    /// Validate the criteria, then add one condition per present criterion.
    ///
    /// Must not touch `w` before every check has passed.
    fn apply(&self, w: &mut WhereBuilder) -> JoblyResult<()>;

    /// Build criteria from query-string pairs. Empty values count as absent.
    fn from_query_pairs<I, K, V>(pairs: I) -> JoblyResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut criteria = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            if value.is_empty() {
                continue;
            }
            criteria.set_param(key.as_ref(), value)?;
        }
        Ok(criteria)
    }
}

/// Build the WHERE fragment for `criteria`, numbering placeholders from `$1`.
///
/// No present criteria yields the empty fragment.
pub fn sql_for_filters<C: FilterCriteria>(criteria: &C) -> JoblyResult<SqlFragment> {
    sql_for_filters_with_offset(criteria, 0)
}

/// Build the WHERE fragment with the first placeholder at `$offset + 1`.
pub fn sql_for_filters_with_offset<C: FilterCriteria>(
    criteria: &C,
    offset: usize,
) -> JoblyResult<SqlFragment> {
    let mut w = WhereBuilder::with_offset(offset);
    criteria.apply(&mut w)?;
    Ok(w.build())
}

/// Parse a numeric filter bound that arrived as text.
///
/// Bounds compare against INTEGER columns, so the value must be a whole number
/// within `i32`. `"10"`, `" 10 "` and `"1e1"` all parse to `10`.
pub fn parse_bound(name: &str, raw: &str) -> JoblyResult<i32> {
    let raw = raw.trim();
    let out_of_range = || JoblyError::validation(format!("{name} is out of range"));

    if let Ok(n) = raw.parse::<i64>() {
        return i32::try_from(n).map_err(|_| out_of_range());
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => {
            if f.fract() != 0.0 {
                return Err(JoblyError::validation(format!("{name} must be an integer")));
            }
            if f < f64::from(i32::MIN) || f > f64::from(i32::MAX) {
                return Err(out_of_range());
            }
            Ok(f as i32)
        }
        _ => Err(JoblyError::validation(format!("{name} must be a number"))),
    }
}

/// Parse an optional lower/upper bound pair and reject an inverted range.
pub fn parse_range(
    (min_name, min): (&str, Option<&str>),
    (max_name, max): (&str, Option<&str>),
) -> JoblyResult<(Option<i32>, Option<i32>)> {
    let min = min.map(|raw| parse_bound(min_name, raw)).transpose()?;
    let max = max.map(|raw| parse_bound(max_name, raw)).transpose()?;
    if let (Some(lo), Some(hi)) = (min, max)
        && lo > hi
    {
        return Err(JoblyError::validation(format!(
            "{min_name} cannot be greater than {max_name}"
        )));
    }
    Ok((min, max))
}
