//! Complete, executable statements.
//!
//! Models assemble a [`Statement`] from fixed SQL text plus the fragments produced by
//! [`sql_for_partial_update`](crate::sql_for_partial_update) and
//! [`sql_for_filters`](crate::sql_for_filters), then run it through a
//! [`GenericClient`]. Assembly is pure, so the final SQL is testable without a database.

use std::borrow::Cow;
use std::fmt::Write as _;
use tokio_postgres::types::ToSql;

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::fragment::SqlFragment;
use crate::row::FromRow;
use crate::value::SqlValue;

/// Longest SQL text emitted in a debug event, in bytes.
const MAX_LOGGED_SQL: usize = 200;

/// SQL text with `$1, $2, ...` placeholders and the values bound to them.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Statement {
    sql: String,
    params: Vec<SqlValue>,
    tag: Option<&'static str>,
}

impl Statement {
    /// Start a statement with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            sql: initial_sql.into(),
            params: Vec::new(),
            tag: None,
        }
    }

    /// Associate a tag (e.g. `"companies.update"`) for logging.
    pub fn tagged(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append the next placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.params.push(value.into());
        let n = self.params.len();
        let _ = write!(self.sql, "${n}");
        self
    }

    /// Append a fragment that was built with offset [`param_count`](Self::param_count).
    pub fn push_fragment(&mut self, fragment: SqlFragment) -> &mut Self {
        let (clause, values) = fragment.into_parts();
        self.sql.push_str(&clause);
        self.params.extend(values);
        self
    }

    /// Append ` WHERE <fragment>` unless the fragment is empty.
    pub fn push_where(&mut self, fragment: SqlFragment) -> &mut Self {
        if !fragment.is_empty() {
            self.push(" WHERE ");
            self.push_fragment(fragment);
        }
        self
    }

    /// Number of parameters bound so far; the offset for the next fragment.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }

    /// Check that the placeholders are exactly `$1..=$n` for `n` bound values.
    pub fn validate(&self) -> JoblyResult<()> {
        let n = self.params.len();
        let mut seen = vec![false; n];
        let bytes = self.sql.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b'$' {
                i += 1;
                continue;
            }
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                let ordinal: usize = self.sql[start..end]
                    .parse()
                    .map_err(|_| JoblyError::validation("placeholder ordinal overflow"))?;
                if ordinal == 0 || ordinal > n {
                    return Err(JoblyError::validation(format!(
                        "placeholder ${ordinal} has no bound value ({n} bound)"
                    )));
                }
                seen[ordinal - 1] = true;
            }
            i = end;
        }
        match seen.iter().position(|s| !s) {
            Some(missing) => Err(JoblyError::validation(format!(
                "bound value {} has no placeholder",
                missing + 1
            ))),
            None => Ok(()),
        }
    }

    fn trace(&self) {
        let sql = truncate_sql(&self.sql, MAX_LOGGED_SQL);
        tracing::debug!(
            target: "jobly.sql",
            tag = self.tag.unwrap_or("-"),
            param_count = self.params.len(),
            sql = %sql,
        );
    }

    /// Execute and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        self.validate()?;
        self.trace();
        let rows = conn.query(&self.sql, &self.params_ref()).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute and return the first row mapped to `T`; no row is a not-found error.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        self.validate()?;
        self.trace();
        let row = conn.query_one(&self.sql, &self.params_ref()).await?;
        T::from_row(&row)
    }

    /// Execute and return the first row mapped to `T`, if any.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        self.validate()?;
        self.trace();
        let row = conn.query_opt(&self.sql, &self.params_ref()).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute and return the number of affected rows.
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        self.validate()?;
        self.trace();
        conn.execute(&self.sql, &self.params_ref()).await
    }
}

fn truncate_sql(sql: &str, max: usize) -> Cow<'_, str> {
    if sql.len() <= max {
        return Cow::Borrowed(sql);
    }
    let mut end = max;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}...", &sql[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_map::FieldMap;
    use crate::update::{UpdatePayload, sql_for_partial_update_with_offset};

    #[test]
    fn builds_placeholders_in_order() {
        let mut q = Statement::new("SELECT * FROM jobs WHERE a = ");
        q.push_bind(1).push(" AND b = ").push_bind("x");

        assert_eq!(q.sql(), "SELECT * FROM jobs WHERE a = $1 AND b = $2");
        assert_eq!(q.params_ref().len(), 2);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn fragment_at_current_offset_composes() {
        let payload = UpdatePayload::new().set("title", "New");
        let mut q = Statement::new("UPDATE jobs SET ");
        let set = sql_for_partial_update_with_offset(&payload, &FieldMap::EMPTY, q.param_count())
            .unwrap();
        q.push_fragment(set).push(" WHERE id = ").push_bind(7);

        assert_eq!(q.sql(), r#"UPDATE jobs SET "title"=$1 WHERE id = $2"#);
        assert_eq!(q.params(), &[SqlValue::from("New"), SqlValue::from(7)]);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn empty_where_is_skipped() {
        let mut q = Statement::new("SELECT handle FROM companies");
        q.push_where(SqlFragment::empty());
        assert_eq!(q.sql(), "SELECT handle FROM companies");
    }

    #[test]
    fn validate_catches_dangling_placeholder() {
        let q = Statement::new("SELECT * FROM jobs WHERE id = $2");
        assert!(q.validate().unwrap_err().is_validation());
    }

    #[test]
    fn validate_catches_unused_value() {
        let mut q = Statement::new("SELECT * FROM jobs WHERE id = ");
        q.push_bind(1);
        let mut bad = Statement::new("SELECT 1");
        bad.params = q.params.clone();
        assert!(q.validate().is_ok());
        assert!(bad.validate().is_err());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_sql("SELECT 1", 200), "SELECT 1");
        assert_eq!(truncate_sql("SELECT 1", 6), "SELECT...");
        assert_eq!(truncate_sql("ééé", 3), "é...");
    }

    #[test]
    fn tag_is_kept() {
        let q = Statement::new("SELECT 1").tagged("jobs.get");
        assert_eq!(q.tag(), Some("jobs.get"));
    }
}
