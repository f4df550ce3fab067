//! Jobs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::field_map::FieldMap;
use crate::filter::{FilterCriteria, WhereBuilder, parse_bound, sql_for_filters};
use crate::row::{FromRow, RowExt};
use crate::statement::Statement;
use crate::update::{UpdatePayload, sql_for_partial_update};
use crate::value::SqlValue;

/// API field → `jobs` column. Updatable job fields share their column names.
pub static JOB_FIELDS: FieldMap = FieldMap::EMPTY;

const UPDATABLE: &[&str] = &["title", "salary", "equity"];

const COLUMNS: &str = r#"id, title, salary, equity, company_handle AS "companyHandle""#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("companyHandle")?,
        })
    }
}

/// Input for [`Job::create`].
///
/// `equity` arrives as a decimal string; the empty string means "no equity".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<String>,
    pub company_handle: String,
}

/// List filters for jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    pub title: Option<String>,
    pub min_salary: Option<String>,
    #[serde(default)]
    pub has_equity: bool,
}

impl JobFilter {
    /// Case-insensitive substring of the job title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn min_salary(mut self, min: impl ToString) -> Self {
        self.min_salary = Some(min.to_string());
        self
    }

    /// Only jobs with non-zero equity.
    pub fn has_equity(mut self, has_equity: bool) -> Self {
        self.has_equity = has_equity;
        self
    }
}

impl FilterCriteria for JobFilter {
    fn set_param(&mut self, key: &str, value: &str) -> JoblyResult<()> {
        match key {
            "title" => self.title = Some(value.to_string()),
            "minSalary" => self.min_salary = Some(value.to_string()),
            "hasEquity" => self.has_equity = value == "true",
            _ => return Err(JoblyError::validation(format!("Unknown filter: {key}"))),
        }
        Ok(())
    }

    fn apply(&self, w: &mut WhereBuilder) -> JoblyResult<()> {
        let min_salary = self
            .min_salary
            .as_deref()
            .map(|raw| parse_bound("minSalary", raw))
            .transpose()?;

        w.and_contains_opt("title", self.title.as_deref());
        w.and_gte_opt("salary", min_salary);
        if self.has_equity {
            w.and_positive("equity");
        }
        Ok(())
    }
}

/// Empty equity means "none".
fn equity_value(raw: Option<&str>) -> SqlValue {
    match raw {
        None | Some("") => SqlValue::Null,
        Some(s) => SqlValue::from(s),
    }
}

impl Job {
    pub fn create_statement(data: &NewJob) -> Statement {
        let mut q = Statement::new(
            "INSERT INTO jobs (title, salary, equity, company_handle) VALUES (",
        )
        .tagged("jobs.create");
        q.push_bind(data.title.as_str())
            .push(", ")
            .push_bind(data.salary)
            .push(", ")
            .push_bind(equity_value(data.equity.as_deref()))
            .push(", ")
            .push_bind(data.company_handle.as_str())
            .push(") RETURNING ")
            .push(COLUMNS);
        q
    }

    pub fn find_all_statement(filter: &JobFilter) -> JoblyResult<Statement> {
        let mut q = Statement::new(format!("SELECT {COLUMNS} FROM jobs")).tagged("jobs.find_all");
        q.push_where(sql_for_filters(filter)?)
            .push(" ORDER BY title, id");
        Ok(q)
    }

    pub fn get_statement(id: i32) -> Statement {
        let mut q = Statement::new(format!("SELECT {COLUMNS} FROM jobs WHERE id = ")).tagged("jobs.get");
        q.push_bind(id);
        q
    }

    /// `companyHandle` is dropped from `payload` (a job never moves between
    /// companies) and an empty `equity` is stored as NULL.
    pub fn update_statement(id: i32, payload: &UpdatePayload) -> JoblyResult<Statement> {
        let mut payload = payload.clone();
        payload.remove("companyHandle");
        if payload.get("equity").and_then(SqlValue::as_str) == Some("") {
            payload.insert("equity", SqlValue::Null);
        }
        payload.ensure_fields(UPDATABLE)?;
        let set = sql_for_partial_update(&payload, &JOB_FIELDS)?;

        let mut q = Statement::new("UPDATE jobs SET ").tagged("jobs.update");
        q.push_fragment(set)
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(COLUMNS);
        Ok(q)
    }

    pub fn remove_statement(id: i32) -> Statement {
        let mut q = Statement::new("DELETE FROM jobs WHERE id = ").tagged("jobs.remove");
        q.push_bind(id);
        q
    }

    /// Create a job for an existing company.
    pub async fn create(conn: &impl GenericClient, data: &NewJob) -> JoblyResult<Job> {
        Self::create_statement(data)
            .fetch_one_as(conn)
            .await
            .map_err(|err| match err {
                JoblyError::ForeignKeyViolation(_) => {
                    JoblyError::not_found(format!("No company: {}", data.company_handle))
                }
                other => other,
            })
    }

    /// List jobs matching `filter`, ordered by title.
    pub async fn find_all(conn: &impl GenericClient, filter: &JobFilter) -> JoblyResult<Vec<Job>> {
        Self::find_all_statement(filter)?.fetch_all_as(conn).await
    }

    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        Self::get_statement(id)
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))
    }

    /// Partially update a job; only the fields in `payload` change.
    pub async fn update(
        conn: &impl GenericClient,
        id: i32,
        payload: &UpdatePayload,
    ) -> JoblyResult<Job> {
        Self::update_statement(id, payload)?
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))
    }

    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        match Self::remove_statement(id).execute(conn).await? {
            0 => Err(JoblyError::not_found(format!("No job: {id}"))),
            _ => Ok(()),
        }
    }
}
