//! Companies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::field_map::FieldMap;
use crate::filter::{FilterCriteria, WhereBuilder, parse_range, sql_for_filters};
use crate::row::{FromRow, RowExt};
use crate::statement::Statement;
use crate::update::{UpdatePayload, sql_for_partial_update};

/// API field → `companies` column.
pub static COMPANY_FIELDS: FieldMap = FieldMap::new(&[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
]);

/// Fields a partial update may touch. The handle is the key and never changes.
const UPDATABLE: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

/// Unique constraint on `companies.name`.
const NAME_KEY: &str = "companies_name_key";

const RETURNING: &str = r#" RETURNING handle, name, description, num_employees AS "numEmployees", logo_url AS "logoUrl""#;

const SELECT: &str = r#"SELECT handle, name, description, num_employees AS "numEmployees", logo_url AS "logoUrl" FROM companies"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("numEmployees")?,
            logo_url: row.try_get_column("logoUrl")?,
        })
    }
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for CompanyJob {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

/// A company together with its jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

/// Input for [`Company::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// List filters for companies.
///
/// Bounds are kept as received and parsed when the WHERE fragment is built, so a
/// malformed bound surfaces as a validation error naming it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub name: Option<String>,
    pub min_employees: Option<String>,
    pub max_employees: Option<String>,
}

impl CompanyFilter {
    /// Case-insensitive substring of the company name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn min_employees(mut self, min: impl ToString) -> Self {
        self.min_employees = Some(min.to_string());
        self
    }

    pub fn max_employees(mut self, max: impl ToString) -> Self {
        self.max_employees = Some(max.to_string());
        self
    }
}

impl FilterCriteria for CompanyFilter {
    fn set_param(&mut self, key: &str, value: &str) -> JoblyResult<()> {
        let slot = match key {
            "name" => &mut self.name,
            "minEmployees" => &mut self.min_employees,
            "maxEmployees" => &mut self.max_employees,
            _ => return Err(JoblyError::validation(format!("Unknown filter: {key}"))),
        };
        *slot = Some(value.to_string());
        Ok(())
    }

    fn apply(&self, w: &mut WhereBuilder) -> JoblyResult<()> {
        let (min, max) = parse_range(
            ("minEmployees", self.min_employees.as_deref()),
            ("maxEmployees", self.max_employees.as_deref()),
        )?;

        w.and_contains_opt("name", self.name.as_deref());
        w.and_gte_opt("num_employees", min);
        w.and_lte_opt("num_employees", max);
        Ok(())
    }
}

impl Company {
    pub fn create_statement(data: &NewCompany) -> Statement {
        let mut q = Statement::new(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) VALUES (",
        )
        .tagged("companies.create");
        q.push_bind(data.handle.as_str())
            .push(", ")
            .push_bind(data.name.as_str())
            .push(", ")
            .push_bind(data.description.as_str())
            .push(", ")
            .push_bind(data.num_employees)
            .push(", ")
            .push_bind(data.logo_url.clone())
            .push(")")
            .push(RETURNING);
        q
    }

    pub fn find_all_statement(filter: &CompanyFilter) -> JoblyResult<Statement> {
        let mut q = Statement::new(SELECT).tagged("companies.find_all");
        q.push_where(sql_for_filters(filter)?).push(" ORDER BY name");
        Ok(q)
    }

    pub fn get_statement(handle: &str) -> Statement {
        let mut q = Statement::new(SELECT).tagged("companies.get");
        q.push(" WHERE handle = ").push_bind(handle);
        q
    }

    pub fn jobs_statement(handle: &str) -> Statement {
        let mut q = Statement::new("SELECT id, title, salary, equity FROM jobs WHERE company_handle = ")
            .tagged("companies.jobs");
        q.push_bind(handle).push(" ORDER BY id");
        q
    }

    /// Checks `payload` against the updatable fields before building the SET clause.
    pub fn update_statement(handle: &str, payload: &UpdatePayload) -> JoblyResult<Statement> {
        payload.ensure_fields(UPDATABLE)?;
        let set = sql_for_partial_update(payload, &COMPANY_FIELDS)?;

        let mut q = Statement::new("UPDATE companies SET ").tagged("companies.update");
        q.push_fragment(set)
            .push(" WHERE handle = ")
            .push_bind(handle)
            .push(RETURNING);
        Ok(q)
    }

    pub fn remove_statement(handle: &str) -> Statement {
        let mut q = Statement::new("DELETE FROM companies WHERE handle = ").tagged("companies.remove");
        q.push_bind(handle);
        q
    }

    /// Create a company. A taken handle or name is a validation error.
    pub async fn create(conn: &impl GenericClient, data: &NewCompany) -> JoblyResult<Company> {
        Self::create_statement(data)
            .fetch_one_as(conn)
            .await
            .map_err(|err| duplicate_company(err, data))
    }

    /// List companies matching `filter`, ordered by name.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &CompanyFilter,
    ) -> JoblyResult<Vec<Company>> {
        Self::find_all_statement(filter)?.fetch_all_as(conn).await
    }

    /// Fetch one company with its jobs.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
        let company: Company = Self::get_statement(handle)
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        let jobs = Self::jobs_statement(handle).fetch_all_as(conn).await?;
        Ok(CompanyDetail { company, jobs })
    }

    /// Partially update a company; only the fields in `payload` change.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        payload: &UpdatePayload,
    ) -> JoblyResult<Company> {
        Self::update_statement(handle, payload)?
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))
    }

    /// Delete a company (its jobs cascade).
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        match Self::remove_statement(handle).execute(conn).await? {
            0 => Err(JoblyError::not_found(format!("No company: {handle}"))),
            _ => Ok(()),
        }
    }
}

/// Name the key a unique violation on insert collided with.
fn duplicate_company(err: JoblyError, data: &NewCompany) -> JoblyError {
    match err {
        JoblyError::UniqueViolation(detail) if detail.starts_with(NAME_KEY) => {
            JoblyError::validation(format!("Duplicate company name: {}", data.name))
        }
        JoblyError::UniqueViolation(_) => {
            JoblyError::validation(format!("Duplicate company: {}", data.handle))
        }
        other => other,
    }
}
