//! Resource models.
//!
//! Each model owns the full SQL text for its table and maps rows back to API-facing
//! field names. Every operation first assembles a [`Statement`](crate::Statement)
//! (exposed as a `*_statement` function) and then runs it on the caller's client.

pub mod company;
pub mod job;

pub use company::{COMPANY_FIELDS, Company, CompanyDetail, CompanyFilter, CompanyJob, NewCompany};
pub use job::{JOB_FIELDS, Job, JobFilter, NewJob};

/// Schema the models expect, for test setup and local bootstrapping.
pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");
