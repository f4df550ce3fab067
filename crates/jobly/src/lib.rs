//! # jobly
//!
//! Data layer for a companies/jobs API on PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: turn a sparse payload into a parameterized `SET` fragment
//! - **List filters**: turn optional criteria into a parameterized `WHERE` fragment
//! - **Composable placeholders**: fragments start numbering at any offset, so the
//!   caller appends its own binds (`WHERE id = $n`) after them
//! - **Transaction-friendly**: models accept anything implementing `GenericClient`
//!
//! ## Fragments
//!
//! ```ignore
//! use jobly::{FieldMap, UpdatePayload, sql_for_partial_update};
//!
//! static FIELDS: FieldMap = FieldMap::new(&[("firstName", "first_name")]);
//!
//! let payload = UpdatePayload::new().set("firstName", "Aliya").set("age", 32);
//! let set = sql_for_partial_update(&payload, &FIELDS)?;
//! assert_eq!(set.clause, r#""first_name"=$1, "age"=$2"#);
//! ```
//!
//! ## Models
//!
//! ```ignore
//! use jobly::models::{Company, CompanyFilter};
//!
//! let pool = jobly::create_pool(&jobly::DatabaseConfig::from_env()?)?;
//! let conn = jobly::get_client(&pool).await?;
//! let filter = CompanyFilter::from_query_pairs([("minEmployees", "10")])?;
//! let companies = Company::find_all(&conn, &filter).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod field_map;
pub mod filter;
pub mod fragment;
pub mod ident;
pub mod models;
pub mod row;
pub mod statement;
pub mod update;
pub mod value;

pub use client::GenericClient;
pub use config::DatabaseConfig;
pub use error::{JoblyError, JoblyResult};
pub use field_map::FieldMap;
pub use filter::{
    FilterCriteria, WhereBuilder, parse_bound, parse_range, sql_for_filters,
    sql_for_filters_with_offset,
};
pub use fragment::SqlFragment;
pub use ident::quote_identifier;
pub use row::{FromRow, RowExt};
pub use statement::Statement;
pub use update::{UpdatePayload, sql_for_partial_update, sql_for_partial_update_with_offset};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use client::PoolClient;

#[cfg(feature = "pool")]
pub use pool::{create_pool, get_client};
