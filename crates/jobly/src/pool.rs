//! Connection pool utilities

use crate::client::PoolClient;
use crate::config::DatabaseConfig;
use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a [`DatabaseConfig`].
///
/// Uses `NoTls` and fast recycling, which suits a local database.
///
/// # Example
///
/// ```ignore
/// let pool = jobly::create_pool(&DatabaseConfig::from_env()?)?;
/// let conn = jobly::get_client(&pool).await?;
/// let companies = Company::find_all(&conn, &CompanyFilter::default()).await?;
/// ```
pub fn create_pool(config: &DatabaseConfig) -> JoblyResult<Pool> {
    let pg_config: tokio_postgres::Config = config
        .url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let mgr = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(mgr)
        .max_size(config.max_pool_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))
}

/// Check a connection out of the pool.
pub async fn get_client(pool: &Pool) -> JoblyResult<PoolClient> {
    Ok(PoolClient::new(pool.get().await?))
}
