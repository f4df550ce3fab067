//! Database configuration from the environment.
//!
//! | Variable          | Meaning                                   | Default                  |
//! |-------------------|-------------------------------------------|--------------------------|
//! | `JOBLY_ENV`       | `test` selects the test database          | unset                    |
//! | `DATABASE_URL`    | connection string (ignored in test mode)  | `postgresql:///jobly`    |
//! | `JOBLY_POOL_SIZE` | max pooled connections                    | `16`                     |

use crate::error::{JoblyError, JoblyResult};

/// Connection string used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "postgresql:///jobly";

/// Connection string used when `JOBLY_ENV=test`.
pub const TEST_DATABASE_URL: &str = "postgresql:///jobly_test";

/// Default maximum pool size.
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Connection settings for the jobly database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string.
    pub url: String,
    /// Maximum number of pooled connections.
    pub max_pool_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl DatabaseConfig {
    /// Create a configuration for `url` with the default pool size.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the maximum pool size.
    pub fn max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    /// Read the configuration from process environment variables.
    pub fn from_env() -> JoblyResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load `.env` (if present) into the environment, then read it.
    pub fn from_env_file() -> JoblyResult<Self> {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            return Err(JoblyError::Config(format!("failed to load .env: {err}")));
        }
        Self::from_env()
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let url = if lookup("JOBLY_ENV").as_deref() == Some("test") {
            TEST_DATABASE_URL.to_string()
        } else {
            lookup("DATABASE_URL")
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
        };

        let max_pool_size = match lookup("JOBLY_POOL_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(JoblyError::Config(format!(
                        "JOBLY_POOL_SIZE must be a positive integer, got {raw:?}"
                    )));
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self { url, max_pool_size })
    }
}
