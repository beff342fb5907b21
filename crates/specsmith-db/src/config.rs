//! Connection configuration.

use std::env;

/// Where to find PostgreSQL.
///
/// The URL comes from `SPECSMITH_DATABASE_URL`, or a localhost default
/// when unset.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
}

impl DbConfig {
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/specsmith";

    /// Read the connection URL from the environment, defaulting to
    /// [`Self::DEFAULT_URL`].
    pub fn from_env() -> Self {
        Self::new(env::var("SPECSMITH_DATABASE_URL").unwrap_or_else(|_| Self::DEFAULT_URL.into()))
    }

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// The database name, i.e. the last path segment of the URL. `None`
    /// when the URL has no non-empty path.
    pub fn database_name(&self) -> Option<&str> {
        self.database_url
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
    }

    /// The same server with the path swapped for `postgres`, for issuing
    /// `CREATE DATABASE` before the target database exists.
    pub fn maintenance_url(&self) -> String {
        match self.database_url.rfind('/') {
            Some(pos) => format!("{}/postgres", &self.database_url[..pos]),
            None => self.database_url.clone(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_name_is_last_path_segment() {
        let cfg = DbConfig::new("postgresql://localhost:5432/specsmith");
        assert_eq!(cfg.database_name(), Some("specsmith"));

        let cfg = DbConfig::new("postgresql://user:pw@db.internal:5433/briefs");
        assert_eq!(cfg.database_name(), Some("briefs"));
    }

    #[test]
    fn database_name_requires_a_path() {
        let cfg = DbConfig::new("postgresql://localhost:5432/");
        assert_eq!(cfg.database_name(), None);
    }

    #[test]
    fn maintenance_url_targets_postgres_database() {
        let cfg = DbConfig::new("postgresql://localhost:5432/specsmith");
        assert_eq!(
            cfg.maintenance_url(),
            "postgresql://localhost:5432/postgres"
        );
    }

    #[test]
    fn maintenance_url_passes_through_unparseable_input() {
        let cfg = DbConfig::new("not-a-url");
        assert_eq!(cfg.maintenance_url(), "not-a-url");
    }
}
