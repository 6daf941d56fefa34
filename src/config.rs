//! Process configuration.
//!
//! The only required setting is `AGAMA_DATABASE_URI`, an SQLAlchemy-style
//! database URL naming either an SQLite file or a MySQL server. The listen address is a CLI concern
//! and lives in the binary.

use std::path::PathBuf;
use thiserror::Error;

/// Environment variable holding the database connection string.
pub const DATABASE_URI_VAR: &str = "AGAMA_DATABASE_URI";

/// Configuration errors. Any of these stops the process before it serves.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "ERROR: Environment variable {var} is not set.

{var} uses the SQLAlchemy URL format.

For SQLite3 use

  {var}=sqlite:////path/to/db.sqlite3  # yes, 4 slashes

or, for a throwaway in-memory database,

  {var}=sqlite://

For MySQL use

  {var}=mysql://<username>:<password>@<server-address>/<db-name>

For other examples see https://docs.sqlalchemy.org/en/13/core/engines.html#database-urls.",
        var = DATABASE_URI_VAR
    )]
    MissingDatabaseUri,

    #[error(
        "ERROR: {var} uses unsupported scheme '{0}'; only sqlite and mysql URLs are supported.",
        var = DATABASE_URI_VAR
    )]
    UnsupportedScheme(String),
}

/// Where the item database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A private in-memory database, gone when the process exits.
    Memory,
    /// A database file, created if missing.
    File(PathBuf),
    /// A MySQL server, as a `mysql://` URL with any driver suffix removed.
    MySql(String),
}

impl DatabaseLocation {
    /// Parse a connection string.
    ///
    /// Accepted forms:
    /// - `sqlite:////abs/path` → `/abs/path`
    /// - `sqlite:///rel/path` → `rel/path`
    /// - `sqlite:path` → `path`
    /// - `sqlite://`, `sqlite::memory:` → in-memory
    /// - `mysql://user:pw@host/db`, `mysql+pymysql://…` → MySQL
    pub fn parse(uri: &str) -> Result<Self, ConfigError> {
        let uri = uri.trim();
        let (scheme, rest) = uri.split_once(':').unwrap_or((uri, ""));

        // SQLAlchemy puts the driver after a '+'; only the dialect matters here.
        match scheme.split('+').next().unwrap_or(scheme) {
            "sqlite" => Ok(Self::parse_sqlite(rest)),
            "mysql" if rest.starts_with("//") => {
                Ok(DatabaseLocation::MySql(format!("mysql:{rest}")))
            }
            _ => Err(ConfigError::UnsupportedScheme(scheme.to_string())),
        }
    }

    fn parse_sqlite(rest: &str) -> Self {
        let path = if let Some(rest) = rest.strip_prefix("///") {
            rest
        } else if let Some(rest) = rest.strip_prefix("//") {
            rest
        } else {
            rest
        };

        if path.is_empty() || path == ":memory:" {
            DatabaseLocation::Memory
        } else {
            DatabaseLocation::File(PathBuf::from(path))
        }
    }
}

/// Settings read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseLocation,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup function.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let uri = lookup(DATABASE_URI_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUri)?;

        Ok(Self {
            database: DatabaseLocation::parse(&uri)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_path() {
        let location = DatabaseLocation::parse("sqlite:////var/lib/agama/db.sqlite3").unwrap();
        assert_eq!(
            location,
            DatabaseLocation::File(PathBuf::from("/var/lib/agama/db.sqlite3"))
        );
    }

    #[test]
    fn test_parse_relative_path() {
        let location = DatabaseLocation::parse("sqlite:///agama.sqlite3").unwrap();
        assert_eq!(location, DatabaseLocation::File(PathBuf::from("agama.sqlite3")));

        let location = DatabaseLocation::parse("sqlite:agama.sqlite3").unwrap();
        assert_eq!(location, DatabaseLocation::File(PathBuf::from("agama.sqlite3")));
    }

    #[test]
    fn test_parse_memory() {
        assert_eq!(
            DatabaseLocation::parse("sqlite://").unwrap(),
            DatabaseLocation::Memory
        );
        assert_eq!(
            DatabaseLocation::parse("sqlite::memory:").unwrap(),
            DatabaseLocation::Memory
        );
    }

    #[test]
    fn test_parse_unsupported_scheme() {
        assert_eq!(
            DatabaseLocation::parse("mysql://user:pw@db/agama").unwrap(),
            DatabaseLocation::MySql("mysql://user:pw@db/agama".to_string())
        );
        assert_eq!(
            DatabaseLocation::parse("mysql+pymysql://user:pw@db:3306/agama").unwrap(),
            DatabaseLocation::MySql("mysql://user:pw@db:3306/agama".to_string())
        );

        let err = DatabaseLocation::parse("postgresql://user:pw@db/agama").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(ref s) if s == "postgresql"));

        let err = DatabaseLocation::parse("mysql:agama").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(ref s) if s == "mysql"));

        let err = DatabaseLocation::parse("/var/lib/agama.db").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(_)));
    }

    #[test]
    fn test_missing_uri_help_lists_backends() {
        let help = ConfigError::MissingDatabaseUri.to_string();
        assert!(help.contains("AGAMA_DATABASE_URI=sqlite:////path/to/db.sqlite3"));
        assert!(help.contains(
            "AGAMA_DATABASE_URI=mysql://<username>:<password>@<server-address>/<db-name>"
        ));
        assert!(help.contains("https://docs.sqlalchemy.org/en/13/core/engines.html#database-urls"));
    }

    #[test]
    fn test_missing_uri() {
        let err = Config::from_vars(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDatabaseUri));
        assert!(err.to_string().contains("AGAMA_DATABASE_URI is not set"));

        let err = Config::from_vars(|_| Some("  ".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDatabaseUri));
    }

    #[test]
    fn test_from_vars() {
        let config = Config::from_vars(|name| {
            (name == DATABASE_URI_VAR).then(|| "sqlite:////tmp/agama.sqlite3".to_string())
        })
        .unwrap();
        assert_eq!(
            config.database,
            DatabaseLocation::File(PathBuf::from("/tmp/agama.sqlite3"))
        );
    }
}
