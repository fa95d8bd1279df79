//! Backend dialects
//!
//! A dialect says how to reach a backend and how to phrase the handful of
//! DDL fragments that differ between engines. Everything else (DML, upserts,
//! `RETURNING`, `$N` placeholders) is written once and accepted by both.

use std::fmt;
use std::path::PathBuf;

/// Driver identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    Sqlite,
    Postgres,
}

impl Driver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Sqlite => "sqlite3",
            Driver::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract every backend adapter implements.
///
/// Schema statements are templated with [`primary_key_clause`](Dialect::primary_key_clause),
/// [`timestamp_clause`](Dialect::timestamp_clause) and
/// [`foreign_key_type`](Dialect::foreign_key_type), so the same logical schema
/// compiles on any adapter.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Which driver the store should open
    fn driver(&self) -> Driver;

    /// File path for an embedded engine, connection URL for a networked one
    fn connection_target(&self) -> String;

    /// Column definition of an auto-incrementing 64-bit primary key
    fn primary_key_clause(&self) -> &'static str;

    /// Column type of a UTC timestamp
    fn timestamp_clause(&self) -> &'static str;

    /// Column type of a column referencing a primary key
    fn foreign_key_type(&self) -> &'static str;
}

/// Embedded SQLite database stored in a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sqlite {
    path: PathBuf,
}

impl Sqlite {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Dialect for Sqlite {
    fn driver(&self) -> Driver {
        Driver::Sqlite
    }

    fn connection_target(&self) -> String {
        self.path.display().to_string()
    }

    // SQLite only aliases ROWID when the type is spelled exactly INTEGER
    fn primary_key_clause(&self) -> &'static str {
        "INTEGER PRIMARY KEY AUTOINCREMENT"
    }

    fn timestamp_clause(&self) -> &'static str {
        "DATETIME"
    }

    fn foreign_key_type(&self) -> &'static str {
        "INTEGER"
    }
}

/// Networked PostgreSQL database
#[derive(Clone, PartialEq, Eq)]
pub struct Postgres {
    url: String,
}

impl Postgres {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

// Connection URLs commonly carry credentials
impl fmt::Debug for Postgres {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = match self.url.split_once('@') {
            Some((_, host)) => format!("postgres://***@{host}"),
            None => self.url.clone(),
        };
        f.debug_struct("Postgres").field("url", &redacted).finish()
    }
}

impl Dialect for Postgres {
    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    fn connection_target(&self) -> String {
        self.url.clone()
    }

    fn primary_key_clause(&self) -> &'static str {
        "BIGSERIAL PRIMARY KEY"
    }

    fn timestamp_clause(&self) -> &'static str {
        "TIMESTAMPTZ"
    }

    fn foreign_key_type(&self) -> &'static str {
        "BIGINT"
    }
}
