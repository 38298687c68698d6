//! Connection capabilities consumed at compile time.
//!
//! The compiler never talks to a database. Whatever it needs to know about
//! the target (table prefix, table option fallbacks, engine version, the
//! current columns and structure of a table) is asked through [`Connection`].

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grammar::Dialect;
use crate::schema::TableSchema;

/// Capabilities a grammar may query while compiling.
pub trait Connection {
    /// Dialect of the connection.
    fn dialect(&self) -> Dialect;

    /// Configuration value for `key` (`charset`, `collation`, `engine`, ...).
    fn config(&self, key: &str) -> Option<&str>;

    /// Prefix applied to every table name.
    fn table_prefix(&self) -> &str {
        ""
    }

    /// Engine version string as reported by the server.
    fn server_version(&self) -> Option<&str> {
        None
    }

    /// Current columns of `table`, in table order, if known.
    fn column_listing(&self, table: &str) -> Option<Vec<String>> {
        self.table_schema(table).map(|schema| schema.column_names())
    }

    /// Current structure of `table`, if known.
    fn table_schema(&self, _table: &str) -> Option<TableSchema> {
        None
    }
}

/// Plain configuration implementing [`Connection`].
///
/// ```rust
/// use oxide_schema::{Connection, ConnectionConfig, Dialect};
///
/// let config = ConnectionConfig::new(Dialect::MySql).with_charset("utf8mb4");
/// assert_eq!(config.config("charset"), Some("utf8mb4"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Driver name.
    pub driver: Dialect,
    /// Table prefix.
    #[serde(default)]
    pub prefix: String,
    /// Default character set.
    #[serde(default)]
    pub charset: Option<String>,
    /// Default collation.
    #[serde(default)]
    pub collation: Option<String>,
    /// Default storage engine.
    #[serde(default)]
    pub engine: Option<String>,
    /// Engine version.
    #[serde(default)]
    pub server_version: Option<String>,
    /// Known column listings, keyed by unprefixed table name.
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<String>>,
    /// Known table structures, keyed by unprefixed table name.
    #[serde(default)]
    pub schemas: BTreeMap<String, TableSchema>,
}

impl ConnectionConfig {
    /// Creates an empty configuration for a dialect.
    #[must_use]
    pub const fn new(driver: Dialect) -> Self {
        Self {
            driver,
            prefix: String::new(),
            charset: None,
            collation: None,
            engine: None,
            server_version: None,
            tables: BTreeMap::new(),
            schemas: BTreeMap::new(),
        }
    }

    /// Sets the table prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the default character set.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the default collation.
    #[must_use]
    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the default engine.
    #[must_use]
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Sets the engine version.
    #[must_use]
    pub fn with_server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = Some(version.into());
        self
    }

    /// Records the current columns of a table.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>, columns: &[&str]) -> Self {
        self.tables.insert(
            table.into(),
            columns.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Records the current structure of a table.
    #[must_use]
    pub fn with_schema(mut self, schema: TableSchema) -> Self {
        self.schemas.insert(schema.name.clone(), schema);
        self
    }
}

impl Connection for ConnectionConfig {
    fn dialect(&self) -> Dialect {
        self.driver
    }

    fn config(&self, key: &str) -> Option<&str> {
        match key {
            "charset" => self.charset.as_deref(),
            "collation" => self.collation.as_deref(),
            "engine" => self.engine.as_deref(),
            "prefix" => Some(self.prefix.as_str()),
            _ => None,
        }
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    fn column_listing(&self, table: &str) -> Option<Vec<String>> {
        match self.tables.get(table) {
            Some(columns) => Some(columns.clone()),
            None => self.table_schema(table).map(|schema| schema.column_names()),
        }
    }

    fn table_schema(&self, table: &str) -> Option<TableSchema> {
        self.schemas.get(table).cloned()
    }
}

/// A `major.minor.patch` engine version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerVersion {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component.
    pub patch: u32,
}

impl ServerVersion {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses the leading numeric components of a version string.
    ///
    /// Trailing build tags (`8.0.32-log`, `3.45.1 2024-01-30`) are ignored and
    /// missing components count as zero. Returns `None` when the string does
    /// not start with a number.
    #[must_use]
    pub fn parse(version: &str) -> Option<Self> {
        let numeric: &str = version
            .trim()
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()?;
        let mut parts = numeric.split('.').map(str::parse::<u32>);
        let major = parts.next()?.ok()?;
        let minor = parts.next().and_then(Result::ok).unwrap_or(0);
        let patch = parts.next().and_then(Result::ok).unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }

    /// Whether this version is at least `other`.
    #[must_use]
    pub fn at_least(&self, other: Self) -> bool {
        self.cmp(&other) != Ordering::Less
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
