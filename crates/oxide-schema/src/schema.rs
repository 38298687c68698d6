//! Current structure of an existing table.
//!
//! A [`TableSchema`] is what the caller knows about a table before the
//! blueprint runs: its columns as declared, its primary key, foreign keys
//! and secondary indexes. Grammars that rebuild tables copy it into the
//! new table so the rebuild keeps every key and index.

use serde::{Deserialize, Serialize};

use crate::foreign_key::ForeignKeyAction;

/// Declared definition of an existing column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Declared SQL type, as reported by the database.
    pub sql_type: String,
    /// Whether the column allows NULL values.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Default expression, already in SQL form (`'anon'`, `0`, `CURRENT_TIMESTAMP`).
    #[serde(default)]
    pub default: Option<String>,
    /// Whether this column auto-increments.
    #[serde(default)]
    pub auto_increment: bool,
    /// Collation name.
    #[serde(default)]
    pub collation: Option<String>,
}

const fn default_nullable() -> bool {
    true
}

impl ColumnSchema {
    /// Creates a nullable column without default.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: true,
            default: None,
            auto_increment: false,
            collation: None,
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the default expression.
    #[must_use]
    pub fn default(mut self, expression: impl Into<String>) -> Self {
        self.default = Some(expression.into());
        self
    }

    /// Sets the column to auto-increment.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }
}

/// An existing foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeySchema {
    /// Column(s) in the referencing table.
    pub columns: Vec<String>,
    /// Referenced table name, as stored in the database.
    pub references_table: String,
    /// Referenced column(s).
    pub references_columns: Vec<String>,
    /// Action on delete.
    #[serde(default)]
    pub on_delete: Option<ForeignKeyAction>,
    /// Action on update.
    #[serde(default)]
    pub on_update: Option<ForeignKeyAction>,
}

impl ForeignKeySchema {
    /// Creates a foreign key without referential actions.
    #[must_use]
    pub fn new(
        columns: &[&str],
        references_table: impl Into<String>,
        references_columns: &[&str],
    ) -> Self {
        Self {
            columns: columns.iter().map(ToString::to_string).collect(),
            references_table: references_table.into(),
            references_columns: references_columns.iter().map(ToString::to_string).collect(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets the action on delete.
    #[must_use]
    pub const fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the action on update.
    #[must_use]
    pub const fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// An existing secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSchema {
    /// Index name.
    pub name: String,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// Whether this is a unique index.
    #[serde(default)]
    pub unique: bool,
}

impl IndexSchema {
    /// Creates an index description.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: &[&str], unique: bool) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
            unique,
        }
    }
}

/// Structure of an existing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name, without prefix.
    pub name: String,
    /// Columns, in table order.
    pub columns: Vec<ColumnSchema>,
    /// Primary key column(s).
    #[serde(default)]
    pub primary_key: Vec<String>,
    /// Foreign keys.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeySchema>,
    /// Secondary indexes, excluding those backing the primary key.
    #[serde(default)]
    pub indexes: Vec<IndexSchema>,
}

impl TableSchema {
    /// Creates a table without columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Adds a column. An auto-incrementing column becomes the primary key.
    #[must_use]
    pub fn column(mut self, column: ColumnSchema) -> Self {
        if column.auto_increment {
            self.primary_key = vec![column.name.clone()];
        }
        self.columns.push(column);
        self
    }

    /// Sets the primary key columns.
    #[must_use]
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(ToString::to_string).collect();
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: ForeignKeySchema) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Adds a secondary index.
    #[must_use]
    pub fn index(mut self, index: IndexSchema) -> Self {
        self.indexes.push(index);
        self
    }

    /// Column names, in table order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| column.name == name)
    }
}
