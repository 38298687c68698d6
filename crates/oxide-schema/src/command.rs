//! Structural commands recorded on a blueprint.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foreign_key::ForeignKeyDefinition;

/// Index flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    /// Primary key.
    Primary,
    /// Unique index.
    Unique,
    /// Plain index.
    Index,
    /// Fulltext index.
    Fulltext,
    /// Spatial index.
    Spatial,
}

impl IndexKind {
    /// All kinds, in the order column flags are inspected.
    pub const ALL: [Self; 5] = [
        Self::Primary,
        Self::Unique,
        Self::Index,
        Self::Fulltext,
        Self::Spatial,
    ];

    /// Column attribute holding the fluent flag for this kind.
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Unique => "unique",
            Self::Index => "index",
            Self::Fulltext => "fulltext",
            Self::Spatial => "spatial_index",
        }
    }

    /// Suffix used in generated index names.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Unique => "unique",
            Self::Index => "index",
            Self::Fulltext => "fulltext",
            Self::Spatial => "spatialindex",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary key",
            Self::Unique => "unique index",
            Self::Index => "index",
            Self::Fulltext => "fulltext index",
            Self::Spatial => "spatial index",
        })
    }
}

/// An index to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index flavour.
    pub kind: IndexKind,
    /// Index name.
    pub index: String,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// Index method (`btree`, `hash`, `gin`, ...).
    pub algorithm: Option<String>,
    /// Text search language for fulltext indexes.
    pub language: Option<String>,
    /// Deferrable unique constraint (PostgreSQL).
    pub deferrable: Option<bool>,
    /// Initially immediate unique constraint (PostgreSQL).
    pub initially_immediate: Option<bool>,
}

impl IndexDefinition {
    /// Creates an index definition.
    #[must_use]
    pub fn new(kind: IndexKind, index: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            kind,
            index: index.into(),
            columns,
            algorithm: None,
            language: None,
            deferrable: None,
            initially_immediate: None,
        }
    }

    /// Overrides the index name.
    pub fn name(&mut self, index: impl Into<String>) -> &mut Self {
        self.index = index.into();
        self
    }

    /// Sets the index method.
    pub fn algorithm(&mut self, algorithm: impl Into<String>) -> &mut Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    /// Sets the fulltext language.
    pub fn language(&mut self, language: impl Into<String>) -> &mut Self {
        self.language = Some(language.into());
        self
    }

    /// Makes a unique constraint deferrable.
    pub fn deferrable(&mut self, value: bool) -> &mut Self {
        self.deferrable = Some(value);
        self
    }

    /// Sets whether a deferrable constraint is checked immediately.
    pub fn initially_immediate(&mut self, value: bool) -> &mut Self {
        self.initially_immediate = Some(value);
        self
    }
}

/// Column-level modifiers compiled as trailing statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FluentCommand {
    /// Restart the auto-increment sequence at a given value.
    AutoIncrementStartingValue,
    /// Column comment.
    Comment,
}

/// A structural command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Create the table with the blueprint columns.
    Create,
    /// Add the blueprint's new columns.
    Add,
    /// Modify the blueprint's changed columns.
    Change,
    /// Drop the table.
    Drop,
    /// Drop the table if it exists.
    DropIfExists,
    /// Rename the table.
    Rename {
        /// New table name.
        to: String,
    },
    /// Drop columns.
    DropColumn {
        /// Columns to drop.
        columns: Vec<String>,
    },
    /// Rename a column.
    RenameColumn {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Create an index.
    Index(IndexDefinition),
    /// Drop an index.
    DropIndex {
        /// Kind of the index being dropped.
        kind: IndexKind,
        /// Index name.
        index: String,
    },
    /// Rename an index.
    RenameIndex {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Add a foreign key.
    Foreign(ForeignKeyDefinition),
    /// Drop a foreign key.
    DropForeign {
        /// Constraint name.
        index: String,
    },
    /// Set the table comment.
    TableComment {
        /// Comment text.
        comment: String,
    },
    /// Set a column comment; `None` clears it.
    ColumnComment {
        /// Column name.
        column: String,
        /// Comment text.
        comment: Option<String>,
    },
    /// Restart a column's auto-increment sequence.
    AutoIncrementStartingValue {
        /// Column name.
        column: String,
        /// First value.
        value: i64,
    },
}

impl Command {
    /// Command name used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Add => "add",
            Self::Change => "change",
            Self::Drop => "drop",
            Self::DropIfExists => "dropIfExists",
            Self::Rename { .. } => "rename",
            Self::DropColumn { .. } => "dropColumn",
            Self::RenameColumn { .. } => "renameColumn",
            Self::Index(def) => match def.kind {
                IndexKind::Primary => "primary",
                IndexKind::Unique => "unique",
                IndexKind::Index => "index",
                IndexKind::Fulltext => "fulltext",
                IndexKind::Spatial => "spatialIndex",
            },
            Self::DropIndex { kind, .. } => match kind {
                IndexKind::Primary => "dropPrimary",
                IndexKind::Unique => "dropUnique",
                IndexKind::Index => "dropIndex",
                IndexKind::Fulltext => "dropFulltext",
                IndexKind::Spatial => "dropSpatialIndex",
            },
            Self::RenameIndex { .. } => "renameIndex",
            Self::Foreign(_) => "foreign",
            Self::DropForeign { .. } => "dropForeign",
            Self::TableComment { .. } => "tableComment",
            Self::ColumnComment { .. } => "comment",
            Self::AutoIncrementStartingValue { .. } => "autoIncrementStartingValues",
        }
    }

    /// Index payload, if this command creates an index.
    #[must_use]
    pub const fn as_index(&self) -> Option<&IndexDefinition> {
        match self {
            Self::Index(def) => Some(def),
            _ => None,
        }
    }

    /// Foreign key payload, if this command adds a foreign key.
    #[must_use]
    pub const fn as_foreign(&self) -> Option<&ForeignKeyDefinition> {
        match self {
            Self::Foreign(def) => Some(def),
            _ => None,
        }
    }
}
