//! Error types for schema compilation.

use crate::grammar::Dialect;

/// Errors raised while building or compiling a blueprint.
///
/// All of them are caller or configuration errors: they are raised
/// synchronously and the failed command must not be retried as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The command or modifier has no meaning in the active dialect.
    #[error("The {dialect} grammar does not support {feature}")]
    UnsupportedFeature {
        /// Dialect that rejected the request.
        dialect: Dialect,
        /// Human readable description of the rejected feature.
        feature: String,
    },

    /// The column kind has no type mapping in the active dialect.
    #[error("The {dialect} grammar has no column type for '{kind}' (column '{column}')")]
    UnsupportedColumnType {
        /// Dialect that rejected the column.
        dialect: Dialect,
        /// Column name.
        column: String,
        /// Column kind name.
        kind: String,
    },

    /// A command names a column that does not exist.
    #[error("Command '{command}' references unknown column '{column}' on table '{table}'")]
    InvalidColumnReference {
        /// Table the command targets.
        table: String,
        /// The missing column.
        column: String,
        /// Command name.
        command: String,
    },

    /// The same column name was added twice to one blueprint.
    #[error("Column '{column}' is defined more than once on table '{table}'")]
    DuplicateColumn {
        /// Table name.
        table: String,
        /// Duplicated column name.
        column: String,
    },

    /// A foreign key was compiled without a referenced table.
    #[error("Foreign key '{index}' on table '{table}' has no referenced table")]
    MissingReferencedTable {
        /// Table the foreign key belongs to.
        table: String,
        /// Foreign key constraint name.
        index: String,
    },

    /// A column type name could not be resolved.
    #[error("Unknown column type: {0}")]
    UnknownColumnType(String),

    /// A referential action name could not be resolved.
    #[error("Unknown foreign key action: {0}")]
    UnknownForeignKeyAction(String),

    /// A dialect/driver name could not be resolved.
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),
}

impl SchemaError {
    /// Shorthand for [`SchemaError::UnsupportedFeature`].
    pub fn unsupported(dialect: Dialect, feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            dialect,
            feature: feature.into(),
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
