//! Dialect-aware schema blueprints.
//!
//! `oxide-schema` describes table changes once and compiles them to DDL for
//! MySQL, PostgreSQL and SQLite. Nothing here talks to a database: the
//! output is an ordered list of statements for the caller to execute.
//!
//! # Architecture
//!
//! - **Blueprint** - Ordered columns and commands for one table
//! - **Column / Fluent** - Open attribute records behind the modifier API
//! - **Command** - Structural operations (create, add, index, foreign key, ...)
//! - **Grammar** - Per-dialect compiler from blueprint commands to SQL
//! - **Connection** - What a grammar may ask about the target database
//!
//! Before compiling, the blueprint turns column-level flags (`unique()`,
//! `constrained()`, `comment()`, ...) into explicit commands, so a grammar
//! only ever deals with commands.
//!
//! # Example
//!
//! ```rust
//! use oxide_schema::prelude::*;
//!
//! let mut table = Blueprint::new("posts");
//! table.create();
//! table.id();
//! table.foreign_id("user_id").constrained().cascade_on_delete();
//! table.string("title", 255);
//! table.text("body").nullable();
//! table.timestamps();
//!
//! let connection = ConnectionConfig::new(Dialect::Postgres);
//! let grammar = grammar_for(&connection);
//! let statements = table.to_sql(&connection, grammar.as_ref())?;
//!
//! assert_eq!(statements.len(), 2);
//! assert!(statements[1].ends_with("references \"users\" (\"id\") on delete cascade"));
//! # Ok::<(), SchemaError>(())
//! ```
//!
//! # Restricted engines
//!
//! SQLite cannot alter a column in place. Depending on the connection's
//! server version, column renames and drops either compile to the native
//! statement or to a six-statement table rebuild; column changes always
//! rebuild. A rebuild keeps keys and indexes when the connection knows the
//! table's [`TableSchema`]. See [`SqliteGrammar`].

pub mod blueprint;
pub mod column;
pub mod command;
pub mod connection;
pub mod error;
pub mod fluent;
pub mod foreign_key;
pub mod grammar;
pub mod schema;

pub use blueprint::Blueprint;
pub use column::{ColumnDefinition, ColumnType, GeometryType};
pub use command::{Command, FluentCommand, IndexDefinition, IndexKind};
pub use connection::{Connection, ConnectionConfig, ServerVersion};
pub use error::{Result, SchemaError};
pub use fluent::{Fluent, Value};
pub use foreign_key::{ForeignKeyAction, ForeignKeyDefinition};
pub use grammar::{
    grammar_for, Dialect, Grammar, Modifier, MySqlGrammar, PostgresGrammar, SqliteGrammar,
};
pub use schema::{ColumnSchema, ForeignKeySchema, IndexSchema, TableSchema};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::blueprint::Blueprint;
    pub use crate::column::{ColumnDefinition, ColumnType, GeometryType};
    pub use crate::command::{Command, IndexKind};
    pub use crate::connection::{Connection, ConnectionConfig, ServerVersion};
    pub use crate::error::{Result, SchemaError};
    pub use crate::foreign_key::ForeignKeyAction;
    pub use crate::grammar::{
        grammar_for, Dialect, Grammar, MySqlGrammar, PostgresGrammar, SqliteGrammar,
    };
    pub use crate::schema::{ColumnSchema, ForeignKeySchema, IndexSchema, TableSchema};
}
