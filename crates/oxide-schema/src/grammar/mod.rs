//! Schema grammars.
//!
//! A [`Grammar`] compiles the commands of a [`Blueprint`] into SQL for one
//! dialect. The trait carries the shared skeleton (quoting, default values,
//! the ordered modifier pipeline, the command dispatcher and the statements
//! most dialects agree on); each dialect overrides what differs.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlGrammar;
pub use postgres::PostgresGrammar;
pub use sqlite::SqliteGrammar;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::blueprint::Blueprint;
use crate::column::ColumnDefinition;
use crate::command::{Command, FluentCommand, IndexDefinition, IndexKind};
use crate::connection::Connection;
use crate::error::{Result, SchemaError};
use crate::fluent::Value;
use crate::foreign_key::ForeignKeyDefinition;

// =============================================================================
// Dialect
// =============================================================================

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL and MariaDB.
    #[serde(alias = "mariadb")]
    MySql,
    /// PostgreSQL.
    #[serde(alias = "pgsql", alias = "postgresql")]
    Postgres,
    /// SQLite.
    Sqlite,
}

impl Dialect {
    /// Returns the grammar for this dialect.
    #[must_use]
    pub fn grammar(self) -> Box<dyn Grammar> {
        self.grammar_with_prefix("")
    }

    /// Returns the grammar for this dialect with a table prefix.
    #[must_use]
    pub fn grammar_with_prefix(self, prefix: &str) -> Box<dyn Grammar> {
        match self {
            Self::MySql => Box::new(MySqlGrammar::with_prefix(prefix)),
            Self::Postgres => Box::new(PostgresGrammar::with_prefix(prefix)),
            Self::Sqlite => Box::new(SqliteGrammar::with_prefix(prefix)),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        })
    }
}

impl FromStr for Dialect {
    type Err = SchemaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "pgsql" | "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(SchemaError::UnknownDialect(other.to_string())),
        }
    }
}

/// Selects the grammar of a connection, carrying its table prefix.
#[must_use]
pub fn grammar_for(connection: &dyn Connection) -> Box<dyn Grammar> {
    connection
        .dialect()
        .grammar_with_prefix(connection.table_prefix())
}

// =============================================================================
// Modifiers
// =============================================================================

/// Column modifiers, applied after the type in dialect order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Unsigned,
    Charset,
    Collate,
    Nullable,
    Default,
    Increment,
    VirtualAs,
    StoredAs,
    GeneratedAs,
    Comment,
    After,
    First,
    Invisible,
    Srid,
    OnUpdate,
}

/// Modifier order used unless a dialect overrides it.
pub const DEFAULT_MODIFIERS: &[Modifier] = &[
    Modifier::Unsigned,
    Modifier::Charset,
    Modifier::Collate,
    Modifier::Nullable,
    Modifier::Default,
    Modifier::Increment,
    Modifier::VirtualAs,
    Modifier::StoredAs,
    Modifier::GeneratedAs,
    Modifier::Comment,
    Modifier::After,
    Modifier::First,
    Modifier::Invisible,
    Modifier::Srid,
];

// =============================================================================
// Grammar
// =============================================================================

/// Dialect-specific schema compiler.
///
/// Grammars hold no mutable state and can be shared across threads and
/// reused for any number of blueprints.
pub trait Grammar: Send + Sync {
    /// Dialect compiled by this grammar.
    fn dialect(&self) -> Dialect;

    /// Prefix applied to table names.
    fn table_prefix(&self) -> &str;

    // -------------------------------------------------------------------------
    // Quoting
    // -------------------------------------------------------------------------

    /// Identifier quote character.
    fn quote_char(&self) -> char {
        '"'
    }

    /// Quotes a single identifier segment, doubling embedded quotes.
    fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_string();
        }
        let quote = self.quote_char();
        let escaped = value.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Quotes a possibly dotted and aliased identifier.
    fn wrap(&self, value: &str) -> String {
        if let Some(position) = value.to_ascii_lowercase().find(" as ") {
            let (left, right) = (&value[..position], &value[position + 4..]);
            return format!("{} as {}", self.wrap(left.trim()), self.wrap_value(right.trim()));
        }
        value
            .split('.')
            .map(|segment| self.wrap_value(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quotes a table name, applying the prefix to its last segment.
    fn wrap_table(&self, table: &str) -> String {
        let prefix = self.table_prefix();
        match table.rsplit_once('.') {
            Some((schema, name)) => {
                format!("{}.{}", self.wrap(schema), self.wrap_value(&format!("{prefix}{name}")))
            }
            None => self.wrap_value(&format!("{prefix}{table}")),
        }
    }

    /// Quotes and comma-joins a column list.
    fn columnize(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|column| self.wrap(column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Single-quotes a string literal, doubling embedded quotes.
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Quoted, comma-joined string literals (`'a', 'b'`).
    fn quote_list(&self, values: &[String]) -> String {
        values
            .iter()
            .map(|value| self.quote_string(value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    // -------------------------------------------------------------------------
    // Capabilities
    // -------------------------------------------------------------------------

    /// Whether schema changes can run inside a transaction.
    fn supports_schema_transactions(&self) -> bool {
        false
    }

    /// Column attributes compiled as trailing statements.
    fn fluent_commands(&self) -> &'static [FluentCommand] {
        &[]
    }

    /// Modifier order.
    fn modifiers(&self) -> &'static [Modifier] {
        DEFAULT_MODIFIERS
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// SQL type of a column.
    fn type_sql(&self, column: &ColumnDefinition) -> Result<String>;

    /// Error for a column kind without a mapping in this dialect.
    fn unsupported_type(&self, column: &ColumnDefinition) -> SchemaError {
        SchemaError::UnsupportedColumnType {
            dialect: self.dialect(),
            column: column.name().to_string(),
            kind: column.kind().name().to_string(),
        }
    }

    /// Applies every modifier, in order, to a column type.
    fn add_modifiers(
        &self,
        sql: String,
        blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<String> {
        let mut sql = sql;
        for modifier in self.modifiers() {
            if let Some(fragment) = self.modify(*modifier, blueprint, column)? {
                sql.push_str(&fragment);
            }
        }
        Ok(sql)
    }

    /// Type and modifiers of a column, without its name.
    fn column_definition(
        &self,
        blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<String> {
        let sql = self.type_sql(column)?;
        self.add_modifiers(sql, blueprint, column)
    }

    /// Full definitions of the blueprint's added columns.
    fn get_columns(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let mut columns = Vec::new();
        for column in blueprint.added_columns() {
            columns.push(format!(
                "{} {}",
                self.wrap(column.name()),
                self.column_definition(blueprint, column)?
            ));
        }
        Ok(columns)
    }

    /// Dispatches a modifier to its handler.
    fn modify(
        &self,
        modifier: Modifier,
        blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        match modifier {
            Modifier::Unsigned => self.modify_unsigned(blueprint, column),
            Modifier::Charset => self.modify_charset(blueprint, column),
            Modifier::Collate => self.modify_collate(blueprint, column),
            Modifier::Nullable => self.modify_nullable(blueprint, column),
            Modifier::Default => self.modify_default(blueprint, column),
            Modifier::Increment => self.modify_increment(blueprint, column),
            Modifier::VirtualAs => self.modify_virtual_as(blueprint, column),
            Modifier::StoredAs => self.modify_stored_as(blueprint, column),
            Modifier::GeneratedAs => self.modify_generated_as(blueprint, column),
            Modifier::Comment => self.modify_comment(blueprint, column),
            Modifier::After => self.modify_after(blueprint, column),
            Modifier::First => self.modify_first(blueprint, column),
            Modifier::Invisible => self.modify_invisible(blueprint, column),
            Modifier::Srid => self.modify_srid(blueprint, column),
            Modifier::OnUpdate => self.modify_on_update(blueprint, column),
        }
    }

    fn modify_unsigned(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_charset(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_collate(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_nullable(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        let sql = if column.is_nullable() { " null" } else { " not null" };
        Ok(Some(sql.to_string()))
    }

    fn modify_default(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(self
            .column_default_sql(column)
            .map(|sql| format!(" default {sql}")))
    }

    fn modify_increment(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_virtual_as(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_stored_as(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_generated_as(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_comment(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_after(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_first(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_invisible(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_srid(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn modify_on_update(
        &self,
        _blueprint: &Blueprint,
        _column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    // -------------------------------------------------------------------------
    // Default values
    // -------------------------------------------------------------------------

    /// Literal for a boolean default.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    /// Formats a default value as a SQL literal.
    fn get_default_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => self.boolean_literal(*b).to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => self.quote_string(s),
            Value::List(items) => self.quote_string(&items.join(",")),
            Value::Expression(expression) => expression.clone(),
        }
    }

    /// Current timestamp expression for `use_current` columns.
    fn current_timestamp(&self, _column: &ColumnDefinition) -> String {
        "CURRENT_TIMESTAMP".to_string()
    }

    /// Default clause value of a column; a null default is omitted.
    fn column_default_sql(&self, column: &ColumnDefinition) -> Option<String> {
        if column.uses_current() {
            return Some(self.current_timestamp(column));
        }
        match column.default_value()? {
            Value::Null => None,
            value => Some(self.get_default_value(value)),
        }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Compiles one command into an ordered list of statements.
    fn compile(
        &self,
        blueprint: &Blueprint,
        command: &Command,
        connection: &dyn Connection,
    ) -> Result<Vec<String>> {
        validate_references(blueprint, command, connection)?;

        debug!(
            dialect = %self.dialect(),
            table = %blueprint.table(),
            command = command.name(),
            "Compiling schema command"
        );

        match command {
            Command::Create => self.compile_create(blueprint, connection),
            Command::Add => self.compile_add(blueprint),
            Command::Change => self.compile_change(blueprint, connection),
            Command::Drop => self.compile_drop(blueprint),
            Command::DropIfExists => self.compile_drop_if_exists(blueprint),
            Command::Rename { to } => self.compile_rename(blueprint, to),
            Command::DropColumn { columns } => {
                self.compile_drop_column(blueprint, columns, connection)
            }
            Command::RenameColumn { from, to } => {
                self.compile_rename_column(blueprint, from, to, connection)
            }
            Command::Index(index) => match index.kind {
                IndexKind::Primary => self.compile_primary(blueprint, index),
                IndexKind::Unique => self.compile_unique(blueprint, index),
                IndexKind::Index => self.compile_index(blueprint, index),
                IndexKind::Fulltext => self.compile_fulltext(blueprint, index),
                IndexKind::Spatial => self.compile_spatial_index(blueprint, index),
            },
            Command::DropIndex { kind, index } => match kind {
                IndexKind::Primary => self.compile_drop_primary(blueprint, index),
                IndexKind::Unique => self.compile_drop_unique(blueprint, index),
                IndexKind::Index => self.compile_drop_index(blueprint, index),
                IndexKind::Fulltext => self.compile_drop_fulltext(blueprint, index),
                IndexKind::Spatial => self.compile_drop_spatial_index(blueprint, index),
            },
            Command::RenameIndex { from, to } => self.compile_rename_index(blueprint, from, to),
            Command::Foreign(foreign) => self.compile_foreign(blueprint, foreign),
            Command::DropForeign { index } => self.compile_drop_foreign(blueprint, index),
            Command::TableComment { comment } => self.compile_table_comment(blueprint, comment),
            Command::ColumnComment { column, comment } => {
                self.compile_column_comment(blueprint, column, comment.as_deref())
            }
            Command::AutoIncrementStartingValue { column, value } => {
                self.compile_auto_increment_starting_value(blueprint, column, *value)
            }
        }
    }

    fn compile_create(
        &self,
        blueprint: &Blueprint,
        connection: &dyn Connection,
    ) -> Result<Vec<String>>;

    fn compile_add(&self, blueprint: &Blueprint) -> Result<Vec<String>>;

    fn compile_change(
        &self,
        blueprint: &Blueprint,
        connection: &dyn Connection,
    ) -> Result<Vec<String>>;

    fn compile_drop(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        Ok(vec![format!("drop table {}", self.wrap_table(blueprint.table()))])
    }

    fn compile_drop_if_exists(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        Ok(vec![format!(
            "drop table if exists {}",
            self.wrap_table(blueprint.table())
        )])
    }

    fn compile_rename(&self, blueprint: &Blueprint, to: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "alter table {} rename to {}",
            self.wrap_table(blueprint.table()),
            self.wrap_table(to)
        )])
    }

    fn compile_drop_column(
        &self,
        blueprint: &Blueprint,
        columns: &[String],
        _connection: &dyn Connection,
    ) -> Result<Vec<String>> {
        let drops = columns
            .iter()
            .map(|column| format!("drop column {}", self.wrap(column)))
            .collect::<Vec<_>>();
        Ok(vec![format!(
            "alter table {} {}",
            self.wrap_table(blueprint.table()),
            drops.join(", ")
        )])
    }

    fn compile_rename_column(
        &self,
        blueprint: &Blueprint,
        from: &str,
        to: &str,
        _connection: &dyn Connection,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "alter table {} rename column {} to {}",
            self.wrap_table(blueprint.table()),
            self.wrap(from),
            self.wrap(to)
        )])
    }

    fn compile_primary(
        &self,
        _blueprint: &Blueprint,
        _index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "primary keys"))
    }

    fn compile_unique(
        &self,
        _blueprint: &Blueprint,
        _index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "unique indexes"))
    }

    fn compile_index(
        &self,
        _blueprint: &Blueprint,
        _index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "indexes"))
    }

    fn compile_fulltext(
        &self,
        _blueprint: &Blueprint,
        _index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "fulltext indexes"))
    }

    fn compile_spatial_index(
        &self,
        _blueprint: &Blueprint,
        _index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "spatial indexes"))
    }

    fn compile_drop_primary(&self, _blueprint: &Blueprint, _index: &str) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "dropping primary keys"))
    }

    fn compile_drop_unique(&self, _blueprint: &Blueprint, _index: &str) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "dropping unique indexes"))
    }

    fn compile_drop_index(&self, _blueprint: &Blueprint, _index: &str) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "dropping indexes"))
    }

    fn compile_drop_fulltext(&self, _blueprint: &Blueprint, _index: &str) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "dropping fulltext indexes"))
    }

    fn compile_drop_spatial_index(
        &self,
        _blueprint: &Blueprint,
        _index: &str,
    ) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "dropping spatial indexes"))
    }

    fn compile_rename_index(
        &self,
        _blueprint: &Blueprint,
        _from: &str,
        _to: &str,
    ) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "renaming indexes"))
    }

    /// `alter table ... add constraint ... foreign key ... references ...`.
    fn compile_foreign(
        &self,
        blueprint: &Blueprint,
        foreign: &ForeignKeyDefinition,
    ) -> Result<Vec<String>> {
        let on = referenced_table(blueprint, foreign)?;
        let mut sql = format!(
            "alter table {} add constraint {} foreign key ({}) references {} ({})",
            self.wrap_table(blueprint.table()),
            self.wrap(foreign.index()),
            self.columnize(foreign.columns()),
            self.wrap_table(on),
            self.columnize(&foreign.referenced_columns())
        );
        sql.push_str(&self.foreign_key_clauses(foreign)?);
        Ok(vec![sql])
    }

    /// Trailing `on delete` / `on update` (and dialect options) of a foreign key.
    fn foreign_key_clauses(&self, foreign: &ForeignKeyDefinition) -> Result<String> {
        Ok(referential_actions(foreign))
    }

    fn compile_drop_foreign(&self, _blueprint: &Blueprint, _index: &str) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "dropping foreign keys"))
    }

    fn compile_table_comment(&self, _blueprint: &Blueprint, _comment: &str) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "table comments"))
    }

    fn compile_column_comment(
        &self,
        _blueprint: &Blueprint,
        _column: &str,
        _comment: Option<&str>,
    ) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "column comment statements"))
    }

    fn compile_auto_increment_starting_value(
        &self,
        _blueprint: &Blueprint,
        _column: &str,
        _value: i64,
    ) -> Result<Vec<String>> {
        Err(SchemaError::unsupported(self.dialect(), "auto-increment starting values"))
    }

    fn compile_enable_foreign_key_constraints(&self) -> Result<Vec<String>>;

    fn compile_disable_foreign_key_constraints(&self) -> Result<Vec<String>>;
}

// =============================================================================
// Shared helpers
// =============================================================================

/// ` on delete ...` and ` on update ...`, each only when set.
pub(crate) fn referential_actions(foreign: &ForeignKeyDefinition) -> String {
    let mut sql = String::new();
    if let Some(action) = foreign.on_delete_action() {
        sql.push_str(&format!(" on delete {action}"));
    }
    if let Some(action) = foreign.on_update_action() {
        sql.push_str(&format!(" on update {action}"));
    }
    sql
}

/// Referenced table of a foreign key, or the error naming it.
pub(crate) fn referenced_table<'a>(
    blueprint: &Blueprint,
    foreign: &'a ForeignKeyDefinition,
) -> Result<&'a str> {
    foreign
        .referenced_table()
        .ok_or_else(|| SchemaError::MissingReferencedTable {
            table: blueprint.table().to_string(),
            index: foreign.index().to_string(),
        })
}

/// Checks that a command only names columns that exist.
///
/// While creating, the blueprint columns are the whole table. Otherwise
/// the check needs the connection's column listing and is skipped without
/// one; the listing is brought up to date with the commands that run
/// before this one.
fn validate_references(
    blueprint: &Blueprint,
    command: &Command,
    connection: &dyn Connection,
) -> Result<()> {
    if matches!(command, Command::Create | Command::Add) {
        blueprint.check_duplicate_columns()?;
    }

    let creating = blueprint.creating();
    let known: Vec<String> = if creating {
        blueprint.added_columns().map(|c| c.name().to_string()).collect()
    } else {
        match connection.column_listing(blueprint.table()) {
            Some(listing) => blueprint.columns_before(command, listing),
            None => return Ok(()),
        }
    };

    let referenced: Vec<&str> = match command {
        Command::DropColumn { columns } => columns.iter().map(String::as_str).collect(),
        Command::RenameColumn { from, .. } => vec![from.as_str()],
        Command::Index(index) => index.columns.iter().map(String::as_str).collect(),
        Command::Foreign(foreign) => foreign.columns().iter().map(String::as_str).collect(),
        Command::Change if !creating => blueprint
            .changed_columns()
            .map(ColumnDefinition::name)
            .collect(),
        _ => Vec::new(),
    };

    match referenced
        .into_iter()
        .find(|column| !known.iter().any(|k| k.as_str() == *column))
    {
        Some(column) => Err(SchemaError::InvalidColumnReference {
            table: blueprint.table().to_string(),
            column: column.to_string(),
            command: command.name().to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("mysql".parse::<Dialect>(), Ok(Dialect::MySql));
        assert_eq!("MariaDB".parse::<Dialect>(), Ok(Dialect::MySql));
        assert_eq!("pgsql".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert_eq!("sqlite".parse::<Dialect>(), Ok(Dialect::Sqlite));
        assert_eq!(
            "oracle".parse::<Dialect>(),
            Err(SchemaError::UnknownDialect("oracle".to_string()))
        );
    }

    #[test]
    fn test_wrap_segments() {
        let grammar = Dialect::Postgres.grammar();
        assert_eq!(
            grammar.wrap("schema.table.column"),
            "\"schema\".\"table\".\"column\""
        );
        assert_eq!(grammar.wrap("*"), "*");
        assert_eq!(grammar.wrap("users.*"), "\"users\".*");
        assert_eq!(grammar.wrap("a\"b"), "\"a\"\"b\"");
        assert_eq!(grammar.wrap("name as full_name"), "\"name\" as \"full_name\"");
    }

    #[test]
    fn test_wrap_table_with_prefix() {
        let grammar = Dialect::Sqlite.grammar_with_prefix("app_");
        assert_eq!(grammar.wrap_table("users"), "\"app_users\"");
        assert_eq!(grammar.wrap_table("main.users"), "\"main\".\"app_users\"");
    }

    #[test]
    fn test_default_values() {
        let grammar = Dialect::Sqlite.grammar();
        assert_eq!(grammar.get_default_value(&Value::from("it's")), "'it''s'");
        assert_eq!(grammar.get_default_value(&Value::Bool(true)), "1");
        assert_eq!(grammar.get_default_value(&Value::Null), "null");
        assert_eq!(grammar.get_default_value(&Value::Int(-3)), "-3");
        assert_eq!(grammar.get_default_value(&Value::raw("now()")), "now()");
        assert_eq!(
            grammar.get_default_value(&Value::List(vec!["a".into(), "b".into()])),
            "'a,b'"
        );
    }
}
