//! Table blueprints.
//!
//! A [`Blueprint`] accumulates the columns and structural commands for one
//! table. Column factories return the new [`ColumnDefinition`] so modifiers
//! chain on the column; command factories return the command payload.
//!
//! ```rust
//! use oxide_schema::{Blueprint, ConnectionConfig, Dialect};
//!
//! let mut table = Blueprint::new("posts");
//! table.create();
//! table.id();
//! table.string("title", 255);
//! table.string("slug", 255).unique();
//!
//! let connection = ConnectionConfig::new(Dialect::Sqlite);
//! let grammar = Dialect::Sqlite.grammar();
//! let statements = table.to_sql(&connection, grammar.as_ref()).unwrap();
//! assert_eq!(statements.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::column::{ColumnDefinition, ColumnType, GeometryType};
use crate::command::{Command, FluentCommand, IndexDefinition, IndexKind};
use crate::connection::Connection;
use crate::error::{Result, SchemaError};
use crate::fluent::Value;
use crate::foreign_key::ForeignKeyDefinition;
use crate::grammar::Grammar;

/// Ordered description of one table's columns and commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    table: String,
    #[serde(default)]
    prefix: String,
    #[serde(default)]
    temporary: bool,
    #[serde(default)]
    engine: Option<String>,
    #[serde(default)]
    charset: Option<String>,
    #[serde(default)]
    collation: Option<String>,
    #[serde(default)]
    columns: Vec<ColumnDefinition>,
    #[serde(default)]
    commands: Vec<Command>,
    #[serde(skip)]
    after: Option<String>,
}

impl Blueprint {
    /// Creates an empty blueprint for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_prefix(table, "")
    }

    /// Creates an empty blueprint whose index names carry the connection's
    /// table prefix.
    #[must_use]
    pub fn for_connection(table: impl Into<String>, connection: &dyn Connection) -> Self {
        Self::with_prefix(table, connection.table_prefix())
    }

    /// Creates an empty blueprint whose index names carry `prefix`.
    #[must_use]
    pub fn with_prefix(table: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            prefix: prefix.into(),
            temporary: false,
            engine: None,
            charset: None,
            collation: None,
            columns: Vec::new(),
            commands: Vec::new(),
            after: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Table name, without prefix.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Table prefix used in index names.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether the table is temporary.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Storage engine override.
    #[must_use]
    pub fn table_engine(&self) -> Option<&str> {
        self.engine.as_deref()
    }

    /// Character set override.
    #[must_use]
    pub fn table_charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Collation override.
    #[must_use]
    pub fn table_collation(&self) -> Option<&str> {
        self.collation.as_deref()
    }

    /// All columns, in insertion order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// All commands, in compile order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Columns that are new to the table.
    pub fn added_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|column| !column.is_change())
    }

    /// Columns that modify an existing column.
    pub fn changed_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|column| column.is_change())
    }

    /// Column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.name() == name)
    }

    /// Whether the blueprint creates its table.
    #[must_use]
    pub fn creating(&self) -> bool {
        self.commands.iter().any(|command| matches!(command, Command::Create))
    }

    /// Whether a command with the given name is present.
    #[must_use]
    pub fn has_command(&self, name: &str) -> bool {
        self.commands.iter().any(|command| command.name() == name)
    }

    /// The primary key command, if any.
    #[must_use]
    pub fn primary_command(&self) -> Option<&IndexDefinition> {
        self.commands
            .iter()
            .filter_map(Command::as_index)
            .find(|index| index.kind == IndexKind::Primary)
    }

    /// Foreign key commands, in order.
    pub fn foreign_commands(&self) -> impl Iterator<Item = &ForeignKeyDefinition> {
        self.commands.iter().filter_map(Command::as_foreign)
    }

    /// Rejects two added columns with the same name.
    pub(crate) fn check_duplicate_columns(&self) -> Result<()> {
        let mut seen: Vec<&str> = Vec::new();
        for column in self.added_columns() {
            if seen.contains(&column.name()) {
                return Err(SchemaError::DuplicateColumn {
                    table: self.table.clone(),
                    column: column.name().to_string(),
                });
            }
            seen.push(column.name());
        }
        Ok(())
    }

    /// Columns of the table as `command` finds them.
    ///
    /// Starts from `columns`, the table before this blueprint, and applies
    /// the adds, drops and renames of every earlier command.
    pub(crate) fn columns_before(&self, command: &Command, columns: Vec<String>) -> Vec<String> {
        let mut columns = columns;
        for earlier in &self.commands {
            if std::ptr::eq(earlier, command) {
                break;
            }
            match earlier {
                Command::Add => {
                    for column in self.added_columns() {
                        if !columns.iter().any(|name| name == column.name()) {
                            columns.push(column.name().to_string());
                        }
                    }
                }
                Command::Change => {
                    for column in self.changed_columns() {
                        if let Some(to) = column.renamed_to() {
                            rename_in(&mut columns, column.name(), to);
                        }
                    }
                }
                Command::RenameColumn { from, to } => rename_in(&mut columns, from, to),
                Command::DropColumn { columns: dropped } => {
                    columns.retain(|name| !dropped.contains(name));
                }
                _ => {}
            }
        }
        columns
    }

    // =========================================================================
    // Table options
    // =========================================================================

    /// Marks the table temporary.
    pub fn temporary(&mut self) -> &mut Self {
        self.temporary = true;
        self
    }

    /// Sets the storage engine (MySQL).
    pub fn engine(&mut self, engine: impl Into<String>) -> &mut Self {
        self.engine = Some(engine.into());
        self
    }

    /// Sets the default character set (MySQL).
    pub fn charset(&mut self, charset: impl Into<String>) -> &mut Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the default collation (MySQL).
    pub fn collation(&mut self, collation: impl Into<String>) -> &mut Self {
        self.collation = Some(collation.into());
        self
    }

    // =========================================================================
    // Column factories
    // =========================================================================

    /// Appends a column and returns it.
    pub fn add_column_definition(&mut self, mut column: ColumnDefinition) -> &mut ColumnDefinition {
        if let Some(anchor) = self.after.take() {
            column.after(anchor);
            self.after = Some(column.name().to_string());
        }
        let position = self.columns.len();
        self.columns.push(column);
        &mut self.columns[position]
    }

    fn add(&mut self, name: &str, kind: ColumnType) -> &mut ColumnDefinition {
        self.add_column_definition(ColumnDefinition::new(name, kind))
    }

    /// Appends a column by kind name (`string`, `bigInteger`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownColumnType`] when the kind name is not
    /// known or needs parameters that a name alone cannot carry.
    pub fn add_column(&mut self, type_name: &str, name: &str) -> Result<&mut ColumnDefinition> {
        let kind: ColumnType = type_name.parse()?;
        Ok(self.add(name, kind))
    }

    /// Auto-incrementing unsigned big integer `id`.
    pub fn id(&mut self) -> &mut ColumnDefinition {
        self.big_increments("id")
    }

    /// Auto-incrementing unsigned integer.
    pub fn increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.unsigned_integer(name).auto_increment()
    }

    /// Auto-incrementing unsigned tiny integer.
    pub fn tiny_increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.tiny_integer(name).unsigned().auto_increment()
    }

    /// Auto-incrementing unsigned small integer.
    pub fn small_increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.small_integer(name).unsigned().auto_increment()
    }

    /// Auto-incrementing unsigned medium integer.
    pub fn medium_increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.medium_integer(name).unsigned().auto_increment()
    }

    /// Auto-incrementing unsigned big integer.
    pub fn big_increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.unsigned_big_integer(name).auto_increment()
    }

    /// Fixed-length string.
    pub fn char(&mut self, name: &str, length: u32) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Char { length })
    }

    /// Variable-length string.
    pub fn string(&mut self, name: &str, length: u32) -> &mut ColumnDefinition {
        self.add(name, ColumnType::String { length })
    }

    pub fn tiny_text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::TinyText)
    }

    pub fn text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Text)
    }

    pub fn medium_text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::MediumText)
    }

    pub fn long_text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::LongText)
    }

    pub fn integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Integer)
    }

    pub fn tiny_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::TinyInteger)
    }

    pub fn small_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::SmallInteger)
    }

    pub fn medium_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::MediumInteger)
    }

    pub fn big_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::BigInteger)
    }

    pub fn unsigned_tiny_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.tiny_integer(name).unsigned()
    }

    pub fn unsigned_small_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.small_integer(name).unsigned()
    }

    pub fn unsigned_medium_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.medium_integer(name).unsigned()
    }

    pub fn unsigned_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.integer(name).unsigned()
    }

    pub fn unsigned_big_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.big_integer(name).unsigned()
    }

    /// Single precision float; `precision` is the binary precision in bits.
    pub fn float(&mut self, name: &str, precision: Option<u8>) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Float { precision })
    }

    pub fn double(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Double)
    }

    /// Exact decimal with `total` digits, `places` of them after the point.
    pub fn decimal(&mut self, name: &str, total: u8, places: u8) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Decimal { total, places })
    }

    pub fn boolean(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Boolean)
    }

    /// One value out of `allowed`.
    pub fn enumeration(&mut self, name: &str, allowed: &[&str]) -> &mut ColumnDefinition {
        let allowed = allowed.iter().map(ToString::to_string).collect();
        self.add(name, ColumnType::Enum { allowed })
    }

    /// Any subset of `allowed` (MySQL).
    pub fn set(&mut self, name: &str, allowed: &[&str]) -> &mut ColumnDefinition {
        let allowed = allowed.iter().map(ToString::to_string).collect();
        self.add(name, ColumnType::Set { allowed })
    }

    pub fn json(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Json)
    }

    pub fn jsonb(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Jsonb)
    }

    pub fn date(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Date)
    }

    pub fn date_time(&mut self, name: &str, precision: Option<u8>) -> &mut ColumnDefinition {
        self.add(name, ColumnType::DateTime { precision })
    }

    pub fn date_time_tz(&mut self, name: &str, precision: Option<u8>) -> &mut ColumnDefinition {
        self.add(name, ColumnType::DateTimeTz { precision })
    }

    pub fn time(&mut self, name: &str, precision: Option<u8>) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Time { precision })
    }

    pub fn time_tz(&mut self, name: &str, precision: Option<u8>) -> &mut ColumnDefinition {
        self.add(name, ColumnType::TimeTz { precision })
    }

    pub fn timestamp(&mut self, name: &str, precision: Option<u8>) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Timestamp { precision })
    }

    pub fn timestamp_tz(&mut self, name: &str, precision: Option<u8>) -> &mut ColumnDefinition {
        self.add(name, ColumnType::TimestampTz { precision })
    }

    pub fn year(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Year)
    }

    /// Binary data; `fixed` with a length gives a fixed-size column.
    pub fn binary(
        &mut self,
        name: &str,
        length: Option<u32>,
        fixed: bool,
    ) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Binary { length, fixed })
    }

    pub fn uuid(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Uuid)
    }

    pub fn ip_address(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::IpAddress)
    }

    pub fn mac_address(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add(name, ColumnType::MacAddress)
    }

    /// Planar spatial column.
    pub fn geometry(
        &mut self,
        name: &str,
        subtype: Option<GeometryType>,
        srid: Option<u32>,
    ) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Geometry { subtype, srid })
    }

    /// Geodetic spatial column; the SRID defaults to 4326.
    pub fn geography(
        &mut self,
        name: &str,
        subtype: Option<GeometryType>,
        srid: Option<u32>,
    ) -> &mut ColumnDefinition {
        self.add(name, ColumnType::Geography { subtype, srid })
    }

    /// Computed column (generated from an expression, no storage type).
    pub fn computed(&mut self, name: &str, expression: &str) -> &mut ColumnDefinition {
        let expression = expression.to_string();
        self.add(name, ColumnType::Computed { expression })
    }

    /// Unsigned big integer meant to reference another table's `id`.
    pub fn foreign_id(&mut self, name: &str) -> &mut ColumnDefinition {
        self.unsigned_big_integer(name)
    }

    /// UUID meant to reference another table's key.
    pub fn foreign_uuid(&mut self, name: &str) -> &mut ColumnDefinition {
        self.uuid(name)
    }

    /// Nullable `created_at` and `updated_at` timestamps.
    pub fn timestamps(&mut self) {
        self.timestamp("created_at", None).nullable();
        self.timestamp("updated_at", None).nullable();
    }

    /// Nullable `created_at` and `updated_at` timestamps with time zone.
    pub fn timestamps_tz(&mut self) {
        self.timestamp_tz("created_at", None).nullable();
        self.timestamp_tz("updated_at", None).nullable();
    }

    /// Nullable `deleted_at` timestamp.
    pub fn soft_deletes(&mut self) -> &mut ColumnDefinition {
        self.timestamp("deleted_at", None).nullable()
    }

    /// Nullable `deleted_at` timestamp with time zone.
    pub fn soft_deletes_tz(&mut self) -> &mut ColumnDefinition {
        self.timestamp_tz("deleted_at", None).nullable()
    }

    /// Nullable `remember_token` string.
    pub fn remember_token(&mut self) -> &mut ColumnDefinition {
        self.string("remember_token", 100).nullable()
    }

    /// Removes a column. Does nothing if the column is absent.
    pub fn remove_column(&mut self, name: &str) -> &mut Self {
        self.columns.retain(|column| column.name() != name);
        self
    }

    /// Adds the columns defined in `callback` after `column`, in order.
    pub fn after(&mut self, column: impl Into<String>, callback: impl FnOnce(&mut Self)) {
        self.after = Some(column.into());
        callback(self);
        self.after = None;
    }

    // =========================================================================
    // Command factories
    // =========================================================================

    /// Appends a command and returns it.
    pub fn add_command(&mut self, command: Command) -> &mut Command {
        let position = self.commands.len();
        self.commands.push(command);
        &mut self.commands[position]
    }

    pub fn create(&mut self) -> &mut Command {
        self.add_command(Command::Create)
    }

    /// Explicit `add` command; usually implied by new columns.
    pub fn add_columns(&mut self) -> &mut Command {
        self.add_command(Command::Add)
    }

    /// Explicit `change` command; usually implied by changed columns.
    pub fn change_columns(&mut self) -> &mut Command {
        self.add_command(Command::Change)
    }

    pub fn drop(&mut self) -> &mut Command {
        self.add_command(Command::Drop)
    }

    pub fn drop_if_exists(&mut self) -> &mut Command {
        self.add_command(Command::DropIfExists)
    }

    /// Renames the table.
    pub fn rename(&mut self, to: impl Into<String>) -> &mut Command {
        self.add_command(Command::Rename { to: to.into() })
    }

    pub fn drop_column(&mut self, column: &str) -> &mut Command {
        self.drop_columns(&[column])
    }

    pub fn drop_columns(&mut self, columns: &[&str]) -> &mut Command {
        let columns = columns.iter().map(ToString::to_string).collect();
        self.add_command(Command::DropColumn { columns })
    }

    pub fn rename_column(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> &mut Command {
        self.add_command(Command::RenameColumn {
            from: from.into(),
            to: to.into(),
        })
    }

    /// Drops `created_at` and `updated_at`.
    pub fn drop_timestamps(&mut self) -> &mut Command {
        self.drop_columns(&["created_at", "updated_at"])
    }

    /// Drops `deleted_at`.
    pub fn drop_soft_deletes(&mut self) -> &mut Command {
        self.drop_column("deleted_at")
    }

    /// Drops `remember_token`.
    pub fn drop_remember_token(&mut self) -> &mut Command {
        self.drop_column("remember_token")
    }

    /// Default index name: `{prefix}{table}_{columns}_{suffix}`.
    #[must_use]
    pub fn create_index_name(&self, suffix: &str, columns: &[String]) -> String {
        index_name(&self.prefix, &self.table, suffix, columns)
    }

    fn index_command(&mut self, kind: IndexKind, columns: &[&str]) -> &mut IndexDefinition {
        let columns: Vec<String> = columns.iter().map(ToString::to_string).collect();
        let index = self.create_index_name(kind.suffix(), &columns);
        match self.add_command(Command::Index(IndexDefinition::new(kind, index, columns))) {
            Command::Index(definition) => definition,
            _ => unreachable!("index command was just pushed"),
        }
    }

    pub fn primary(&mut self, columns: &[&str]) -> &mut IndexDefinition {
        self.index_command(IndexKind::Primary, columns)
    }

    pub fn unique(&mut self, columns: &[&str]) -> &mut IndexDefinition {
        self.index_command(IndexKind::Unique, columns)
    }

    pub fn index(&mut self, columns: &[&str]) -> &mut IndexDefinition {
        self.index_command(IndexKind::Index, columns)
    }

    pub fn fulltext(&mut self, columns: &[&str]) -> &mut IndexDefinition {
        self.index_command(IndexKind::Fulltext, columns)
    }

    pub fn spatial_index(&mut self, columns: &[&str]) -> &mut IndexDefinition {
        self.index_command(IndexKind::Spatial, columns)
    }

    fn drop_index_command(&mut self, kind: IndexKind, index: String) -> &mut Command {
        self.add_command(Command::DropIndex { kind, index })
    }

    /// Drops the primary key.
    pub fn drop_primary(&mut self) -> &mut Command {
        let index = self.create_index_name(IndexKind::Primary.suffix(), &[]);
        self.drop_index_command(IndexKind::Primary, index)
    }

    pub fn drop_unique(&mut self, index: &str) -> &mut Command {
        self.drop_index_command(IndexKind::Unique, index.to_string())
    }

    pub fn drop_index(&mut self, index: &str) -> &mut Command {
        self.drop_index_command(IndexKind::Index, index.to_string())
    }

    pub fn drop_fulltext(&mut self, index: &str) -> &mut Command {
        self.drop_index_command(IndexKind::Fulltext, index.to_string())
    }

    pub fn drop_spatial_index(&mut self, index: &str) -> &mut Command {
        self.drop_index_command(IndexKind::Spatial, index.to_string())
    }

    pub fn rename_index(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Command {
        self.add_command(Command::RenameIndex {
            from: from.into(),
            to: to.into(),
        })
    }

    /// Adds a foreign key on `columns`; configure it on the returned definition.
    pub fn foreign(&mut self, columns: &[&str]) -> &mut ForeignKeyDefinition {
        let columns: Vec<String> = columns.iter().map(ToString::to_string).collect();
        let index = self.create_index_name("foreign", &columns);
        match self.add_command(Command::Foreign(ForeignKeyDefinition::new(index, columns))) {
            Command::Foreign(definition) => definition,
            _ => unreachable!("foreign key command was just pushed"),
        }
    }

    /// Drops a foreign key by constraint name.
    pub fn drop_foreign(&mut self, index: &str) -> &mut Command {
        self.add_command(Command::DropForeign {
            index: index.to_string(),
        })
    }

    /// Drops the foreign key with the default name for `columns`.
    pub fn drop_foreign_on(&mut self, columns: &[&str]) -> &mut Command {
        let columns: Vec<String> = columns.iter().map(ToString::to_string).collect();
        let index = self.create_index_name("foreign", &columns);
        self.add_command(Command::DropForeign { index })
    }

    /// Sets the table comment.
    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Command {
        self.add_command(Command::TableComment {
            comment: comment.into(),
        })
    }

    // =========================================================================
    // Synthesis and compilation
    // =========================================================================

    /// Turns column-level flags into explicit commands.
    ///
    /// Running it more than once adds nothing: every flag is consumed when
    /// its command is synthesized, and the implied `add`/`change` and fluent
    /// commands are only added when missing.
    pub fn add_implied_commands(&mut self, grammar: &dyn Grammar) {
        if !self.creating() {
            if self.added_columns().next().is_some() && !self.has_command("add") {
                self.commands.insert(0, Command::Add);
            }
            if self.changed_columns().next().is_some() && !self.has_command("change") {
                self.commands.insert(0, Command::Change);
            }
        }

        self.add_fluent_indexes();
        self.add_fluent_foreign_keys();
        self.add_fluent_commands(grammar.fluent_commands());
    }

    fn add_fluent_indexes(&mut self) {
        let mut synthesized = Vec::new();
        for column in &mut self.columns {
            // A primary flag on an auto-increment column stays on the column,
            // where the increment modifier inlines it.
            let auto_increment = column.is_auto_increment();
            let inlined = move |kind: IndexKind| kind == IndexKind::Primary && auto_increment;
            let Some(kind) = IndexKind::ALL
                .into_iter()
                .find(|kind| !inlined(*kind) && column.index_flag(*kind).is_some())
            else {
                continue;
            };
            let Some(flag) = column.take_index_flag(kind) else {
                continue;
            };
            // Only the first flag counts; later ones are dropped with it.
            for other in IndexKind::ALL.into_iter().filter(|other| !inlined(*other)) {
                column.take_index_flag(other);
            }

            let name = column.renamed_to().unwrap_or(column.name()).to_string();
            let columns = vec![name];
            let default_name = index_name(&self.prefix, &self.table, kind.suffix(), &columns);
            let command = match flag {
                Value::Bool(true) => Some(Command::Index(IndexDefinition::new(
                    kind,
                    default_name,
                    columns,
                ))),
                Value::Bool(false) if column.is_change() => Some(Command::DropIndex {
                    kind,
                    index: default_name,
                }),
                Value::String(index) => {
                    Some(Command::Index(IndexDefinition::new(kind, index, columns)))
                }
                _ => None,
            };
            synthesized.extend(command);
        }
        for command in synthesized {
            trace!(table = %self.table, command = command.name(), "Synthesized index command");
            self.commands.push(command);
        }
    }

    fn add_fluent_foreign_keys(&mut self) {
        let mut synthesized = Vec::new();
        for column in &mut self.columns {
            if !column.take_constrained() {
                continue;
            }
            let referenced_column = column.constrained_column().unwrap_or("id").to_string();
            let referenced_table = column.constrained_table().map_or_else(
                || infer_referenced_table(column.name(), &referenced_column),
                str::to_string,
            );
            let columns = vec![column.name().to_string()];
            let index = index_name(&self.prefix, &self.table, "foreign", &columns);

            let mut foreign = ForeignKeyDefinition::new(index, columns);
            foreign
                .references(&[referenced_column.as_str()])
                .on(referenced_table);
            if let Some(action) = column.on_delete_action() {
                foreign.on_delete(action);
            }
            if let Some(action) = column.on_update_action_of() {
                foreign.on_update(action);
            }
            synthesized.push(Command::Foreign(foreign));
        }
        for command in synthesized {
            trace!(table = %self.table, command = command.name(), "Synthesized foreign key");
            self.commands.push(command);
        }
    }

    fn add_fluent_commands(&mut self, fluent_commands: &[FluentCommand]) {
        for fluent in fluent_commands {
            let synthesized: Vec<Command> = self
                .columns
                .iter()
                .filter_map(|column| match fluent {
                    FluentCommand::AutoIncrementStartingValue => column
                        .starting_value_of()
                        .filter(|_| column.is_auto_increment())
                        .map(|value| Command::AutoIncrementStartingValue {
                            column: column.name().to_string(),
                            value,
                        }),
                    FluentCommand::Comment => (column.comment_text().is_some()
                        || column.is_change())
                    .then(|| Command::ColumnComment {
                        column: column.renamed_to().unwrap_or(column.name()).to_string(),
                        comment: column.comment_text().map(str::to_string),
                    }),
                })
                .collect();

            for command in synthesized {
                if !self.commands.contains(&command) {
                    trace!(
                        table = %self.table,
                        command = command.name(),
                        "Synthesized fluent command"
                    );
                    self.commands.push(command);
                }
            }
        }
    }

    /// Runs the synthesis pass and compiles every command, in order.
    ///
    /// # Errors
    ///
    /// Fails on the first command the grammar cannot compile.
    pub fn to_sql(
        &mut self,
        connection: &dyn Connection,
        grammar: &dyn Grammar,
    ) -> Result<Vec<String>> {
        self.add_implied_commands(grammar);

        let mut statements = Vec::new();
        for command in &self.commands {
            statements.extend(grammar.compile(self, command, connection)?);
        }
        Ok(statements)
    }
}

fn rename_in(columns: &mut [String], from: &str, to: &str) {
    for name in columns.iter_mut().filter(|name| name.as_str() == from) {
        *name = to.to_string();
    }
}

/// `{prefix}{table}_{columns}_{suffix}`, lowercased, `-` and `.` replaced.
fn index_name(prefix: &str, table: &str, suffix: &str, columns: &[String]) -> String {
    let mut parts = vec![format!("{prefix}{table}")];
    parts.extend(columns.iter().cloned());
    parts.push(suffix.to_string());
    parts.join("_").to_lowercase().replace(['-', '.'], "_")
}

/// `user_id` -> `users`, `category_id` -> `categories`.
fn infer_referenced_table(column: &str, referenced_column: &str) -> String {
    let suffix = format!("_{referenced_column}");
    let base = column.strip_suffix(suffix.as_str()).unwrap_or(column);
    pluralize(base)
}

fn pluralize(name: &str) -> String {
    if name.ends_with('s') || name.ends_with('x') || name.ends_with("ch") || name.ends_with("sh") {
        format!("{name}es")
    } else if name.ends_with('y') && !["ay", "ey", "oy", "uy"].iter().any(|v| name.ends_with(v)) {
        let mut s = name.to_string();
        s.pop();
        format!("{s}ies")
    } else {
        format!("{name}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Dialect;

    #[test]
    fn test_factories_return_column() {
        let mut table = Blueprint::new("posts");
        table.string("title", 255).nullable();
        table.decimal("price", 10, 2).unsigned();

        assert_eq!(table.columns().len(), 2);
        assert!(table.columns()[0].is_nullable());
        assert!(table.columns()[1].is_unsigned());
    }

    #[test]
    fn test_id_is_unsigned_auto_increment() {
        let mut table = Blueprint::new("posts");
        let id = table.id();
        assert_eq!(id.kind(), &ColumnType::BigInteger);
        assert!(id.is_unsigned());
        assert!(id.is_auto_increment());
    }

    #[test]
    fn test_add_column_by_name() {
        let mut table = Blueprint::new("posts");
        assert!(table.add_column("string", "title").is_ok());
        assert_eq!(
            table.add_column("money", "price").map(|c| c.name().to_string()),
            Err(SchemaError::UnknownColumnType("money".to_string()))
        );
        assert_eq!(table.columns().len(), 1);
    }

    #[test]
    fn test_default_index_names() {
        let mut table = Blueprint::with_prefix("Blog-Posts", "app_");
        let index = table.unique(&["Slug", "site.id"]);
        assert_eq!(index.index, "app_blog_posts_slug_site_id_unique");

        let mut table = Blueprint::new("posts");
        assert_eq!(table.foreign(&["user_id"]).index(), "posts_user_id_foreign");
    }

    #[test]
    fn test_fluent_indexes_are_synthesized_once() {
        let mut table = Blueprint::new("posts");
        table.create();
        table.id().primary();
        table.string("slug", 255).unique();
        table.string("email", 255).index_named("posts_email_idx");
        table.string("body", 255).fulltext().index();
        table.geometry("area", None, None).spatial_index();

        let grammar = Dialect::MySql.grammar();
        table.add_implied_commands(grammar.as_ref());
        table.add_implied_commands(grammar.as_ref());

        let names: Vec<(IndexKind, &str)> = table
            .commands()
            .iter()
            .filter_map(Command::as_index)
            .map(|index| (index.kind, index.index.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                (IndexKind::Unique, "posts_slug_unique"),
                (IndexKind::Index, "posts_email_idx"),
                (IndexKind::Index, "posts_body_index"),
                (IndexKind::Spatial, "posts_area_spatialindex"),
            ]
        );
    }

    #[test]
    fn test_unique_flag_beside_inlined_primary() {
        let mut table = Blueprint::new("users");
        table.create();
        table.id().primary().unique();

        let grammar = Dialect::Sqlite.grammar();
        table.add_implied_commands(grammar.as_ref());
        table.add_implied_commands(grammar.as_ref());

        let names: Vec<&str> = table.commands().iter().map(Command::name).collect();
        assert_eq!(names, vec!["create", "unique"]);
        let index = table.commands()[1].as_index().unwrap();
        assert_eq!(index.index, "users_id_unique");
        assert_eq!(index.columns, vec!["id".to_string()]);
    }

    #[test]
    fn test_columns_before_follow_earlier_commands() {
        let mut table = Blueprint::new("users");
        table.string("nickname", 50);
        table.rename_column("name", "full_name");
        table.drop_column("email");
        table.add_implied_commands(Dialect::Sqlite.grammar().as_ref());

        let listing = || vec!["id".to_string(), "name".to_string(), "email".to_string()];
        let commands = table.commands();
        assert_eq!(table.columns_before(&commands[0], listing()), listing());
        assert_eq!(
            table.columns_before(&commands[2], listing()),
            vec!["id", "full_name", "email", "nickname"]
        );
        assert_eq!(
            table.columns_before(&commands[1], listing()),
            vec!["id", "name", "email", "nickname"]
        );
    }

    #[test]
    fn test_false_flag_on_changed_column_drops_index() {
        let mut table = Blueprint::new("users");
        table.string("email", 255).change().without_index(IndexKind::Unique);

        table.add_implied_commands(Dialect::Postgres.grammar().as_ref());
        assert_eq!(
            table.commands(),
            &[
                Command::Change,
                Command::DropIndex {
                    kind: IndexKind::Unique,
                    index: "users_email_unique".to_string()
                },
                Command::ColumnComment {
                    column: "email".to_string(),
                    comment: None
                },
            ]
        );
    }

    #[test]
    fn test_implied_add_and_change_order() {
        let mut table = Blueprint::new("users");
        table.string("nickname", 50);
        table.string("name", 100).change();
        table.drop_column("legacy");

        table.add_implied_commands(Dialect::Sqlite.grammar().as_ref());
        let names: Vec<&str> = table.commands().iter().map(Command::name).collect();
        assert_eq!(names, vec!["change", "add", "dropColumn"]);
    }

    #[test]
    fn test_constrained_infers_table() {
        let mut table = Blueprint::new("posts");
        table.foreign_id("category_id").constrained().cascade_on_delete();
        table.foreign_id("author_id").constrained_on("users", "id");

        table.add_implied_commands(Dialect::MySql.grammar().as_ref());
        let foreign: Vec<&ForeignKeyDefinition> = table.foreign_commands().collect();
        assert_eq!(foreign.len(), 2);
        assert_eq!(foreign[0].index(), "posts_category_id_foreign");
        assert_eq!(foreign[0].referenced_table(), Some("categories"));
        assert_eq!(foreign[0].referenced_columns(), vec!["id".to_string()]);
        assert_eq!(foreign[1].referenced_table(), Some("users"));
    }

    #[test]
    fn test_fluent_commands_follow_grammar() {
        let mut table = Blueprint::new("users");
        table.create();
        table.id().starting_value(1000);
        table.string("name", 255).comment("display name");

        let mut sqlite = table.clone();
        sqlite.add_implied_commands(Dialect::Sqlite.grammar().as_ref());
        assert_eq!(sqlite.commands(), &[Command::Create]);

        table.add_implied_commands(Dialect::Postgres.grammar().as_ref());
        table.add_implied_commands(Dialect::Postgres.grammar().as_ref());
        assert_eq!(
            table.commands(),
            &[
                Command::Create,
                Command::AutoIncrementStartingValue {
                    column: "id".to_string(),
                    value: 1000
                },
                Command::ColumnComment {
                    column: "name".to_string(),
                    comment: Some("display name".to_string())
                },
            ]
        );
    }

    #[test]
    fn test_remove_column() {
        let mut table = Blueprint::new("users");
        table.string("name", 255);
        table.string("email", 255).unique();
        table.remove_column("email").remove_column("missing");

        table.add_implied_commands(Dialect::MySql.grammar().as_ref());
        assert_eq!(table.columns().len(), 1);
        assert!(table.commands().iter().all(|c| c.as_index().is_none()));
    }

    #[test]
    fn test_after_chains_columns() {
        let mut table = Blueprint::new("users");
        table.after("email", |table| {
            table.string("address_line1", 255);
            table.string("address_line2", 255);
        });
        table.string("city", 255);

        let after: Vec<Option<&str>> = table
            .columns()
            .iter()
            .map(ColumnDefinition::after_column)
            .collect();
        assert_eq!(after, vec![Some("email"), Some("address_line1"), None]);
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("address"), "addresses");
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let mut table = Blueprint::new("users");
        table.create();
        table.string("email", 255).unique();

        let json = serde_json::to_string(&table).unwrap();
        let restored: Blueprint = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, table);
    }
}
