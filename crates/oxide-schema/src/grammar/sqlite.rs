//! SQLite grammar.
//!
//! SQLite has no `alter column`, and native `rename column` and
//! `drop column` only exist from 3.25.0 and 3.35.0. Anything the engine
//! cannot alter in place rebuilds the table: the rows are copied into a
//! temporary table with the new shape, the original is dropped and the
//! copy renamed into its place.
//!
//! When the connection knows the table's [`TableSchema`], the temporary
//! table is declared column by column with the blueprint's earlier commands
//! and the rebuilding command applied, so keys, defaults and foreign keys
//! survive, and the secondary indexes are created again after the swap.
//! With only a column listing the copy is a `create table ... as select`,
//! which keeps rows and column names but no constraints.

use tracing::{debug, warn};

use super::{referenced_table, Dialect, Grammar, Modifier};
use crate::blueprint::Blueprint;
use crate::column::{ColumnDefinition, ColumnType};
use crate::command::{Command, IndexDefinition, IndexKind};
use crate::connection::{Connection, ServerVersion};
use crate::error::{Result, SchemaError};
use crate::foreign_key::ForeignKeyDefinition;
use crate::schema::{ColumnSchema, ForeignKeySchema, IndexSchema, TableSchema};

const MODIFIERS: &[Modifier] = &[
    Modifier::Increment,
    Modifier::Nullable,
    Modifier::Default,
    Modifier::Collate,
    Modifier::VirtualAs,
    Modifier::StoredAs,
];

/// First version with `alter table ... rename column`.
const RENAME_COLUMN_VERSION: ServerVersion = ServerVersion::new(3, 25, 0);

/// First version with `alter table ... drop column`.
const DROP_COLUMN_VERSION: ServerVersion = ServerVersion::new(3, 35, 0);

const TEMP_TABLE_PREFIX: &str = "__temp__";

const FOREIGN_KEYS_ON: &str = "pragma foreign_keys = on";
const FOREIGN_KEYS_OFF: &str = "pragma foreign_keys = off";

/// How listed columns are carried over by a `create table ... as select` copy.
#[derive(Debug, Default)]
struct Reshape<'a> {
    dropped: &'a [String],
    renamed: Vec<(&'a str, &'a str)>,
    changed: Vec<&'a ColumnDefinition>,
}

/// A column of a table being rebuilt.
#[derive(Debug, Clone)]
struct TableColumn {
    name: String,
    /// Column of the current table holding this column's rows.
    source: Option<String>,
    /// Type and modifiers.
    definition: String,
    auto_increment: bool,
}

/// Working structure of a table while a blueprint's commands run.
#[derive(Debug, Clone)]
struct TableShape {
    columns: Vec<TableColumn>,
    primary_key: Vec<String>,
    foreign_keys: Vec<ForeignKeySchema>,
    indexes: Vec<IndexSchema>,
}

impl TableShape {
    fn rename(&mut self, from: &str, to: &str) {
        let rename = |name: &mut String| {
            if name.as_str() == from {
                *name = to.to_string();
            }
        };
        self.columns.iter_mut().for_each(|column| rename(&mut column.name));
        self.primary_key.iter_mut().for_each(rename);
        for foreign in &mut self.foreign_keys {
            foreign.columns.iter_mut().for_each(rename);
        }
        for index in &mut self.indexes {
            index.columns.iter_mut().for_each(rename);
        }
    }

    /// Removes columns along with every key and index using them.
    fn drop_columns(&mut self, dropped: &[String]) {
        let kept = |columns: &[String]| !columns.iter().any(|c| dropped.contains(c));
        self.columns.retain(|column| !dropped.contains(&column.name));
        self.primary_key.retain(|column| !dropped.contains(column));
        self.foreign_keys.retain(|foreign| kept(foreign.columns.as_slice()));
        self.indexes.retain(|index| kept(index.columns.as_slice()));
    }

    fn set_column(&mut self, column: TableColumn) {
        if column.auto_increment {
            self.primary_key = vec![column.name.clone()];
        }
        match self.columns.iter_mut().find(|existing| existing.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }
}

/// Schema grammar for SQLite.
#[derive(Debug, Clone, Default)]
pub struct SqliteGrammar {
    prefix: String,
}

impl SqliteGrammar {
    /// Creates a grammar without table prefix.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prefix: String::new(),
        }
    }

    /// Creates a grammar with a table prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Whether the connected engine is at least `minimum`. An unknown
    /// version counts as current.
    fn supports(
        &self,
        blueprint: &Blueprint,
        connection: &dyn Connection,
        minimum: ServerVersion,
        operation: &str,
    ) -> bool {
        let native = connection
            .server_version()
            .and_then(ServerVersion::parse)
            .map_or(true, |version| version.at_least(minimum));
        debug!(
            table = %blueprint.table(),
            operation,
            native,
            "Selected column alteration strategy"
        );
        native
    }

    fn temp_table(&self, blueprint: &Blueprint) -> String {
        self.wrap_value(&format!(
            "{TEMP_TABLE_PREFIX}{}{}",
            self.prefix,
            blueprint.table()
        ))
    }

    /// Rebuilds the table for `command`, from its full structure when the
    /// connection has it and from its column listing otherwise.
    fn rebuild(
        &self,
        blueprint: &Blueprint,
        command: Option<&Command>,
        connection: &dyn Connection,
        reshape: &Reshape<'_>,
    ) -> Result<Vec<String>> {
        if let (Some(command), Some(schema)) =
            (command, connection.table_schema(blueprint.table()))
        {
            let before = self.shape_before(blueprint, command, &schema)?;
            let mut after = before.clone();
            self.apply(&mut after, blueprint, command)?;
            return Ok(self.recreate_table(blueprint, &after));
        }

        let Some(listing) = connection.column_listing(blueprint.table()) else {
            return Err(SchemaError::unsupported(
                self.dialect(),
                "rebuilding a table whose columns are unknown",
            ));
        };
        if let Some((column, modifier)) = reshape
            .changed
            .iter()
            .find_map(|column| uncarried(column).map(|modifier| (column, modifier)))
        {
            return Err(SchemaError::unsupported(
                self.dialect(),
                format!(
                    "changing {} to {modifier} without the table schema",
                    column.name()
                ),
            ));
        }
        warn!(
            table = %blueprint.table(),
            "No table schema, rebuilt table keeps its rows but not its keys or indexes"
        );
        let listing = match command {
            Some(command) => blueprint.columns_before(command, listing),
            None => listing,
        };
        self.copy_table(blueprint, &listing, reshape)
    }

    /// The structure `command` finds: the connection's schema with every
    /// earlier command of the blueprint applied.
    fn shape_before(
        &self,
        blueprint: &Blueprint,
        command: &Command,
        schema: &TableSchema,
    ) -> Result<TableShape> {
        let mut shape = TableShape {
            columns: schema
                .columns
                .iter()
                .map(|column| TableColumn {
                    name: column.name.clone(),
                    source: None,
                    definition: self.schema_definition(column),
                    auto_increment: column.auto_increment,
                })
                .collect(),
            primary_key: schema.primary_key.clone(),
            foreign_keys: schema.foreign_keys.clone(),
            indexes: schema.indexes.clone(),
        };
        for earlier in blueprint.commands() {
            if std::ptr::eq(earlier, command) {
                break;
            }
            self.apply(&mut shape, blueprint, earlier)?;
        }
        for column in &mut shape.columns {
            column.source = Some(column.name.clone());
        }
        Ok(shape)
    }

    /// Applies the structural effect of one command.
    fn apply(
        &self,
        shape: &mut TableShape,
        blueprint: &Blueprint,
        command: &Command,
    ) -> Result<()> {
        match command {
            Command::Add => {
                for column in blueprint.added_columns() {
                    shape.set_column(self.table_column(blueprint, column, None)?);
                    if let Some(foreign) = Self::added_column_foreign(blueprint, column.name()) {
                        shape.foreign_keys.push(ForeignKeySchema {
                            columns: foreign.columns().to_vec(),
                            references_table: format!(
                                "{}{}",
                                self.prefix,
                                referenced_table(blueprint, foreign)?
                            ),
                            references_columns: foreign.referenced_columns(),
                            on_delete: foreign.on_delete_action(),
                            on_update: foreign.on_update_action(),
                        });
                    }
                }
            }
            Command::Change => {
                for column in blueprint.changed_columns() {
                    let Some(existing) = shape.columns.iter().find(|c| c.name == column.name())
                    else {
                        return Err(SchemaError::InvalidColumnReference {
                            table: blueprint.table().to_string(),
                            column: column.name().to_string(),
                            command: command.name().to_string(),
                        });
                    };
                    let source = existing.source.clone();
                    shape.set_column(self.table_column(blueprint, column, source)?);
                    if let Some(to) = column.renamed_to() {
                        shape.rename(column.name(), to);
                    }
                }
            }
            Command::RenameColumn { from, to } => shape.rename(from, to),
            Command::DropColumn { columns } => shape.drop_columns(columns),
            Command::Index(index)
                if matches!(index.kind, IndexKind::Unique | IndexKind::Index) =>
            {
                shape.indexes.push(IndexSchema {
                    name: index.index.clone(),
                    columns: index.columns.clone(),
                    unique: index.kind == IndexKind::Unique,
                });
            }
            Command::DropIndex { index, .. } => {
                shape.indexes.retain(|existing| existing.name != *index);
            }
            _ => {}
        }
        Ok(())
    }

    fn table_column(
        &self,
        blueprint: &Blueprint,
        column: &ColumnDefinition,
        source: Option<String>,
    ) -> Result<TableColumn> {
        Ok(TableColumn {
            name: column.name().to_string(),
            source,
            definition: self.column_definition(blueprint, column)?,
            auto_increment: column.kind().is_serial() && column.is_auto_increment(),
        })
    }

    /// Type and modifiers of an existing column, in modifier order.
    fn schema_definition(&self, column: &ColumnSchema) -> String {
        let mut sql = column.sql_type.clone();
        if column.auto_increment {
            sql.push_str(" primary key autoincrement");
        }
        if !column.nullable {
            sql.push_str(" not null");
        }
        if let Some(default) = &column.default {
            sql.push_str(&format!(" default {default}"));
        }
        if let Some(collation) = &column.collation {
            sql.push_str(&format!(" collate {}", self.quote_string(collation)));
        }
        sql
    }

    /// The six statements swapping in a table declared as `shape`, then the
    /// statements creating its indexes again.
    fn recreate_table(&self, blueprint: &Blueprint, shape: &TableShape) -> Vec<String> {
        let table = self.wrap_table(blueprint.table());
        let temp = self.temp_table(blueprint);

        let mut body: Vec<String> = shape
            .columns
            .iter()
            .map(|column| format!("{} {}", self.wrap(&column.name), column.definition))
            .collect();
        if !shape.primary_key.is_empty() && !shape.columns.iter().any(|c| c.auto_increment) {
            body.push(format!("primary key ({})", self.columnize(&shape.primary_key)));
        }
        for foreign in &shape.foreign_keys {
            let mut sql = format!(
                "foreign key ({}) references {} ({})",
                self.columnize(&foreign.columns),
                self.wrap(&foreign.references_table),
                self.columnize(&foreign.references_columns)
            );
            if let Some(action) = foreign.on_delete {
                sql.push_str(&format!(" on delete {action}"));
            }
            if let Some(action) = foreign.on_update {
                sql.push_str(&format!(" on update {action}"));
            }
            body.push(sql);
        }

        let (targets, sources): (Vec<String>, Vec<String>) = shape
            .columns
            .iter()
            .filter_map(|column| Some((column.name.clone(), column.source.clone()?)))
            .unzip();

        let mut statements = vec![
            FOREIGN_KEYS_OFF.to_string(),
            format!("create table {temp} ({})", body.join(", ")),
            format!(
                "insert into {temp} ({}) select {} from {table}",
                self.columnize(&targets),
                self.columnize(&sources)
            ),
            format!("drop table {table}"),
            format!("alter table {temp} rename to {table}"),
            FOREIGN_KEYS_ON.to_string(),
        ];
        statements.extend(shape.indexes.iter().map(|index| {
            format!(
                "create {}index {} on {table} ({})",
                if index.unique { "unique " } else { "" },
                self.wrap(&index.name),
                self.columnize(&index.columns)
            )
        }));
        statements
    }

    /// Column list of a `create table ... as select` copy.
    fn projection(&self, listing: &[String], reshape: &Reshape<'_>) -> Result<String> {
        let mut columns = Vec::new();
        for name in listing.iter().filter(|name| !reshape.dropped.contains(*name)) {
            let target = reshape
                .renamed
                .iter()
                .find(|(from, _)| *from == name.as_str())
                .map_or(name.as_str(), |(_, to)| *to);
            let changed = reshape.changed.iter().find(|column| column.name() == name);
            columns.push(match changed {
                Some(column) => format!(
                    "cast({} as {}) as {}",
                    self.wrap(name),
                    self.type_sql(column)?,
                    self.wrap(target)
                ),
                None if target != name.as_str() => {
                    format!("{} as {}", self.wrap(name), self.wrap(target))
                }
                None => self.wrap(name),
            });
        }
        Ok(columns.join(", "))
    }

    /// The six statements of a copy through `create table ... as select`.
    fn copy_table(
        &self,
        blueprint: &Blueprint,
        listing: &[String],
        reshape: &Reshape<'_>,
    ) -> Result<Vec<String>> {
        let table = self.wrap_table(blueprint.table());
        let temp = self.temp_table(blueprint);
        let projection = self.projection(listing, reshape)?;

        Ok(vec![
            FOREIGN_KEYS_OFF.to_string(),
            format!("create table {temp} as select {projection} from {table} where 0"),
            format!("insert into {temp} select {projection} from {table}"),
            format!("drop table {table}"),
            format!("alter table {temp} rename to {table}"),
            FOREIGN_KEYS_ON.to_string(),
        ])
    }

    /// `foreign key (cols) references t (cols) ...` inside `create table`.
    fn inline_foreign(
        &self,
        blueprint: &Blueprint,
        foreign: &ForeignKeyDefinition,
    ) -> Result<String> {
        Ok(format!(
            "foreign key ({}) references {} ({}){}",
            self.columnize(foreign.columns()),
            self.wrap_table(referenced_table(blueprint, foreign)?),
            self.columnize(&foreign.referenced_columns()),
            self.foreign_key_clauses(foreign)?
        ))
    }

    /// Foreign key on a single column added by this blueprint; compiled as a
    /// `references` clause of that column.
    fn added_column_foreign<'a>(
        blueprint: &'a Blueprint,
        column: &str,
    ) -> Option<&'a ForeignKeyDefinition> {
        blueprint
            .foreign_commands()
            .find(|foreign| foreign.columns().len() == 1 && foreign.columns()[0] == column)
    }

    fn create_index(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
        unique: bool,
    ) -> String {
        format!(
            "create {}index {} on {} ({})",
            if unique { "unique " } else { "" },
            self.wrap(&index.index),
            self.wrap_table(blueprint.table()),
            self.columnize(&index.columns)
        )
    }
}

/// The command of `blueprint` that `found` accepts.
fn locate<'a>(blueprint: &'a Blueprint, found: impl Fn(&Command) -> bool) -> Option<&'a Command> {
    blueprint.commands().iter().find(|command| found(*command))
}

/// A requested modifier that a `create table ... as select` copy would lose.
fn uncarried(column: &ColumnDefinition) -> Option<&'static str> {
    if column.is_auto_increment() {
        Some("auto-increment")
    } else if !column.is_nullable() {
        Some("not null")
    } else if column.default_value().is_some() || column.uses_current() {
        Some("a default")
    } else if column.collation_name().is_some() {
        Some("a collation")
    } else if column.is_generated() {
        Some("a generated column")
    } else {
        None
    }
}

impl Grammar for SqliteGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn modifiers(&self) -> &'static [Modifier] {
        MODIFIERS
    }

    fn type_sql(&self, column: &ColumnDefinition) -> Result<String> {
        let sql = match column.kind() {
            ColumnType::Char { .. }
            | ColumnType::String { .. }
            | ColumnType::Uuid
            | ColumnType::IpAddress
            | ColumnType::MacAddress => "varchar".to_string(),
            ColumnType::TinyText
            | ColumnType::Text
            | ColumnType::MediumText
            | ColumnType::LongText
            | ColumnType::Json
            | ColumnType::Jsonb => "text".to_string(),
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::MediumInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::Year => "integer".to_string(),
            ColumnType::Float { .. } => "float".to_string(),
            ColumnType::Double => "double".to_string(),
            ColumnType::Decimal { .. } => "numeric".to_string(),
            ColumnType::Boolean => "tinyint(1)".to_string(),
            ColumnType::Enum { allowed } => format!(
                "varchar check ({} in ({}))",
                self.wrap(column.name()),
                self.quote_list(allowed)
            ),
            ColumnType::Date => "date".to_string(),
            ColumnType::DateTime { .. }
            | ColumnType::DateTimeTz { .. }
            | ColumnType::Timestamp { .. }
            | ColumnType::TimestampTz { .. } => "datetime".to_string(),
            ColumnType::Time { .. } | ColumnType::TimeTz { .. } => "time".to_string(),
            ColumnType::Binary { .. } => "blob".to_string(),
            ColumnType::Geometry { subtype, .. } | ColumnType::Geography { subtype, .. } => {
                subtype.map_or("geometry", |subtype| subtype.as_sql()).to_string()
            }
            ColumnType::Set { .. } | ColumnType::Computed { .. } => {
                return Err(self.unsupported_type(column))
            }
        };
        Ok(sql)
    }

    // -------------------------------------------------------------------------
    // Modifiers
    // -------------------------------------------------------------------------

    fn modify_increment(
        &self,
        blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        if column.kind().is_serial() && column.is_auto_increment() {
            return Ok(Some(" primary key autoincrement".to_string()));
        }
        let inline_primary = blueprint.creating()
            && blueprint
                .primary_command()
                .is_some_and(|primary| primary.columns == [column.name()]);
        Ok(inline_primary.then(|| " primary key".to_string()))
    }

    fn modify_nullable(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        let not_null = if column.is_generated() {
            column.is_explicitly_not_null()
        } else {
            !column.is_nullable()
        };
        Ok(not_null.then(|| " not null".to_string()))
    }

    fn modify_collate(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(column
            .collation_name()
            .map(|collation| format!(" collate {}", self.quote_string(collation))))
    }

    fn modify_virtual_as(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(column
            .virtual_expression()
            .map(|expression| format!(" as ({expression})")))
    }

    fn modify_stored_as(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(column
            .stored_expression()
            .map(|expression| format!(" as ({expression}) stored")))
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    fn compile_create(
        &self,
        blueprint: &Blueprint,
        _connection: &dyn Connection,
    ) -> Result<Vec<String>> {
        let mut body = self.get_columns(blueprint)?;
        for foreign in blueprint.foreign_commands() {
            body.push(self.inline_foreign(blueprint, foreign)?);
        }
        if let Some(primary) = blueprint
            .primary_command()
            .filter(|primary| primary.columns.len() > 1)
        {
            body.push(format!("primary key ({})", self.columnize(&primary.columns)));
        }

        Ok(vec![format!(
            "{} table {} ({})",
            if blueprint.is_temporary() {
                "create temporary"
            } else {
                "create"
            },
            self.wrap_table(blueprint.table()),
            body.join(", ")
        )])
    }

    fn compile_add(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let mut statements = Vec::new();
        for column in blueprint.added_columns() {
            let mut sql = format!(
                "alter table {} add column {} {}",
                self.wrap_table(blueprint.table()),
                self.wrap(column.name()),
                self.column_definition(blueprint, column)?
            );
            if let Some(foreign) = Self::added_column_foreign(blueprint, column.name()) {
                sql.push_str(&format!(
                    " references {} ({}){}",
                    self.wrap_table(referenced_table(blueprint, foreign)?),
                    self.columnize(&foreign.referenced_columns()),
                    self.foreign_key_clauses(foreign)?
                ));
            }
            statements.push(sql);
        }
        Ok(statements)
    }

    fn compile_change(
        &self,
        blueprint: &Blueprint,
        connection: &dyn Connection,
    ) -> Result<Vec<String>> {
        let changed: Vec<&ColumnDefinition> = blueprint.changed_columns().collect();
        if changed.is_empty() {
            return Ok(Vec::new());
        }
        debug!(
            table = %blueprint.table(),
            operation = "change",
            native = false,
            "Selected column alteration strategy"
        );
        let command = locate(blueprint, |command| matches!(command, Command::Change));
        let reshape = Reshape {
            renamed: changed
                .iter()
                .filter_map(|&column| column.renamed_to().map(|to| (column.name(), to)))
                .collect(),
            changed,
            ..Reshape::default()
        };
        self.rebuild(blueprint, command, connection, &reshape)
    }

    fn compile_drop_column(
        &self,
        blueprint: &Blueprint,
        columns: &[String],
        connection: &dyn Connection,
    ) -> Result<Vec<String>> {
        if self.supports(blueprint, connection, DROP_COLUMN_VERSION, "dropColumn") {
            return Ok(columns
                .iter()
                .map(|column| {
                    format!(
                        "alter table {} drop column {}",
                        self.wrap_table(blueprint.table()),
                        self.wrap(column)
                    )
                })
                .collect());
        }
        let command = locate(blueprint, |command| {
            matches!(command, Command::DropColumn { columns: own }
                if std::ptr::eq(own.as_slice(), columns))
        });
        let reshape = Reshape {
            dropped: columns,
            ..Reshape::default()
        };
        self.rebuild(blueprint, command, connection, &reshape)
    }

    fn compile_rename_column(
        &self,
        blueprint: &Blueprint,
        from: &str,
        to: &str,
        connection: &dyn Connection,
    ) -> Result<Vec<String>> {
        if self.supports(blueprint, connection, RENAME_COLUMN_VERSION, "renameColumn") {
            return Ok(vec![format!(
                "alter table {} rename column {} to {}",
                self.wrap_table(blueprint.table()),
                self.wrap(from),
                self.wrap(to)
            )]);
        }
        let command = locate(blueprint, |command| {
            matches!(command, Command::RenameColumn { from: own, .. }
                if std::ptr::eq(own.as_str(), from))
        });
        let reshape = Reshape {
            renamed: vec![(from, to)],
            ..Reshape::default()
        };
        self.rebuild(blueprint, command, connection, &reshape)
    }

    fn compile_primary(
        &self,
        blueprint: &Blueprint,
        _index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        // Inlined in the create statement.
        if blueprint.creating() {
            return Ok(Vec::new());
        }
        Err(SchemaError::unsupported(
            self.dialect(),
            "adding a primary key to an existing table",
        ))
    }

    fn compile_unique(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Ok(vec![self.create_index(blueprint, index, true)])
    }

    fn compile_index(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Ok(vec![self.create_index(blueprint, index, false)])
    }

    fn compile_drop_unique(&self, _blueprint: &Blueprint, index: &str) -> Result<Vec<String>> {
        Ok(vec![format!("drop index {}", self.wrap(index))])
    }

    fn compile_drop_index(&self, _blueprint: &Blueprint, index: &str) -> Result<Vec<String>> {
        Ok(vec![format!("drop index {}", self.wrap(index))])
    }

    fn compile_foreign(
        &self,
        blueprint: &Blueprint,
        foreign: &ForeignKeyDefinition,
    ) -> Result<Vec<String>> {
        let inlined = blueprint.creating()
            || blueprint.added_columns().any(|column| {
                Self::added_column_foreign(blueprint, column.name())
                    .is_some_and(|candidate| std::ptr::eq(candidate, foreign))
            });
        if inlined {
            return Ok(Vec::new());
        }
        Err(SchemaError::unsupported(
            self.dialect(),
            "adding a foreign key to an existing table",
        ))
    }

    fn compile_enable_foreign_key_constraints(&self) -> Result<Vec<String>> {
        Ok(vec![FOREIGN_KEYS_ON.to_string()])
    }

    fn compile_disable_foreign_key_constraints(&self) -> Result<Vec<String>> {
        Ok(vec![FOREIGN_KEYS_OFF.to_string()])
    }
}
