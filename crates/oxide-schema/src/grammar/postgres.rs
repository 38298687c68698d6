//! PostgreSQL grammar.

use super::{referential_actions, Dialect, Grammar, Modifier};
use crate::blueprint::Blueprint;
use crate::column::{ColumnDefinition, ColumnType};
use crate::command::{FluentCommand, IndexDefinition};
use crate::connection::Connection;
use crate::error::{Result, SchemaError};
use crate::foreign_key::ForeignKeyDefinition;

const MODIFIERS: &[Modifier] = &[
    Modifier::Collate,
    Modifier::Nullable,
    Modifier::Default,
    Modifier::VirtualAs,
    Modifier::StoredAs,
    Modifier::GeneratedAs,
    Modifier::Increment,
];

const FLUENT_COMMANDS: &[FluentCommand] = &[
    FluentCommand::AutoIncrementStartingValue,
    FluentCommand::Comment,
];

/// Schema grammar for PostgreSQL.
#[derive(Debug, Clone, Default)]
pub struct PostgresGrammar {
    prefix: String,
}

impl PostgresGrammar {
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

    /// Serial pseudo-type for a fresh auto-incrementing integer column.
    fn serial_type(column: &ColumnDefinition) -> Option<&'static str> {
        if !column.is_auto_increment() || column.is_change() || column.identity().is_some() {
            return None;
        }
        match column.kind() {
            ColumnType::TinyInteger | ColumnType::SmallInteger => Some("smallserial"),
            ColumnType::MediumInteger | ColumnType::Integer => Some("serial"),
            ColumnType::BigInteger => Some("bigserial"),
            _ => None,
        }
    }

    fn temporal(base: &str, precision: Option<u8>, zone: &str) -> String {
        match precision {
            Some(precision) => format!("{base}({precision}) {zone} time zone"),
            None => format!("{base} {zone} time zone"),
        }
    }

    fn spatial(base: &str, subtype: Option<&str>, srid: Option<u32>) -> String {
        match (subtype, srid) {
            (Some(subtype), Some(srid)) => format!("{base}({subtype},{srid})"),
            (Some(subtype), None) => format!("{base}({subtype})"),
            (None, _) => base.to_string(),
        }
    }

    fn create_index(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
        algorithm: Option<&str>,
        unique: bool,
    ) -> String {
        format!(
            "create {}index {} on {}{} ({})",
            if unique { "unique " } else { "" },
            self.wrap(&index.index),
            self.wrap_table(blueprint.table()),
            algorithm
                .map(|algorithm| format!(" using {algorithm}"))
                .unwrap_or_default(),
            self.columnize(&index.columns)
        )
    }

    fn alter_column(
        &self,
        blueprint: &Blueprint,
        column: &ColumnDefinition,
        change: &str,
    ) -> String {
        format!(
            "alter table {} alter column {} {}",
            self.wrap_table(blueprint.table()),
            self.wrap(column.name()),
            change
        )
    }
}

/// ` deferrable` / ` not deferrable` and the initial check mode.
fn deferrable_clause(deferrable: Option<bool>, initially_immediate: Option<bool>) -> String {
    let mut sql = String::new();
    match deferrable {
        Some(true) => sql.push_str(" deferrable"),
        Some(false) => sql.push_str(" not deferrable"),
        None => {}
    }
    if deferrable == Some(true) {
        match initially_immediate {
            Some(true) => sql.push_str(" initially immediate"),
            Some(false) => sql.push_str(" initially deferred"),
            None => {}
        }
    }
    sql
}

impl Grammar for PostgresGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn supports_schema_transactions(&self) -> bool {
        true
    }

    fn fluent_commands(&self) -> &'static [FluentCommand] {
        FLUENT_COMMANDS
    }

    fn modifiers(&self) -> &'static [Modifier] {
        MODIFIERS
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    fn type_sql(&self, column: &ColumnDefinition) -> Result<String> {
        if let Some(serial) = Self::serial_type(column) {
            return Ok(serial.to_string());
        }
        let sql = match column.kind() {
            ColumnType::Char { length } => format!("char({length})"),
            ColumnType::String { length } => format!("varchar({length})"),
            ColumnType::TinyText => "varchar(255)".to_string(),
            ColumnType::Text | ColumnType::MediumText | ColumnType::LongText => "text".to_string(),
            ColumnType::TinyInteger | ColumnType::SmallInteger => "smallint".to_string(),
            ColumnType::MediumInteger | ColumnType::Integer => "integer".to_string(),
            ColumnType::BigInteger => "bigint".to_string(),
            ColumnType::Float { precision } => match precision {
                Some(precision) => format!("float({precision})"),
                None => "float".to_string(),
            },
            ColumnType::Double => "double precision".to_string(),
            ColumnType::Decimal { total, places } => format!("decimal({total}, {places})"),
            ColumnType::Boolean => "boolean".to_string(),
            ColumnType::Enum { allowed } => format!(
                "varchar(255) check ({} in ({}))",
                self.wrap(column.name()),
                self.quote_list(allowed)
            ),
            ColumnType::Set { .. } | ColumnType::Computed { .. } => {
                return Err(self.unsupported_type(column))
            }
            ColumnType::Json => "json".to_string(),
            ColumnType::Jsonb => "jsonb".to_string(),
            ColumnType::Date => "date".to_string(),
            ColumnType::DateTime { precision } | ColumnType::Timestamp { precision } => {
                Self::temporal("timestamp", *precision, "without")
            }
            ColumnType::DateTimeTz { precision } | ColumnType::TimestampTz { precision } => {
                Self::temporal("timestamp", *precision, "with")
            }
            ColumnType::Time { precision } => Self::temporal("time", *precision, "without"),
            ColumnType::TimeTz { precision } => Self::temporal("time", *precision, "with"),
            ColumnType::Year => "integer".to_string(),
            ColumnType::Binary { .. } => "bytea".to_string(),
            ColumnType::Uuid => "uuid".to_string(),
            ColumnType::IpAddress => "inet".to_string(),
            ColumnType::MacAddress => "macaddr".to_string(),
            ColumnType::Geometry { subtype, srid } => {
                Self::spatial("geometry", subtype.map(|s| s.as_sql()), *srid)
            }
            ColumnType::Geography { subtype, srid } => {
                Self::spatial("geography", subtype.map(|s| s.as_sql()), srid.or(Some(4326)))
            }
        };
        Ok(sql)
    }

    // -------------------------------------------------------------------------
    // Modifiers
    // -------------------------------------------------------------------------

    fn modify_collate(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(column
            .collation_name()
            .map(|collation| format!(" collate {}", self.wrap_value(collation))))
    }

    fn modify_nullable(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        if column.is_change() {
            return Ok(None);
        }
        let sql = if column.is_nullable() { " null" } else { " not null" };
        Ok(Some(sql.to_string()))
    }

    fn modify_default(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        if column.is_change() {
            return Ok(None);
        }
        Ok(self
            .column_default_sql(column)
            .map(|sql| format!(" default {sql}")))
    }

    fn modify_virtual_as(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        match column.virtual_expression() {
            Some(_) => Err(SchemaError::unsupported(
                self.dialect(),
                "virtual generated columns",
            )),
            None => Ok(None),
        }
    }

    fn modify_stored_as(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(column
            .stored_expression()
            .map(|expression| format!(" generated always as ({expression}) stored")))
    }

    fn modify_generated_as(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        if column.is_change() {
            return Ok(None);
        }
        Ok(column.identity().map(|options| {
            let mut sql = format!(
                " generated {} as identity",
                if column.is_always() { "always" } else { "by default" }
            );
            if let Some(options) = options.filter(|options| !options.is_empty()) {
                sql.push_str(&format!(" ({options})"));
            }
            sql
        }))
    }

    fn modify_increment(
        &self,
        blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        let incrementing = column.is_auto_increment()
            && (column.kind().is_serial() || column.identity().is_some());
        let inline = incrementing && !column.is_change() && blueprint.primary_command().is_none();
        Ok(inline.then(|| " primary key".to_string()))
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    fn compile_create(
        &self,
        blueprint: &Blueprint,
        _connection: &dyn Connection,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "{} table {} ({})",
            if blueprint.is_temporary() {
                "create temporary"
            } else {
                "create"
            },
            self.wrap_table(blueprint.table()),
            self.get_columns(blueprint)?.join(", ")
        )])
    }

    fn compile_add(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let columns = self.get_columns(blueprint)?;
        if columns.is_empty() {
            return Ok(Vec::new());
        }
        let adds = columns
            .iter()
            .map(|column| format!("add column {column}"))
            .collect::<Vec<_>>();
        Ok(vec![format!(
            "alter table {} {}",
            self.wrap_table(blueprint.table()),
            adds.join(", ")
        )])
    }

    /// One statement per changed attribute: type, nullability, default,
    /// then the rename.
    fn compile_change(
        &self,
        blueprint: &Blueprint,
        _connection: &dyn Connection,
    ) -> Result<Vec<String>> {
        let mut statements = Vec::new();
        for column in blueprint.changed_columns() {
            let collate = self.modify_collate(blueprint, column)?.unwrap_or_default();
            let change = format!("type {}{}", self.type_sql(column)?, collate);
            statements.push(self.alter_column(blueprint, column, &change));

            if !column.is_generated() {
                let nullable = if column.is_nullable() {
                    "drop not null"
                } else {
                    "set not null"
                };
                statements.push(self.alter_column(blueprint, column, nullable));
            }

            let generated = column.is_auto_increment()
                || column.identity().is_some()
                || column.is_generated();
            if !generated {
                let default = match self.column_default_sql(column) {
                    Some(sql) => format!("set default {sql}"),
                    None => "drop default".to_string(),
                };
                statements.push(self.alter_column(blueprint, column, &default));
            }

            if let Some(to) = column.renamed_to() {
                statements.push(format!(
                    "alter table {} rename column {} to {}",
                    self.wrap_table(blueprint.table()),
                    self.wrap(column.name()),
                    self.wrap(to)
                ));
            }
        }
        Ok(statements)
    }

    fn compile_primary(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "alter table {} add primary key ({})",
            self.wrap_table(blueprint.table()),
            self.columnize(&index.columns)
        )])
    }

    fn compile_unique(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        if let Some(algorithm) = index.algorithm.as_deref() {
            return Ok(vec![self.create_index(blueprint, index, Some(algorithm), true)]);
        }
        let mut sql = format!(
            "alter table {} add constraint {} unique ({})",
            self.wrap_table(blueprint.table()),
            self.wrap(&index.index),
            self.columnize(&index.columns)
        );
        sql.push_str(&deferrable_clause(index.deferrable, index.initially_immediate));
        Ok(vec![sql])
    }

    fn compile_index(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Ok(vec![self.create_index(blueprint, index, index.algorithm.as_deref(), false)])
    }

    fn compile_fulltext(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        let language = self.quote_string(index.language.as_deref().unwrap_or("english"));
        let vectors = index
            .columns
            .iter()
            .map(|column| format!("to_tsvector({language}, {})", self.wrap(column)))
            .collect::<Vec<_>>();
        Ok(vec![format!(
            "create index {} on {} using gin (({}))",
            self.wrap(&index.index),
            self.wrap_table(blueprint.table()),
            vectors.join(" || ")
        )])
    }

    fn compile_spatial_index(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Ok(vec![self.create_index(blueprint, index, Some("gist"), false)])
    }

    fn compile_drop_primary(&self, blueprint: &Blueprint, _index: &str) -> Result<Vec<String>> {
        let constraint = format!("{}{}_pkey", self.prefix, blueprint.table());
        Ok(vec![format!(
            "alter table {} drop constraint {}",
            self.wrap_table(blueprint.table()),
            self.wrap(&constraint)
        )])
    }

    fn compile_drop_unique(&self, blueprint: &Blueprint, index: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "alter table {} drop constraint {}",
            self.wrap_table(blueprint.table()),
            self.wrap(index)
        )])
    }

    fn compile_drop_index(&self, _blueprint: &Blueprint, index: &str) -> Result<Vec<String>> {
        Ok(vec![format!("drop index {}", self.wrap(index))])
    }

    fn compile_drop_fulltext(&self, blueprint: &Blueprint, index: &str) -> Result<Vec<String>> {
        self.compile_drop_index(blueprint, index)
    }

    fn compile_drop_spatial_index(
        &self,
        blueprint: &Blueprint,
        index: &str,
    ) -> Result<Vec<String>> {
        self.compile_drop_index(blueprint, index)
    }

    fn compile_rename_index(
        &self,
        _blueprint: &Blueprint,
        from: &str,
        to: &str,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "alter index {} rename to {}",
            self.wrap(from),
            self.wrap(to)
        )])
    }

    fn foreign_key_clauses(&self, foreign: &ForeignKeyDefinition) -> Result<String> {
        let mut sql = referential_actions(foreign);
        sql.push_str(&deferrable_clause(
            foreign.deferrable_setting(),
            foreign.initially_immediate_setting(),
        ));
        if foreign.is_not_valid() {
            sql.push_str(" not valid");
        }
        Ok(sql)
    }

    fn compile_drop_foreign(&self, blueprint: &Blueprint, index: &str) -> Result<Vec<String>> {
        self.compile_drop_unique(blueprint, index)
    }

    fn compile_table_comment(&self, blueprint: &Blueprint, comment: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "comment on table {} is {}",
            self.wrap_table(blueprint.table()),
            self.quote_string(comment)
        )])
    }

    fn compile_column_comment(
        &self,
        blueprint: &Blueprint,
        column: &str,
        comment: Option<&str>,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "comment on column {}.{} is {}",
            self.wrap_table(blueprint.table()),
            self.wrap(column),
            comment.map_or_else(|| "NULL".to_string(), |comment| self.quote_string(comment))
        )])
    }

    fn compile_auto_increment_starting_value(
        &self,
        blueprint: &Blueprint,
        column: &str,
        value: i64,
    ) -> Result<Vec<String>> {
        let sequence = format!("{}{}_{}_seq", self.prefix, blueprint.table(), column);
        Ok(vec![format!(
            "alter sequence {} restart with {value}",
            self.wrap_value(&sequence)
        )])
    }

    fn compile_enable_foreign_key_constraints(&self) -> Result<Vec<String>> {
        Ok(vec!["set constraints all immediate".to_string()])
    }

    fn compile_disable_foreign_key_constraints(&self) -> Result<Vec<String>> {
        Ok(vec!["set constraints all deferred".to_string()])
    }
}
