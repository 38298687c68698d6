//! MySQL / MariaDB grammar.

use super::{referential_actions, Dialect, Grammar, Modifier};
use crate::blueprint::Blueprint;
use crate::column::{ColumnDefinition, ColumnType};
use crate::command::{FluentCommand, IndexDefinition, IndexKind};
use crate::connection::Connection;
use crate::error::{Result, SchemaError};
use crate::foreign_key::{ForeignKeyAction, ForeignKeyDefinition};

const MODIFIERS: &[Modifier] = &[
    Modifier::Unsigned,
    Modifier::Charset,
    Modifier::Collate,
    Modifier::VirtualAs,
    Modifier::StoredAs,
    Modifier::Nullable,
    Modifier::Srid,
    Modifier::Default,
    Modifier::OnUpdate,
    Modifier::Invisible,
    Modifier::Increment,
    Modifier::Comment,
    Modifier::After,
    Modifier::First,
];

const FLUENT_COMMANDS: &[FluentCommand] = &[FluentCommand::AutoIncrementStartingValue];

/// Schema grammar for MySQL and MariaDB.
#[derive(Debug, Clone, Default)]
pub struct MySqlGrammar {
    prefix: String,
}

impl MySqlGrammar {
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

    /// `alter table t add <keyword> name[ using algo](cols)`.
    fn compile_key(&self, blueprint: &Blueprint, index: &IndexDefinition, keyword: &str) -> String {
        format!(
            "alter table {} add {} {}{}({})",
            self.wrap_table(blueprint.table()),
            keyword,
            self.wrap(&index.index),
            index
                .algorithm
                .as_ref()
                .map(|algorithm| format!(" using {algorithm}"))
                .unwrap_or_default(),
            self.columnize(&index.columns)
        )
    }

    fn compile_drop_key(&self, blueprint: &Blueprint, index: &str) -> Vec<String> {
        vec![format!(
            "alter table {} drop index {}",
            self.wrap_table(blueprint.table()),
            self.wrap(index)
        )]
    }

    fn with_precision(base: &str, precision: Option<u8>) -> String {
        match precision {
            Some(precision) => format!("{base}({precision})"),
            None => base.to_string(),
        }
    }
}

impl Grammar for MySqlGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn fluent_commands(&self) -> &'static [FluentCommand] {
        FLUENT_COMMANDS
    }

    fn modifiers(&self) -> &'static [Modifier] {
        MODIFIERS
    }

    fn type_sql(&self, column: &ColumnDefinition) -> Result<String> {
        let sql = match column.kind() {
            ColumnType::Char { length } => format!("char({length})"),
            ColumnType::String { length } => format!("varchar({length})"),
            ColumnType::TinyText => "tinytext".to_string(),
            ColumnType::Text => "text".to_string(),
            ColumnType::MediumText => "mediumtext".to_string(),
            ColumnType::LongText => "longtext".to_string(),
            ColumnType::TinyInteger => "tinyint".to_string(),
            ColumnType::SmallInteger => "smallint".to_string(),
            ColumnType::MediumInteger => "mediumint".to_string(),
            ColumnType::Integer => "int".to_string(),
            ColumnType::BigInteger => "bigint".to_string(),
            ColumnType::Float { precision } => Self::with_precision("float", *precision),
            ColumnType::Double => "double".to_string(),
            ColumnType::Decimal { total, places } => format!("decimal({total}, {places})"),
            ColumnType::Boolean => "tinyint(1)".to_string(),
            ColumnType::Enum { allowed } => format!("enum({})", self.quote_list(allowed)),
            ColumnType::Set { allowed } => format!("set({})", self.quote_list(allowed)),
            ColumnType::Json | ColumnType::Jsonb => "json".to_string(),
            ColumnType::Date => "date".to_string(),
            ColumnType::DateTime { precision } | ColumnType::DateTimeTz { precision } => {
                Self::with_precision("datetime", *precision)
            }
            ColumnType::Time { precision } | ColumnType::TimeTz { precision } => {
                Self::with_precision("time", *precision)
            }
            ColumnType::Timestamp { precision } | ColumnType::TimestampTz { precision } => {
                Self::with_precision("timestamp", *precision)
            }
            ColumnType::Year => "year".to_string(),
            ColumnType::Binary { length, fixed } => match (length, fixed) {
                (Some(length), true) => format!("binary({length})"),
                (Some(length), false) => format!("varbinary({length})"),
                (None, _) => "blob".to_string(),
            },
            ColumnType::Uuid => "char(36)".to_string(),
            ColumnType::IpAddress => "varchar(45)".to_string(),
            ColumnType::MacAddress => "varchar(17)".to_string(),
            ColumnType::Geometry { subtype, .. } | ColumnType::Geography { subtype, .. } => {
                subtype.map_or("geometry", |subtype| subtype.as_sql()).to_string()
            }
            // Needs a storage type; use virtual_as/stored_as on a typed column.
            ColumnType::Computed { .. } => return Err(self.unsupported_type(column)),
        };
        Ok(sql)
    }

    fn current_timestamp(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("CURRENT_TIMESTAMP", column.kind().precision())
    }

    // -------------------------------------------------------------------------
    // Modifiers
    // -------------------------------------------------------------------------

    fn modify_unsigned(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        let unsigned = column.is_unsigned() && column.kind().is_numeric();
        Ok(unsigned.then(|| " unsigned".to_string()))
    }

    fn modify_charset(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(column
            .charset_name()
            .map(|charset| format!(" character set {charset}")))
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

    fn modify_nullable(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        // Generated columns only take an explicit not null.
        if column.is_generated() {
            return Ok(column
                .is_explicitly_not_null()
                .then(|| " not null".to_string()));
        }
        let sql = if column.is_nullable() { " null" } else { " not null" };
        Ok(Some(sql.to_string()))
    }

    fn modify_srid(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        let srid = match column.kind() {
            ColumnType::Geometry { srid, .. } | ColumnType::Geography { srid, .. } => *srid,
            _ => None,
        };
        Ok(srid.filter(|srid| *srid > 0).map(|srid| format!(" srid {srid}")))
    }

    fn modify_on_update(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        if column.uses_current_on_update() {
            return Ok(Some(format!(" on update {}", self.current_timestamp(column))));
        }
        Ok(column
            .on_update_expression()
            .map(|expression| format!(" on update {expression}")))
    }

    fn modify_invisible(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(column.is_invisible().then(|| " invisible".to_string()))
    }

    fn modify_increment(
        &self,
        blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        if !(column.kind().is_serial() && column.is_auto_increment()) {
            return Ok(None);
        }
        let keyless = blueprint.primary_command().is_some()
            || (column.is_change() && column.index_flag(IndexKind::Primary).is_none());
        let sql = if keyless {
            " auto_increment"
        } else {
            " auto_increment primary key"
        };
        Ok(Some(sql.to_string()))
    }

    fn modify_comment(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(column
            .comment_text()
            .map(|comment| format!(" comment {}", self.quote_string(comment))))
    }

    fn modify_after(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(column
            .after_column()
            .map(|after| format!(" after {}", self.wrap(after))))
    }

    fn modify_first(
        &self,
        _blueprint: &Blueprint,
        column: &ColumnDefinition,
    ) -> Result<Option<String>> {
        Ok(column.is_first().then(|| " first".to_string()))
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    fn compile_create(
        &self,
        blueprint: &Blueprint,
        connection: &dyn Connection,
    ) -> Result<Vec<String>> {
        let mut body = self.get_columns(blueprint)?;
        if let Some(primary) = blueprint.primary_command() {
            body.push(format!(
                "primary key {}({})",
                primary
                    .algorithm
                    .as_ref()
                    .map(|algorithm| format!("using {algorithm} "))
                    .unwrap_or_default(),
                self.columnize(&primary.columns)
            ));
        }

        let mut sql = format!(
            "{} table {} ({})",
            if blueprint.is_temporary() {
                "create temporary"
            } else {
                "create"
            },
            self.wrap_table(blueprint.table()),
            body.join(", ")
        );

        if let Some(charset) = blueprint
            .table_charset()
            .or_else(|| connection.config("charset"))
        {
            sql.push_str(&format!(" default character set {charset}"));
        }
        if let Some(collation) = blueprint
            .table_collation()
            .or_else(|| connection.config("collation"))
        {
            sql.push_str(&format!(" collate {}", self.quote_string(collation)));
        }
        if let Some(engine) = blueprint
            .table_engine()
            .or_else(|| connection.config("engine"))
        {
            sql.push_str(&format!(" engine = {engine}"));
        }

        Ok(vec![sql])
    }

    fn compile_add(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let columns = self.get_columns(blueprint)?;
        if columns.is_empty() {
            return Ok(Vec::new());
        }
        let adds = columns
            .iter()
            .map(|column| format!("add {column}"))
            .collect::<Vec<_>>();
        Ok(vec![format!(
            "alter table {} {}",
            self.wrap_table(blueprint.table()),
            adds.join(", ")
        )])
    }

    fn compile_change(
        &self,
        blueprint: &Blueprint,
        _connection: &dyn Connection,
    ) -> Result<Vec<String>> {
        let mut changes = Vec::new();
        for column in blueprint.changed_columns() {
            changes.push(format!(
                "change {} {} {}",
                self.wrap(column.name()),
                self.wrap(column.renamed_to().unwrap_or(column.name())),
                self.column_definition(blueprint, column)?
            ));
        }
        if changes.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![format!(
            "alter table {} {}",
            self.wrap_table(blueprint.table()),
            changes.join(", ")
        )])
    }

    fn compile_rename(&self, blueprint: &Blueprint, to: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "rename table {} to {}",
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
            .map(|column| format!("drop {}", self.wrap(column)))
            .collect::<Vec<_>>();
        Ok(vec![format!(
            "alter table {} {}",
            self.wrap_table(blueprint.table()),
            drops.join(", ")
        )])
    }

    fn compile_primary(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        // Already part of the create statement.
        if blueprint.creating() {
            return Ok(Vec::new());
        }
        Ok(vec![format!(
            "alter table {} add primary key {}({})",
            self.wrap_table(blueprint.table()),
            index
                .algorithm
                .as_ref()
                .map(|algorithm| format!("using {algorithm} "))
                .unwrap_or_default(),
            self.columnize(&index.columns)
        )])
    }

    fn compile_unique(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Ok(vec![self.compile_key(blueprint, index, "unique")])
    }

    fn compile_index(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Ok(vec![self.compile_key(blueprint, index, "index")])
    }

    fn compile_fulltext(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Ok(vec![self.compile_key(blueprint, index, "fulltext")])
    }

    fn compile_spatial_index(
        &self,
        blueprint: &Blueprint,
        index: &IndexDefinition,
    ) -> Result<Vec<String>> {
        Ok(vec![self.compile_key(blueprint, index, "spatial index")])
    }

    fn compile_drop_primary(&self, blueprint: &Blueprint, _index: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "alter table {} drop primary key",
            self.wrap_table(blueprint.table())
        )])
    }

    fn compile_drop_unique(&self, blueprint: &Blueprint, index: &str) -> Result<Vec<String>> {
        Ok(self.compile_drop_key(blueprint, index))
    }

    fn compile_drop_index(&self, blueprint: &Blueprint, index: &str) -> Result<Vec<String>> {
        Ok(self.compile_drop_key(blueprint, index))
    }

    fn compile_drop_fulltext(&self, blueprint: &Blueprint, index: &str) -> Result<Vec<String>> {
        Ok(self.compile_drop_key(blueprint, index))
    }

    fn compile_drop_spatial_index(
        &self,
        blueprint: &Blueprint,
        index: &str,
    ) -> Result<Vec<String>> {
        Ok(self.compile_drop_key(blueprint, index))
    }

    fn compile_rename_index(
        &self,
        blueprint: &Blueprint,
        from: &str,
        to: &str,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "alter table {} rename index {} to {}",
            self.wrap_table(blueprint.table()),
            self.wrap(from),
            self.wrap(to)
        )])
    }

    fn foreign_key_clauses(&self, foreign: &ForeignKeyDefinition) -> Result<String> {
        let actions = [foreign.on_delete_action(), foreign.on_update_action()];
        if actions.contains(&Some(ForeignKeyAction::SetDefault)) {
            return Err(SchemaError::unsupported(
                self.dialect(),
                "the set default referential action",
            ));
        }
        Ok(referential_actions(foreign))
    }

    fn compile_drop_foreign(&self, blueprint: &Blueprint, index: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "alter table {} drop foreign key {}",
            self.wrap_table(blueprint.table()),
            self.wrap(index)
        )])
    }

    fn compile_table_comment(&self, blueprint: &Blueprint, comment: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "alter table {} comment = {}",
            self.wrap_table(blueprint.table()),
            self.quote_string(comment)
        )])
    }

    fn compile_auto_increment_starting_value(
        &self,
        blueprint: &Blueprint,
        _column: &str,
        value: i64,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "alter table {} auto_increment = {value}",
            self.wrap_table(blueprint.table())
        )])
    }

    fn compile_enable_foreign_key_constraints(&self) -> Result<Vec<String>> {
        Ok(vec!["set foreign_key_checks=1".to_string()])
    }

    fn compile_disable_foreign_key_constraints(&self) -> Result<Vec<String>> {
        Ok(vec!["set foreign_key_checks=0".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionConfig;

    fn compile(table: &mut Blueprint) -> Result<Vec<String>> {
        let connection = ConnectionConfig::new(Dialect::MySql);
        table.to_sql(&connection, &MySqlGrammar::new())
    }

    #[test]
    fn test_wrap_uses_backticks() {
        let grammar = MySqlGrammar::new();
        assert_eq!(grammar.wrap("db.users.id"), "`db`.`users`.`id`");
        assert_eq!(grammar.wrap("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_create_with_increment_and_options() {
        let mut table = Blueprint::new("users");
        table.create();
        table.id();
        table.string("email", 255);
        table.engine("InnoDB").charset("utf8mb4").collation("utf8mb4_unicode_ci");

        assert_eq!(
            compile(&mut table).unwrap(),
            vec![
                "create table `users` (`id` bigint unsigned not null auto_increment primary key, \
                 `email` varchar(255) not null) default character set utf8mb4 \
                 collate 'utf8mb4_unicode_ci' engine = InnoDB"
            ]
        );
    }

    #[test]
    fn test_composite_primary_is_inlined_on_create() {
        let mut table = Blueprint::new("role_user");
        table.create();
        table.unsigned_big_integer("role_id");
        table.unsigned_big_integer("user_id");
        table.primary(&["role_id", "user_id"]);

        assert_eq!(
            compile(&mut table).unwrap(),
            vec![
                "create table `role_user` (`role_id` bigint unsigned not null, \
                 `user_id` bigint unsigned not null, primary key (`role_id`, `user_id`))"
            ]
        );
    }

    #[test]
    fn test_modifier_order() {
        let mut table = Blueprint::new("users");
        table
            .timestamp("seen_at", Some(3))
            .nullable()
            .use_current()
            .use_current_on_update()
            .comment("last visit")
            .after("email");

        assert_eq!(
            compile(&mut table).unwrap(),
            vec![
                "alter table `users` add `seen_at` timestamp(3) null \
                 default CURRENT_TIMESTAMP(3) on update CURRENT_TIMESTAMP(3) \
                 comment 'last visit' after `email`"
            ]
        );
    }

    #[test]
    fn test_change_renames_in_one_statement() {
        let mut table = Blueprint::new("users");
        table.string("name", 100).rename_to("full_name").nullable();

        assert_eq!(
            compile(&mut table).unwrap(),
            vec!["alter table `users` change `name` `full_name` varchar(100) null"]
        );
    }

    #[test]
    fn test_set_default_action_is_rejected() {
        let mut table = Blueprint::new("posts");
        table
            .foreign(&["user_id"])
            .on("users")
            .on_delete(ForeignKeyAction::SetDefault);

        assert!(matches!(
            compile(&mut table),
            Err(SchemaError::UnsupportedFeature { dialect: Dialect::MySql, .. })
        ));
    }

    #[test]
    fn test_computed_needs_a_type() {
        let mut table = Blueprint::new("orders");
        table.computed("total", "price * quantity");

        assert_eq!(
            compile(&mut table),
            Err(SchemaError::UnsupportedColumnType {
                dialect: Dialect::MySql,
                column: "total".to_string(),
                kind: "computed".to_string(),
            })
        );
    }
}
