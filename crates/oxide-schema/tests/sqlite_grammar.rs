//! Integration tests for the SQLite grammar and its table rebuild.

mod common;
use common::*;

use oxide_schema::prelude::*;

fn assert_rebuild(statements: &[String], projection: &str) {
    assert_eq!(
        statements,
        [
            "pragma foreign_keys = off".to_string(),
            format!("create table \"__temp__users\" as select {projection} from \"users\" where 0"),
            format!("insert into \"__temp__users\" select {projection} from \"users\""),
            "drop table \"users\"".to_string(),
            "alter table \"__temp__users\" rename to \"users\"".to_string(),
            "pragma foreign_keys = on".to_string(),
        ]
    );
}

#[test]
fn posts_inline_the_primary_key() {
    let mut table = posts();

    assert_eq!(
        compile(Dialect::Sqlite, &mut table),
        vec![
            "create table \"posts\" (\"id\" integer primary key autoincrement not null, \
             \"title\" varchar not null, \"slug\" varchar not null)",
            "create unique index \"posts_slug_unique\" on \"posts\" (\"slug\")",
        ]
    );
}

#[test]
fn create_never_rebuilds_on_old_engines() {
    let connection = ConnectionConfig::new(Dialect::Sqlite).with_server_version("3.7.17");
    let mut table = posts();

    let statements = compile_with(&connection, &mut table);

    assert_eq!(statements.len(), 2);
    assert!(statements[0].starts_with("create table \"posts\""));
}

#[test]
fn rename_below_threshold_rebuilds_the_table() {
    let mut table = Blueprint::new("users");
    table.rename_column("name", "full_name");

    let statements = compile_with(&sqlite_users("3.24.0"), &mut table);

    assert_rebuild(&statements, "\"id\", \"name\" as \"full_name\", \"email\"");
}

#[test]
fn rename_at_threshold_is_native() {
    let mut table = Blueprint::new("users");
    table.rename_column("name", "full_name");

    assert_eq!(
        compile_with(&sqlite_users("3.25.0"), &mut table),
        vec!["alter table \"users\" rename column \"name\" to \"full_name\""]
    );
}

#[test]
fn rebuild_order_is_fixed_for_several_columns() {
    let mut dropped = Blueprint::new("users");
    dropped.drop_columns(&["name", "email"]);
    assert_rebuild(&compile_with(&sqlite_users("3.34.0"), &mut dropped), "\"id\"");

    let mut changed = Blueprint::new("users");
    changed.string("name", 100).nullable().change();
    changed.text("email").nullable().rename_to("contact");
    assert_rebuild(
        &compile_with(&sqlite_users("3.45.0"), &mut changed),
        "\"id\", cast(\"name\" as varchar) as \"name\", cast(\"email\" as text) as \"contact\"",
    );
}

#[test]
fn consecutive_rebuilds_see_earlier_commands() {
    let mut table = Blueprint::new("users");
    table.rename_column("name", "full_name");
    table.drop_column("email");

    let statements = compile_with(&sqlite_users("3.24.0"), &mut table);

    assert_eq!(statements.len(), 12);
    assert_rebuild(&statements[..6], "\"id\", \"name\" as \"full_name\", \"email\"");
    assert_rebuild(&statements[6..], "\"id\", \"full_name\"");
}

#[test]
fn references_follow_renames_in_the_same_blueprint() {
    let mut renamed = Blueprint::new("users");
    renamed.rename_column("name", "full_name");
    renamed.index(&["full_name"]);
    let statements = compile_with(&sqlite_users("3.45.0"), &mut renamed);
    assert_eq!(
        statements[1],
        "create index \"users_full_name_index\" on \"users\" (\"full_name\")"
    );

    let mut stale = Blueprint::new("users");
    stale.rename_column("name", "full_name");
    stale.drop_column("name");
    let err = stale
        .to_sql(&sqlite_users("3.45.0"), &SqliteGrammar::new())
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::InvalidColumnReference { ref column, ref command, .. }
            if column == "name" && command == "dropColumn"
    ));
}

#[test]
fn rebuild_from_schema_recreates_the_table() {
    let connection = ConnectionConfig::new(Dialect::Sqlite)
        .with_server_version("3.24.0")
        .with_schema(
            TableSchema::new("users")
                .column(ColumnSchema::new("id", "integer").not_null().auto_increment())
                .column(ColumnSchema::new("name", "varchar").not_null().default("'anon'"))
                .column(ColumnSchema::new("email", "varchar"))
                .index(IndexSchema::new("users_name_index", &["name"], false)),
        );
    let mut table = Blueprint::new("users");
    table.rename_column("name", "full_name");

    assert_eq!(
        compile_with(&connection, &mut table),
        vec![
            "pragma foreign_keys = off",
            "create table \"__temp__users\" (\"id\" integer primary key autoincrement not null, \
             \"full_name\" varchar not null default 'anon', \"email\" varchar)",
            "insert into \"__temp__users\" (\"id\", \"full_name\", \"email\") \
             select \"id\", \"name\", \"email\" from \"users\"",
            "drop table \"users\"",
            "alter table \"__temp__users\" rename to \"users\"",
            "pragma foreign_keys = on",
            "create index \"users_name_index\" on \"users\" (\"full_name\")",
        ]
    );
}

#[test]
fn add_column_statements_are_split() {
    let mut table = Blueprint::new("users");
    table.string("nickname", 50).nullable();
    table.boolean("admin").default(false);
    table.index(&["nickname"]);

    assert_eq!(
        compile(Dialect::Sqlite, &mut table),
        vec![
            "alter table \"users\" add column \"nickname\" varchar",
            "alter table \"users\" add column \"admin\" tinyint(1) not null default 0",
            "create index \"users_nickname_index\" on \"users\" (\"nickname\")",
        ]
    );
}

#[test]
fn unsupported_operations_fail_loudly() {
    let mut primary = Blueprint::new("users");
    primary.drop_primary();
    assert!(matches!(
        compile_err(Dialect::Sqlite, &mut primary),
        SchemaError::UnsupportedFeature { dialect: Dialect::Sqlite, .. }
    ));

    let mut spatial = Blueprint::new("places");
    spatial.spatial_index(&["area"]);
    assert!(matches!(
        compile_err(Dialect::Sqlite, &mut spatial),
        SchemaError::UnsupportedFeature { dialect: Dialect::Sqlite, .. }
    ));

    let mut rename = Blueprint::new("users");
    rename.rename_index("a", "b");
    assert!(matches!(
        compile_err(Dialect::Sqlite, &mut rename),
        SchemaError::UnsupportedFeature { dialect: Dialect::Sqlite, .. }
    ));
}

#[test]
fn pragma_toggles() {
    let grammar = SqliteGrammar::new();

    assert_eq!(
        grammar.compile_disable_foreign_key_constraints().unwrap(),
        vec!["pragma foreign_keys = off"]
    );
    assert_eq!(
        grammar.compile_enable_foreign_key_constraints().unwrap(),
        vec!["pragma foreign_keys = on"]
    );
}
