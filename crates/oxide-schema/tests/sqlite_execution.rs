//! Runs compiled SQLite statements against an in-memory database.

mod common;
use common::*;

use oxide_schema::prelude::*;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

async fn create_test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool")
}

async fn execute(pool: &SqlitePool, statements: &[String]) {
    for sql in statements {
        sqlx::query(sql)
            .execute(pool)
            .await
            .unwrap_or_else(|e| panic!("Failed to execute: {sql}\nError: {e}"));
    }
}

async fn server_version(pool: &SqlitePool) -> String {
    let row: (String,) = sqlx::query_as("select sqlite_version()")
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

/// Reads the structure of `table` back from the database.
async fn table_schema(pool: &SqlitePool, table: &str) -> TableSchema {
    let (sql,): (String,) =
        sqlx::query_as("select sql from sqlite_master where type = 'table' and name = ?1")
            .bind(table)
            .fetch_one(pool)
            .await
            .unwrap_or_else(|e| panic!("Failed to read table {table}: {e}"));

    let rows: Vec<(String, String, i64, Option<String>, i64)> = sqlx::query_as(
        "select name, type, \"notnull\", dflt_value, pk from pragma_table_info(?1) order by cid",
    )
    .bind(table)
    .fetch_all(pool)
    .await
    .unwrap();

    let mut keyed: Vec<(i64, String)> = Vec::new();
    let mut schema = TableSchema::new(table);
    for (name, sql_type, not_null, default, pk) in rows {
        let mut column = ColumnSchema::new(&name, sql_type);
        column.nullable = not_null == 0;
        column.default = default;
        column.auto_increment = pk > 0 && sql.contains("autoincrement");
        if pk > 0 {
            keyed.push((pk, name));
        }
        schema = schema.column(column);
    }
    keyed.sort();
    schema.primary_key = keyed.into_iter().map(|(_, name)| name).collect();

    let indexes: Vec<(String, i64)> = sqlx::query_as(
        "select name, \"unique\" from pragma_index_list(?1) where origin = 'c' order by name",
    )
    .bind(table)
    .fetch_all(pool)
    .await
    .unwrap();
    for (name, unique) in indexes {
        let columns: Vec<(String,)> =
            sqlx::query_as("select name from pragma_index_info(?1) order by seqno")
                .bind(&name)
                .fetch_all(pool)
                .await
                .unwrap();
        let columns: Vec<&str> = columns.iter().map(|(column,)| column.as_str()).collect();
        schema = schema.index(IndexSchema::new(&name, &columns, unique != 0));
    }

    let foreign: Vec<(i64, String, String, String, String, String)> = sqlx::query_as(
        "select id, \"table\", \"from\", \"to\", on_update, on_delete \
         from pragma_foreign_key_list(?1) order by id, seq",
    )
    .bind(table)
    .fetch_all(pool)
    .await
    .unwrap();
    let mut current: Option<(i64, ForeignKeySchema)> = None;
    for (id, references, from, to, on_update, on_delete) in foreign {
        if let Some((key, existing)) = current.as_mut() {
            if *key == id {
                existing.columns.push(from);
                existing.references_columns.push(to);
                continue;
            }
        }
        if let Some((_, done)) = current.take() {
            schema = schema.foreign_key(done);
        }
        let key = ForeignKeySchema::new(&[from.as_str()], references, &[to.as_str()])
            .on_delete(on_delete.parse().unwrap())
            .on_update(on_update.parse().unwrap());
        current = Some((id, key));
    }
    if let Some((_, done)) = current {
        schema = schema.foreign_key(done);
    }
    schema
}

async fn column_names(pool: &SqlitePool, table: &str) -> Vec<String> {
    let rows: Vec<(String,)> =
        sqlx::query_as("select name from pragma_table_info(?1) order by cid")
            .bind(table)
            .fetch_all(pool)
            .await
            .unwrap();
    rows.into_iter().map(|(name,)| name).collect()
}

async fn seed_users(pool: &SqlitePool) {
    let mut table = Blueprint::new("users");
    table.create();
    table.id();
    table.string("name", 255);
    table.string("email", 255).nullable().unique();
    execute(pool, &compile(Dialect::Sqlite, &mut table)).await;

    sqlx::query("insert into users (name, email) values ('Ada', 'ada@example.com')")
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn rebuilt_rename_keeps_rows() {
    let pool = create_test_pool().await;
    seed_users(&pool).await;

    let mut table = Blueprint::new("users");
    table.rename_column("name", "full_name");
    let statements = compile_with(&sqlite_users("3.24.0"), &mut table);
    assert_eq!(statements.len(), 6);
    execute(&pool, &statements).await;

    let row: (i64, String, Option<String>) =
        sqlx::query_as("select id, full_name, email from users")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(row, (1, "Ada".to_string(), Some("ada@example.com".to_string())));

    let temp: Option<(String,)> =
        sqlx::query_as("select name from sqlite_master where name = '__temp__users'")
            .fetch_optional(&pool)
            .await
            .unwrap();
    assert!(temp.is_none());
}

#[tokio::test]
async fn native_statements_on_the_bundled_engine() {
    let pool = create_test_pool().await;
    seed_users(&pool).await;
    let version = server_version(&pool).await;
    let connection = ConnectionConfig::new(Dialect::Sqlite)
        .with_server_version(version)
        .with_table("users", &["id", "name", "email"]);

    let mut rename = Blueprint::new("users");
    rename.rename_column("name", "full_name");
    let statements = compile_with(&connection, &mut rename);
    assert_eq!(statements.len(), 1);
    execute(&pool, &statements).await;

    let row: (String,) = sqlx::query_as("select full_name from users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.0, "Ada");
}

#[tokio::test]
async fn rebuilt_change_casts_columns() {
    let pool = create_test_pool().await;
    seed_users(&pool).await;

    let mut table = Blueprint::new("users");
    table.text("name").nullable().rename_to("bio");
    execute(&pool, &compile_with(&sqlite_users("3.45.0"), &mut table)).await;

    let row: (i64, String) = sqlx::query_as("select id, bio from users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row, (1, "Ada".to_string()));
}

#[tokio::test]
async fn added_columns_reference_their_table() {
    let pool = create_test_pool().await;
    seed_users(&pool).await;

    let mut posts = Blueprint::new("posts");
    posts.create();
    posts.id();
    posts.string("title", 255);
    execute(&pool, &compile(Dialect::Sqlite, &mut posts)).await;

    let mut table = Blueprint::new("posts");
    table.foreign_id("user_id").nullable().constrained().null_on_delete();
    table.json("meta").nullable();
    let statements = compile(Dialect::Sqlite, &mut table);
    assert_eq!(statements.len(), 2);
    execute(&pool, &statements).await;

    sqlx::query("insert into posts (title, user_id) values ('Hello', 1)")
        .execute(&pool)
        .await
        .unwrap();
    let row: (String, Option<i64>) = sqlx::query_as("select title, user_id from posts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row, ("Hello".to_string(), Some(1)));
}

#[tokio::test]
async fn rebuilt_change_keeps_keys_and_indexes() {
    let pool = create_test_pool().await;
    seed_users(&pool).await;
    let before = table_schema(&pool, "users").await;
    let connection = ConnectionConfig::new(Dialect::Sqlite)
        .with_server_version("3.45.0")
        .with_schema(before.clone());

    let mut table = Blueprint::new("users");
    table.string("name", 255).default("anon").change();
    execute(&pool, &compile_with(&connection, &mut table)).await;

    let (sql,): (String,) =
        sqlx::query_as("select sql from sqlite_master where type = 'table' and name = 'users'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(sql.contains("\"id\" integer primary key autoincrement not null"));
    assert!(sql.contains("\"name\" varchar not null default 'anon'"));

    let after = table_schema(&pool, "users").await;
    assert_eq!(after.primary_key, before.primary_key);
    assert_eq!(after.indexes, before.indexes);
    assert_eq!(
        after.get_column("name").and_then(|column| column.default.as_deref()),
        Some("'anon'")
    );

    sqlx::query("insert into users (email) values ('grace@example.com')")
        .execute(&pool)
        .await
        .unwrap();
    let row: (i64, String) =
        sqlx::query_as("select id, name from users where email = 'grace@example.com'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(row, (2, "anon".to_string()));

    let duplicate = sqlx::query("insert into users (name, email) values ('Eve', 'ada@example.com')")
        .execute(&pool)
        .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn consecutive_rebuilds_keep_the_unique_index() {
    let pool = create_test_pool().await;
    seed_users(&pool).await;
    let connection = ConnectionConfig::new(Dialect::Sqlite)
        .with_server_version("3.24.0")
        .with_schema(table_schema(&pool, "users").await);

    let mut table = Blueprint::new("users");
    table.rename_column("email", "contact");
    table.drop_column("name");
    let statements = compile_with(&connection, &mut table);
    assert_eq!(statements.len(), 14);
    execute(&pool, &statements).await;

    assert_eq!(column_names(&pool, "users").await, vec!["id", "contact"]);
    let after = table_schema(&pool, "users").await;
    assert_eq!(after.primary_key, vec!["id".to_string()]);
    assert_eq!(
        after.indexes,
        vec![IndexSchema::new("users_email_unique", &["contact"], true)]
    );

    let row: (i64, Option<String>) = sqlx::query_as("select id, contact from users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row, (1, Some("ada@example.com".to_string())));

    sqlx::query("insert into users (contact) values ('grace@example.com')")
        .execute(&pool)
        .await
        .unwrap();
    let duplicate = sqlx::query("insert into users (contact) values ('grace@example.com')")
        .execute(&pool)
        .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn rebuilt_drop_keeps_foreign_keys() {
    let pool = create_test_pool().await;

    let mut teams = Blueprint::new("teams");
    teams.create();
    teams.id();
    teams.string("name", 255);
    execute(&pool, &compile(Dialect::Sqlite, &mut teams)).await;

    let mut users = Blueprint::new("users");
    users.create();
    users.id();
    users.foreign_id("team_id").constrained().cascade_on_delete();
    users.string("nickname", 50).nullable();
    execute(&pool, &compile(Dialect::Sqlite, &mut users)).await;

    let before = table_schema(&pool, "users").await;
    assert_eq!(before.foreign_keys.len(), 1);
    let connection = ConnectionConfig::new(Dialect::Sqlite)
        .with_server_version("3.34.0")
        .with_schema(before.clone());

    let mut table = Blueprint::new("users");
    table.drop_column("nickname");
    execute(&pool, &compile_with(&connection, &mut table)).await;

    let after = table_schema(&pool, "users").await;
    assert_eq!(after.foreign_keys, before.foreign_keys);
    assert_eq!(column_names(&pool, "users").await, vec!["id", "team_id"]);

    for sql in [
        "insert into teams (name) values ('core')",
        "insert into users (team_id) values (1)",
        "delete from teams",
    ] {
        sqlx::query(sql).execute(&pool).await.unwrap();
    }
    let (count,): (i64,) = sqlx::query_as("select count(*) from users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
