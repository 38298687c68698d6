#![allow(dead_code)]

use oxide_schema::prelude::*;

/// Routes compiler logs to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn compile_with(connection: &ConnectionConfig, table: &mut Blueprint) -> Vec<String> {
    init_tracing();
    let grammar = grammar_for(connection);
    table
        .to_sql(connection, grammar.as_ref())
        .unwrap_or_else(|e| panic!("Failed to compile {}: {e}", table.table()))
}

pub fn compile(dialect: Dialect, table: &mut Blueprint) -> Vec<String> {
    compile_with(&ConnectionConfig::new(dialect), table)
}

pub fn compile_err(dialect: Dialect, table: &mut Blueprint) -> SchemaError {
    init_tracing();
    let connection = ConnectionConfig::new(dialect);
    let grammar = grammar_for(&connection);
    table
        .to_sql(&connection, grammar.as_ref())
        .expect_err(&format!("Expected {dialect} to reject {}", table.table()))
}

/// `posts` with an incrementing `id` primary key, a required `title` and
/// a unique `slug`.
pub fn posts() -> Blueprint {
    let mut table = Blueprint::new("posts");
    table.create();
    table.id().primary();
    table.string("title", 255);
    table.string("slug", 255).unique();
    table
}

/// A SQLite connection that knows the columns of `users`.
pub fn sqlite_users(version: &str) -> ConnectionConfig {
    ConnectionConfig::new(Dialect::Sqlite)
        .with_server_version(version)
        .with_table("users", &["id", "name", "email"])
}
