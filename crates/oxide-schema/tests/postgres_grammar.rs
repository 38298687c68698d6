//! Integration tests for the PostgreSQL grammar.

mod common;
use common::*;

use oxide_schema::prelude::*;

#[test]
fn posts_use_serial_ids_and_unique_constraints() {
    let mut table = posts();

    assert_eq!(
        compile(Dialect::Postgres, &mut table),
        vec![
            "create table \"posts\" (\"id\" bigserial not null primary key, \
             \"title\" varchar(255) not null, \"slug\" varchar(255) not null)",
            "alter table \"posts\" add constraint \"posts_slug_unique\" unique (\"slug\")",
        ]
    );
}

#[test]
fn comments_and_sequences_are_trailing_statements() {
    let mut table = Blueprint::new("users");
    table.create();
    table.id().starting_value(1000);
    table.string("name", 255).comment("Display name");
    table.boolean("active").default(true);
    table.comment("Registered users");

    assert_eq!(
        compile(Dialect::Postgres, &mut table),
        vec![
            "create table \"users\" (\"id\" bigserial not null primary key, \
             \"name\" varchar(255) not null, \"active\" boolean not null default true)",
            "comment on table \"users\" is 'Registered users'",
            "alter sequence \"users_id_seq\" restart with 1000",
            "comment on column \"users\".\"name\" is 'Display name'",
        ]
    );
}

#[test]
fn change_keeps_one_statement_per_attribute() {
    let mut table = Blueprint::new("posts");
    table.integer("votes").default(0).change();
    table.timestamp_tz("published_at", None).nullable().change();

    assert_eq!(
        compile(Dialect::Postgres, &mut table),
        vec![
            "alter table \"posts\" alter column \"votes\" type integer",
            "alter table \"posts\" alter column \"votes\" set not null",
            "alter table \"posts\" alter column \"votes\" set default 0",
            "alter table \"posts\" alter column \"published_at\" type timestamp with time zone",
            "alter table \"posts\" alter column \"published_at\" drop not null",
            "alter table \"posts\" alter column \"published_at\" drop default",
            "comment on column \"posts\".\"votes\" is NULL",
            "comment on column \"posts\".\"published_at\" is NULL",
        ]
    );
}

#[test]
fn spatial_and_fulltext_indexes() {
    let mut table = Blueprint::new("places");
    table.geography("area", Some(GeometryType::Polygon), None);
    table.spatial_index(&["area"]);
    table.fulltext(&["name"]);

    assert_eq!(
        compile(Dialect::Postgres, &mut table),
        vec![
            "alter table \"places\" add column \"area\" geography(polygon,4326) not null",
            "create index \"places_area_spatialindex\" on \"places\" using gist (\"area\")",
            "create index \"places_name_fulltext\" on \"places\" using gin \
             ((to_tsvector('english', \"name\")))",
        ]
    );
}

#[test]
fn deferrable_foreign_keys() {
    let mut table = Blueprint::new("posts");
    table
        .foreign(&["user_id"])
        .on("users")
        .null_on_delete()
        .deferrable(true)
        .initially_immediate(true)
        .not_valid();

    assert_eq!(
        compile(Dialect::Postgres, &mut table),
        vec![
            "alter table \"posts\" add constraint \"posts_user_id_foreign\" \
             foreign key (\"user_id\") references \"users\" (\"id\") on delete set null \
             deferrable initially immediate not valid"
        ]
    );
}

#[test]
fn drops_use_constraints_or_indexes() {
    let mut table = Blueprint::new("posts");
    table.drop_primary();
    table.drop_unique("posts_slug_unique");
    table.drop_index("posts_title_index");
    table.drop_foreign("posts_user_id_foreign");
    table.rename_index("posts_title_index", "posts_headline_index");
    table.drop_if_exists();

    assert_eq!(
        compile(Dialect::Postgres, &mut table),
        vec![
            "alter table \"posts\" drop constraint \"posts_pkey\"",
            "alter table \"posts\" drop constraint \"posts_slug_unique\"",
            "drop index \"posts_title_index\"",
            "alter table \"posts\" drop constraint \"posts_user_id_foreign\"",
            "alter index \"posts_title_index\" rename to \"posts_headline_index\"",
            "drop table if exists \"posts\"",
        ]
    );
}

#[test]
fn set_types_are_unsupported() {
    let mut table = Blueprint::new("posts");
    table.set("flags", &["a", "b"]);

    assert_eq!(
        compile_err(Dialect::Postgres, &mut table),
        SchemaError::UnsupportedColumnType {
            dialect: Dialect::Postgres,
            column: "flags".to_string(),
            kind: "set".to_string(),
        }
    );
}

#[test]
fn constraint_toggles_and_transactions() {
    let grammar = PostgresGrammar::new();

    assert!(grammar.supports_schema_transactions());
    assert_eq!(
        grammar.compile_disable_foreign_key_constraints().unwrap(),
        vec!["set constraints all deferred"]
    );
    assert_eq!(
        grammar.compile_enable_foreign_key_constraints().unwrap(),
        vec!["set constraints all immediate"]
    );
}
