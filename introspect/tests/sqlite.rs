//! End-to-end introspection of a real in-memory SQLite database

#![cfg(feature = "rusqlite")]

use schemagraph_introspect::{
    AdapterRegistry, GraphBuilder, LoaderOptions, QuerySpec, SchemaGraph, SqliteAdapter,
    introspect_query, load_schema,
};
use schemagraph_types::{Dialect, RelKind, TypeMode};

const CREATE_SCHEMA_SQL: &str = r#"
CREATE TABLE authors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE books (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    author_id INTEGER NOT NULL REFERENCES authors ON DELETE CASCADE,
    isbn TEXT UNIQUE,
    price REAL
);

CREATE INDEX books_author_title_idx ON books (author_id, title);

CREATE TABLE book_tags (
    book_id INTEGER NOT NULL REFERENCES books(id),
    tag TEXT NOT NULL,
    PRIMARY KEY (book_id, tag)
);

CREATE VIEW author_names AS SELECT id, name FROM authors;
"#;

fn setup() -> rusqlite::Connection {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(CREATE_SCHEMA_SQL).unwrap();
    conn
}

fn load(conn: &mut rusqlite::Connection, options: &LoaderOptions) -> SchemaGraph {
    load_schema(&AdapterRegistry::builtin(), Dialect::SQLite, conn, options).unwrap()
}

fn leftover_views(conn: &rusqlite::Connection) -> i64 {
    conn.query_row(
        r"SELECT count(*) FROM sqlite_master WHERE name LIKE '\_sg\_%' ESCAPE '\'",
        [],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn relations_and_fields() {
    let mut conn = setup();
    let graph = load(&mut conn, &LoaderOptions::default());

    assert_eq!(graph.schema(), "main");
    let names: Vec<_> = graph.relations().values().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["AuthorName", "Author", "BookTag", "Book"]);

    let books = graph.relation("books").unwrap();
    let fields: Vec<_> = books
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.ty.name.as_str()))
        .collect();
    assert_eq!(
        fields,
        [
            ("ID", "i64"),
            ("Title", "String"),
            ("AuthorID", "i64"),
            ("Isbn", "Option<String>"),
            ("Price", "Option<f64>"),
        ]
    );
    assert_eq!(books.primary_key_field().unwrap().name, "ID");

    let view = graph.relation("author_names").unwrap();
    assert_eq!(view.kind, RelKind::View);
    assert!(view.primary_key.is_none());
}

#[test]
fn manual_primary_keys() {
    let mut conn = setup();
    let graph = load(&mut conn, &LoaderOptions::default());

    // AUTOINCREMENT and rowid aliases are engine-filled
    assert!(!graph.relation("authors").unwrap().manual_primary_key);
    assert!(!graph.relation("books").unwrap().manual_primary_key);
    assert!(graph.relation("book_tags").unwrap().manual_primary_key);
}

#[test]
fn foreign_keys_without_target_column() {
    let mut conn = setup();
    let graph = load(&mut conn, &LoaderOptions::default());

    let fk = &graph.relation("books").unwrap().foreign_keys[0];
    assert_eq!(fk.name, "books_author_id_fkey");
    assert_eq!(fk.accessor, "Author");
    assert_eq!(fk.raw.ref_column, None);
    assert_eq!(fk.raw.on_delete.as_deref(), Some("CASCADE"));
    assert_eq!(graph.field(&fk.ref_field).unwrap().column_name(), "id");

    let fk = &graph.relation("book_tags").unwrap().foreign_keys[0];
    assert_eq!(fk.name, "book_tags_book_id_fkey");
    assert_eq!(fk.ref_type, "Book");
}

#[test]
fn indexes_and_synthesized_primary_keys() {
    let mut conn = setup();
    let graph = load(&mut conn, &LoaderOptions::default());

    let books = graph.relation("books").unwrap();
    let indexes: Vec<_> = books
        .indexes
        .iter()
        .map(|ix| (ix.accessor.as_str(), ix.unique, ix.synthesized))
        .collect();
    assert_eq!(
        indexes,
        [
            ("BooksByAuthorIDTitle", false, false),
            ("BookByIsbn", true, false),
            ("BookByID", true, true),
        ]
    );
    assert_eq!(books.indexes[2].name, "books_id_pkey");

    // composite key is reported as an autoindex, so nothing is synthesized
    let book_tags = graph.relation("book_tags").unwrap();
    assert_eq!(book_tags.indexes.len(), 1);
    assert!(book_tags.indexes[0].primary);
    assert_eq!(book_tags.indexes[0].accessor, "BookTagByBookIDTag");

    assert!(graph.relation("author_names").unwrap().indexes.is_empty());
    assert!(graph.index("authors_id_pkey").is_some());
}

#[test]
fn pointer_mode_and_ignore_lists() {
    let mut conn = setup();
    let options = LoaderOptions {
        mode: TypeMode::Pointer,
        ignore_tables: vec!["AUTHOR_NAMES".to_string()],
        ignore_fields: vec!["Price".to_string()],
        ..LoaderOptions::default()
    };
    let graph = GraphBuilder::new(&SqliteAdapter, &options)
        .build(&mut conn)
        .unwrap();

    assert!(graph.relation("author_names").is_none());
    let books = graph.relation("books").unwrap();
    assert!(books.field_by_column("price").is_none());
    assert_eq!(books.fields[3].ty.name, "Option<Box<String>>");
}

#[test]
fn ad_hoc_query() {
    let mut conn = setup();
    let spec = QuerySpec {
        statement: "SELECT b.id, b.title, a.name AS author_name\n\
                    FROM books b JOIN authors a ON a.id = b.author_id\n\
                    WHERE a.id = %%authorID i64%%"
            .to_string(),
        type_name: "BookWithAuthor".to_string(),
        ..QuerySpec::default()
    };
    let query = introspect_query(&SqliteAdapter, &mut conn, &LoaderOptions::default(), &spec)
        .unwrap();

    assert_eq!(query.name, "BookWithAuthorsByAuthorID");
    assert_eq!(query.statement[2], "WHERE a.id = ?");
    let fields: Vec<_> = query
        .ty
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.ty.name.as_str()))
        .collect();
    assert_eq!(
        fields,
        [("ID", "i64"), ("Title", "String"), ("AuthorName", "String")]
    );

    assert_eq!(leftover_views(&conn), 0);
}

#[test]
fn failed_query_leaves_no_view() {
    let mut conn = setup();
    let spec = QuerySpec {
        statement: "SELECT nope FROM books".to_string(),
        type_name: "Broken".to_string(),
        ..QuerySpec::default()
    };
    assert!(introspect_query(&SqliteAdapter, &mut conn, &LoaderOptions::default(), &spec).is_err());
    assert_eq!(leftover_views(&conn), 0);
}
