//! SQL lowering of query specifications.

use dal_core::{
    insert_sql, DescriptorCache, Error, GenericDialect, PostgresDialect, Projection, QuerySpec,
    Record, SqlValue, Table, NO_ARGS,
};
use dal_derive::Record;

#[derive(Debug, Default, Record)]
pub struct Member {
    #[dal("members")]
    dal_table: Table,
    #[dal("id,auto")]
    pub id: i64,
    pub name: String,
    #[dal("joined,omitempty")]
    pub joined: String,
}

// =============================================================================
// SELECT
// =============================================================================

#[test]
fn test_select_without_clauses() {
    let cache = DescriptorCache::new();
    let member = cache.describe::<Member>().unwrap();

    let (sql, params) = QuerySpec::new()
        .to_sql(&member, Projection::Select, &GenericDialect::new())
        .unwrap();
    assert_eq!(
        sql,
        "SELECT members.id, members.name, members.joined FROM members"
    );
    assert!(params.is_empty());
}

#[test]
fn test_filter_does_not_change_base() {
    let cache = DescriptorCache::new();
    let member = cache.describe::<Member>().unwrap();
    let dialect = GenericDialect::new();

    let base = QuerySpec::new().filter("name = ?", ["ada"]);
    let before = base.to_sql(&member, Projection::Select, &dialect).unwrap();
    let narrowed = base.filter("id > ?", [10_i64]);

    assert_eq!(base.to_sql(&member, Projection::Select, &dialect).unwrap(), before);
    let after = narrowed.to_sql(&member, Projection::Select, &dialect).unwrap();
    assert_ne!(after, before);
    assert_eq!(
        after.0,
        "SELECT members.id, members.name, members.joined FROM members \
         WHERE name = ? AND id > ?"
    );
}

#[test]
fn test_postgres_numbering_with_limit() {
    let cache = DescriptorCache::new();
    let member = cache.describe::<Member>().unwrap();

    let (sql, params) = QuerySpec::new()
        .filter("name = ?", ["a1"])
        .filter("joined > ?", ["a2"])
        .order("id DESC")
        .order("name")
        .limit(20)
        .to_sql(&member, Projection::Select, &PostgresDialect::new())
        .unwrap();

    assert_eq!(
        sql,
        "SELECT members.id, members.name, members.joined FROM members \
         WHERE name = $1 AND joined > $2 ORDER BY id DESC, name LIMIT $3"
    );
    assert_eq!(
        params,
        [SqlValue::from("a1"), SqlValue::from("a2"), SqlValue::Int(20)]
    );
}

#[test]
fn test_quoted_question_marks_are_kept() {
    let cache = DescriptorCache::new();
    let member = cache.describe::<Member>().unwrap();

    let (sql, params) = QuerySpec::new()
        .filter("name <> '?' AND id = ?", [1_i64])
        .to_sql(&member, Projection::Select, &PostgresDialect::new())
        .unwrap();

    assert!(sql.ends_with("WHERE name <> '?' AND id = $1"));
    assert_eq!(params, [SqlValue::Int(1)]);
}

#[test]
fn test_insert_projection_columns() {
    let cache = DescriptorCache::new();
    let member = cache.describe::<Member>().unwrap();

    let (sql, _) = QuerySpec::new()
        .filter("deleted IS NULL", NO_ARGS)
        .to_sql(&member, Projection::Insert, &GenericDialect::new())
        .unwrap();
    assert_eq!(
        sql,
        "SELECT members.name, members.joined FROM members WHERE deleted IS NULL"
    );
}

#[derive(Debug, Default, Record)]
pub struct Sequence {
    #[dal("id,auto")]
    pub id: i64,
    #[dal("-")]
    pub cached: i64,
}

#[derive(Debug, Default, Record)]
pub struct Opaque {
    #[dal("-")]
    pub state: String,
    hidden: i64,
}

#[test]
fn test_empty_projection_is_rejected() {
    let cache = DescriptorCache::new();
    let sequence = cache.describe::<Sequence>().unwrap();
    let opaque = cache.describe::<Opaque>().unwrap();
    let dialect = GenericDialect::new();

    let (sql, _) = QuerySpec::new()
        .to_sql(&sequence, Projection::Select, &dialect)
        .unwrap();
    assert_eq!(sql, "SELECT Sequence.id FROM Sequence");

    assert!(matches!(
        QuerySpec::new().to_sql(&sequence, Projection::Insert, &dialect),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        QuerySpec::new().to_sql(&opaque, Projection::Select, &dialect),
        Err(Error::InvalidArgument(_))
    ));
}

// =============================================================================
// INSERT
// =============================================================================

#[test]
fn test_insert_record() {
    let cache = DescriptorCache::new();
    let descriptor = cache.describe::<Member>().unwrap();
    let member = Member {
        id: 99,
        name: String::from("ada"),
        joined: String::from("2024-01-01"),
        ..Member::default()
    };

    let (sql, params) = insert_sql(&descriptor, &member.values(), &PostgresDialect::new());
    assert_eq!(sql, "INSERT INTO members (name, joined) VALUES ($1, $2)");
    assert_eq!(
        params,
        [SqlValue::from("ada"), SqlValue::from("2024-01-01")]
    );
}
