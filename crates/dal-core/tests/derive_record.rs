//! Tests for the `#[derive(Record)]` macro output and the descriptors built
//! from it.

use std::sync::Arc;

use dal_core::{
    DescriptorCache, Error, FieldFlags, FieldKind, Projection, Record, SqlValue, Table, TagError,
};
use dal_derive::Record;

// =============================================================================
// Untagged record: table and columns default to declared names
// =============================================================================

#[derive(Debug, Default, Record)]
pub struct Plain {
    pub id: i64,
    pub title: String,
}

#[test]
fn test_untagged_defaults() {
    let cache = DescriptorCache::new();
    let plain = cache.describe::<Plain>().unwrap();

    assert_eq!(plain.record(), "Plain");
    assert_eq!(plain.table(), "Plain");
    assert_eq!(plain.columns(Projection::Select), ["id", "title"]);
    for field in plain.fields() {
        assert_eq!(field.flags, FieldFlags::ELEMENT);
    }
}

#[test]
fn test_field_registration() {
    let fields = Plain::fields();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name, "id");
    assert_eq!(fields[0].tag, None);
    assert!(fields[0].public);
    assert!(matches!(fields[1].kind, FieldKind::Column));
}

// =============================================================================
// Library: table marker, column override, untagged field, auto flag
// =============================================================================

#[derive(Debug, Default, Record)]
pub struct Library {
    #[dal("libraries")]
    dal_table: Table,
    #[dal("branch_name")]
    pub name: String,
    pub location: String,
    #[dal("key,auto")]
    pub key: i64,
    #[dal("-")]
    pub books: Vec<String>,
    secret: String,
}

#[test]
fn test_library_fields_in_order() {
    let cache = DescriptorCache::new();
    let library = cache.describe::<Library>().unwrap();

    assert_eq!(library.table(), "libraries");
    let fields: Vec<(&str, &str)> = library
        .fields()
        .iter()
        .map(|f| (f.field, f.column.as_str()))
        .collect();
    assert_eq!(
        fields,
        [
            ("name", "branch_name"),
            ("location", "location"),
            ("key", "key")
        ]
    );
    assert_eq!(library.fields()[2].flags, FieldFlags::ELEMENT | FieldFlags::AUTO);
}

#[test]
fn test_auto_only_excluded_from_insert() {
    let cache = DescriptorCache::new();
    let library = cache.describe::<Library>().unwrap();

    assert_eq!(
        library.columns(Projection::Select),
        ["branch_name", "location", "key"]
    );
    assert_eq!(
        library.columns(Projection::Insert),
        ["branch_name", "location"]
    );
}

#[test]
fn test_unmapped_fields_have_no_targets() {
    let mut library = Library {
        name: String::from("Central"),
        location: String::from("Main St"),
        key: 9,
        books: vec![String::from("ignored")],
        secret: String::from("hidden"),
        ..Library::default()
    };

    assert_eq!(library.targets().len(), 3);
    assert_eq!(
        library.values(),
        [
            SqlValue::from("Central"),
            SqlValue::from("Main St"),
            SqlValue::Int(9)
        ]
    );
    assert_eq!(library.secret, "hidden");
}

// =============================================================================
// Exclusion with extra flags and empty table marker
// =============================================================================

#[derive(Debug, Default, Record)]
pub struct Excluded {
    #[dal("")]
    dal_table: Table,
    pub id: i64,
    #[dal("-,auto")]
    pub cache_key: String,
    #[dal(",omitempty")]
    pub note: String,
}

#[test]
fn test_exclusion_with_flags() {
    let cache = DescriptorCache::new();
    let excluded = cache.describe::<Excluded>().unwrap();

    assert_eq!(excluded.table(), "Excluded");
    assert_eq!(excluded.columns(Projection::Select), ["id", "note"]);
    assert!(excluded.field("cache_key").is_none());
    assert!(excluded.fields()[1].flags.contains(FieldFlags::OMIT_EMPTY));
}

// =============================================================================
// Embedded records and duplicate columns
// =============================================================================

#[derive(Debug, Default, Record)]
pub struct Audit {
    #[dal("created_by")]
    pub author: String,
    #[dal("id")]
    pub audit_id: i64,
}

#[derive(Debug, Default, Record)]
pub struct Article {
    #[dal("articles")]
    dal_table: Table,
    pub id: i64,
    #[dal(embed)]
    pub audit: Audit,
    pub body: String,
}

#[test]
fn test_embedded_fields_are_flattened() {
    let cache = DescriptorCache::new();
    let article = cache.describe::<Article>().unwrap();

    assert_eq!(article.table(), "articles");
    assert_eq!(
        article.columns(Projection::Select),
        ["id", "created_by", "body"]
    );

    let created_by = article.field("created_by").unwrap();
    assert_eq!(created_by.path, [2, 0]);
    assert_eq!(created_by.target, 1);

    // The embedded `id` duplicates the outer one and is dropped, but it still
    // owns a target slot.
    let body = article.field("body").unwrap();
    assert_eq!(body.path, [3]);
    assert_eq!(body.target, 3);
    assert_eq!(article.field("id").unwrap().field, "id");
}

#[test]
fn test_embedded_targets_and_values() {
    let mut article = Article {
        id: 1,
        audit: Audit {
            author: String::from("ada"),
            audit_id: 2,
        },
        body: String::from("text"),
        ..Article::default()
    };
    assert_eq!(article.targets().len(), 4);
    assert_eq!(
        article.values(),
        [
            SqlValue::Int(1),
            SqlValue::from("ada"),
            SqlValue::Int(2),
            SqlValue::from("text")
        ]
    );
}

// =============================================================================
// Cache behavior
// =============================================================================

#[derive(Debug, Default, Record)]
pub struct Broken {
    #[dal("id,primary")]
    pub id: i64,
}

#[test]
fn test_describe_twice_builds_once() {
    let cache = DescriptorCache::new();
    let first = cache.describe::<Library>().unwrap();
    let second = cache.describe::<Library>().unwrap();

    assert_eq!(first, second);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.builds(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_unknown_flag_is_not_cached() {
    let cache = DescriptorCache::new();

    for _ in 0..2 {
        match cache.describe::<Broken>() {
            Err(Error::Tag {
                record,
                field,
                source,
            }) => {
                assert_eq!(record, "Broken");
                assert_eq!(field, "id");
                assert_eq!(source, TagError::UnknownFlag(String::from("primary")));
            }
            other => panic!("expected a tag error, got {other:?}"),
        }
    }
    assert_eq!(cache.builds(), 0);
    assert!(cache.is_empty());
}

#[test]
fn test_global_cache_is_shared() {
    DescriptorCache::global().register::<Plain>().unwrap();
    let plain = DescriptorCache::global()
        .lookup(std::any::TypeId::of::<Plain>())
        .unwrap();
    assert_eq!(plain.table(), "Plain");
}
