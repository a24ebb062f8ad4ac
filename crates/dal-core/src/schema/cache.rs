//! Process-wide type descriptor cache.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use super::descriptor::{FieldDescriptor, TypeDescriptor};
use super::{FieldDef, FieldKind, Record, TABLE_FIELD};
use crate::builder::value::Scan;
use crate::error::{Error, Result};
use crate::tag;

/// Maps record types to their descriptors.
///
/// Entries are built on first use, published once and never evicted. Use
/// [`DescriptorCache::global`] for the shared instance or
/// [`DescriptorCache::new`] for an isolated one.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
    builds: AtomicUsize,
}

impl DescriptorCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide cache.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<DescriptorCache> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Returns the descriptor of `R`, building it on first use.
    ///
    /// # Errors
    ///
    /// A malformed tag fails with [`Error::Tag`]; nothing is cached in that
    /// case and the next call parses again.
    pub fn describe<R: Record>(&self) -> Result<Arc<TypeDescriptor>> {
        let id = TypeId::of::<R>();
        if let Some(descriptor) = self.lookup(id) {
            return Ok(descriptor);
        }

        // Poisoning is harmless: entries are inserted whole.
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(descriptor) = entries.get(&id) {
            return Ok(Arc::clone(descriptor));
        }

        let descriptor = Arc::new(build::<R>()?);
        entries.insert(id, Arc::clone(&descriptor));
        drop(entries);

        self.builds.fetch_add(1, Ordering::Relaxed);
        debug!(
            record = R::NAME,
            table = %descriptor.table,
            fields = descriptor.fields.len(),
            "built type descriptor"
        );
        Ok(descriptor)
    }

    /// Builds and publishes the descriptor of `R` ahead of use.
    ///
    /// # Errors
    ///
    /// Fails like [`DescriptorCache::describe`].
    pub fn register<R: Record>(&self) -> Result<()> {
        self.describe::<R>().map(drop)
    }

    /// Returns an already published descriptor.
    #[must_use]
    pub fn lookup(&self, id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Returns the number of descriptors built so far.
    #[must_use]
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Returns the number of cached descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether no descriptor has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn bind<R: Record>(value: &mut dyn Any) -> Option<Vec<&mut dyn Scan>> {
    value.downcast_mut::<R>().map(|record| record.targets())
}

struct Builder {
    record: &'static str,
    table: Option<String>,
    fields: Vec<FieldDescriptor>,
    next_target: usize,
}

fn build<R: Record>() -> Result<TypeDescriptor> {
    let mut builder = Builder {
        record: R::NAME,
        table: None,
        fields: Vec::new(),
        next_target: 0,
    };
    builder.walk(R::fields(), &[])?;

    let table = builder
        .table
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| String::from(R::NAME));

    Ok(TypeDescriptor {
        record: R::NAME,
        table,
        fields: builder.fields,
        binder: bind::<R>,
    })
}

impl Builder {
    fn walk(&mut self, defs: &'static [FieldDef], prefix: &[usize]) -> Result<()> {
        for (index, def) in defs.iter().enumerate() {
            if def.tag.is_some_and(tag::is_excluded) {
                continue;
            }

            if def.name == TABLE_FIELD {
                // The marker may be private. Only the outermost record names
                // the table; its flags are still validated.
                self.parse(def)?;
                if prefix.is_empty() {
                    let name = def.tag.and_then(|t| t.split(',').next());
                    self.table = Some(String::from(name.unwrap_or_default()));
                }
                continue;
            }

            if !def.is_mapped() {
                continue;
            }

            let mut path = prefix.to_vec();
            path.push(index);

            match def.kind {
                FieldKind::Embedded(fields) => self.walk(fields(), &path)?,
                FieldKind::Column => {
                    let parsed = self.parse(def)?;
                    let target = self.next_target;
                    self.next_target += 1;

                    if self.fields.iter().any(|f| f.column == parsed.column) {
                        debug!(
                            record = self.record,
                            field = def.name,
                            column = %parsed.column,
                            "duplicate column, keeping the first declaration"
                        );
                        continue;
                    }

                    self.fields.push(FieldDescriptor {
                        path,
                        field: def.name,
                        column: parsed.column,
                        flags: parsed.flags,
                        target,
                    });
                }
            }
        }
        Ok(())
    }

    fn parse(&self, def: &FieldDef) -> Result<tag::ParsedTag> {
        tag::parse_tag(def.name, def.tag.unwrap_or_default()).map_err(|source| Error::Tag {
            record: self.record,
            field: def.name,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::value::{SqlValue, ToSqlValue};
    use crate::tag::{FieldFlags, TagError};

    #[derive(Default)]
    struct Library {
        name: String,
        location: String,
        key: i64,
        #[allow(dead_code)]
        books: Vec<String>,
    }

    impl Record for Library {
        const NAME: &'static str = "library";

        fn fields() -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[
                FieldDef {
                    name: "dal_table",
                    tag: Some("libraries"),
                    public: false,
                    kind: FieldKind::Column,
                },
                FieldDef {
                    name: "Name",
                    tag: Some("branch_name"),
                    public: true,
                    kind: FieldKind::Column,
                },
                FieldDef {
                    name: "Location",
                    tag: None,
                    public: true,
                    kind: FieldKind::Column,
                },
                FieldDef {
                    name: "Key",
                    tag: Some("key,auto"),
                    public: true,
                    kind: FieldKind::Column,
                },
                FieldDef {
                    name: "Books",
                    tag: Some("-"),
                    public: true,
                    kind: FieldKind::Column,
                },
            ];
            FIELDS
        }

        fn targets(&mut self) -> Vec<&mut dyn Scan> {
            vec![
                &mut self.name as &mut dyn Scan,
                &mut self.location,
                &mut self.key,
            ]
        }

        fn values(&self) -> Vec<SqlValue> {
            vec![
                self.name.to_sql_value(),
                self.location.to_sql_value(),
                self.key.to_sql_value(),
            ]
        }
    }

    struct Broken;

    impl Record for Broken {
        const NAME: &'static str = "Broken";

        fn fields() -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[FieldDef {
                name: "id",
                tag: Some("id,primary"),
                public: true,
                kind: FieldKind::Column,
            }];
            FIELDS
        }

        fn targets(&mut self) -> Vec<&mut dyn Scan> {
            Vec::new()
        }

        fn values(&self) -> Vec<SqlValue> {
            Vec::new()
        }
    }

    #[test]
    fn test_describe_library() {
        let cache = DescriptorCache::new();
        let descriptor = cache.describe::<Library>().unwrap();

        assert_eq!(descriptor.record(), "library");
        assert_eq!(descriptor.table(), "libraries");
        let columns: Vec<&str> = descriptor.fields().iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, ["branch_name", "Location", "key"]);
        assert_eq!(descriptor.fields()[0].path, [1]);
        assert_eq!(descriptor.fields()[2].target, 2);
        assert!(descriptor.fields()[2].flags.contains(FieldFlags::AUTO));
    }

    #[test]
    fn test_describe_is_cached() {
        let cache = DescriptorCache::new();
        let first = cache.describe::<Library>().unwrap();
        let second = cache.describe::<Library>().unwrap();

        assert_eq!(*first, *second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.builds(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_isolated_caches() {
        let a = DescriptorCache::new();
        let b = DescriptorCache::new();
        a.register::<Library>().unwrap();

        assert!(a.lookup(TypeId::of::<Library>()).is_some());
        assert!(b.lookup(TypeId::of::<Library>()).is_none());
        assert!(b.is_empty());
    }

    #[test]
    fn test_tag_error_is_not_cached() {
        let cache = DescriptorCache::new();

        for _ in 0..2 {
            let err = cache.describe::<Broken>().unwrap_err();
            match err {
                Error::Tag {
                    record,
                    field,
                    source,
                } => {
                    assert_eq!(record, "Broken");
                    assert_eq!(field, "id");
                    assert_eq!(source, TagError::UnknownFlag(String::from("primary")));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        assert!(cache.is_empty());
        assert_eq!(cache.builds(), 0);
    }

    #[test]
    fn test_binder_rejects_other_types() {
        let cache = DescriptorCache::new();
        let descriptor = cache.describe::<Library>().unwrap();

        let mut library = Library::default();
        assert_eq!(descriptor.targets(&mut library).map(|t| t.len()), Some(3));

        let mut boxed = Box::new(Library::default());
        assert!(descriptor.targets(&mut boxed).is_none());
    }

    #[test]
    fn test_concurrent_describe_builds_once() {
        let cache = DescriptorCache::new();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| cache.describe::<Library>().unwrap());
            }
        });
        assert_eq!(cache.builds(), 1);
    }
}
