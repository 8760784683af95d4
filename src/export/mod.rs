//! export
//!
//! Minimal-list projection for third-party consumers.
//!
//! # Purpose
//!
//! Some consumers only care which entities have tag suggestions or dirty
//! records, not messages, file references, or entity-level gating. The
//! projection keeps exactly that narrow subset so the export stays small
//! and stable for them.
//!
//! # Example
//!
//! ```
//! use metalist::core::metadata::{EntityMetadata, MetadataList, Tag};
//! use metalist::core::types::EntityName;
//! use metalist::export::project_minimal;
//!
//! let mut list = MetadataList::new();
//! let mut entity = EntityMetadata::new(EntityName::new("Foo.esp").unwrap());
//! entity.tags.insert(Tag::add("Relev"));
//! list.upsert(entity);
//! list.upsert(EntityMetadata::new(EntityName::new("Plain.esp").unwrap()));
//!
//! let minimal = project_minimal(&list);
//! assert_eq!(minimal.entities().len(), 1); // Plain.esp is omitted
//! ```

use std::path::Path;

use crate::core::metadata::list::MetadataList;
use crate::core::metadata::schema::EntityMetadata;
use crate::core::metadata::store::{check_writable, StoreError};

/// Project a list down to tag-suggestion and dirty-record data.
///
/// Every entity with at least one tag directive or dirty record survives,
/// reduced to its name, tags, and dirty records; conditions on individual
/// tags are preserved verbatim. Entity-level conditions, messages, and file
/// references are dropped, and entities with neither tags nor dirty records
/// are omitted entirely. List-level vocabulary and messages do not carry
/// over.
pub fn project_minimal(list: &MetadataList) -> MetadataList {
    let mut minimal = MetadataList::new();

    for entity in list.entities() {
        if entity.tags.is_empty() && entity.dirty.is_empty() {
            continue;
        }

        let mut reduced = EntityMetadata::new(entity.name.clone());
        reduced.tags = entity.tags.clone();
        reduced.dirty = entity.dirty.clone();
        minimal.upsert(reduced);
    }

    minimal
}

/// Project `list` and write the result to `path`.
///
/// # Errors
///
/// - [`StoreError::InvalidArgument`] if `path`'s parent directory is absent
/// - [`StoreError::FileAccess`] if `path` exists and `overwrite` is false
pub fn write_minimal(list: &MetadataList, path: &Path, overwrite: bool) -> Result<(), StoreError> {
    check_writable(path, overwrite)?;
    project_minimal(list).save(path)?;
    log::debug!("wrote minimal list to {}", path.display());
    Ok(())
}
