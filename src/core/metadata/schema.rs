//! core::metadata::schema
//!
//! Metadata record types and the override-merge algorithm.
//!
//! # Schema Design
//!
//! Records are plain serde structs, strictly parsed (unknown fields
//! rejected). Tags and file references accept a shorthand string form in
//! YAML (`Relev`, `-Delev`) alongside the full map form with a condition, so
//! hand-edited lists stay terse.
//!
//! # Merge Direction
//!
//! [`EntityMetadata::merge`] layers an override record on top of a base
//! record. Tag directives and file references accumulate as set unions,
//! messages append in order without deduplication, and dirty records
//! accumulate by checksum with the override replacing a base entry that
//! shares the key. An add and a remove directive for the same tag may both
//! survive a merge; resolving that precedence belongs to downstream
//! consumers.
//!
//! # Example
//!
//! ```
//! use metalist::core::metadata::schema::{EntityMetadata, Tag, TagState};
//! use metalist::core::types::EntityName;
//!
//! let name = EntityName::new("Foo.esp").unwrap();
//! let mut base = EntityMetadata::new(name.clone());
//! base.tags.insert(Tag::add("Relev"));
//!
//! let mut user = EntityMetadata::new(name);
//! user.tags.insert(Tag::remove("Relev"));
//!
//! base.merge(user);
//! assert_eq!(base.tags.len(), 2); // no auto-cancellation
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::EntityName;

/// Message severity, ordered least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational note.
    Say,
    /// Something the user should look at.
    Warn,
    /// Something that will cause problems if ignored.
    Error,
}

/// An informational message, optionally gated by a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    /// Message severity.
    pub severity: Severity,

    /// Message body.
    pub text: String,

    /// Gating condition; `None` means the message always applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Message {
    /// Create an informational message.
    pub fn say(text: impl Into<String>) -> Self {
        Self::new(Severity::Say, text)
    }

    /// Create a warning message.
    pub fn warn(text: impl Into<String>) -> Self {
        Self::new(Severity::Warn, text)
    }

    /// Create an error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }

    fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
            condition: None,
        }
    }

    /// Attach a gating condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// Whether a tag directive adds or removes the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TagState {
    Add,
    Remove,
}

/// A tag directive: add or remove a vocabulary tag for an entity.
///
/// The YAML shorthand `Relev` adds, `-Delev` removes. The map form
/// `{ name: Relev, condition: ... }` attaches a condition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "TagRepr", into = "TagRepr")]
pub struct Tag {
    /// Tag name, without the remove prefix.
    pub name: String,

    /// Add or remove.
    pub state: TagState,

    /// Gating condition; `None` means the directive always applies.
    pub condition: Option<String>,
}

impl Tag {
    /// Create an unconditional add directive.
    pub fn add(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: TagState::Add,
            condition: None,
        }
    }

    /// Create an unconditional remove directive.
    pub fn remove(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: TagState::Remove,
            condition: None,
        }
    }

    /// Attach a gating condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    fn from_shorthand(text: &str, condition: Option<String>) -> Self {
        match text.strip_prefix('-') {
            Some(rest) => Self {
                name: rest.to_string(),
                state: TagState::Remove,
                condition,
            },
            None => Self {
                name: text.to_string(),
                state: TagState::Add,
                condition,
            },
        }
    }

    fn to_shorthand(&self) -> String {
        match self.state {
            TagState::Add => self.name.clone(),
            TagState::Remove => format!("-{}", self.name),
        }
    }
}

/// Wire form for [`Tag`]: shorthand string or map with condition.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TagRepr {
    Short(String),
    Full { name: String, condition: String },
}

impl From<TagRepr> for Tag {
    fn from(repr: TagRepr) -> Self {
        match repr {
            TagRepr::Short(text) => Tag::from_shorthand(&text, None),
            TagRepr::Full { name, condition } => Tag::from_shorthand(&name, Some(condition)),
        }
    }
}

impl From<Tag> for TagRepr {
    fn from(tag: Tag) -> Self {
        let text = tag.to_shorthand();
        match tag.condition {
            None => TagRepr::Short(text),
            Some(condition) => TagRepr::Full {
                name: text,
                condition,
            },
        }
    }
}

/// A remediation record for one known-dirty revision of an entity.
///
/// The checksum is the record's identity: it names the exact file revision
/// the remediation data applies to. Two records with the same checksum
/// describe the same issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirtyInfo {
    /// CRC-32C of the affected file revision (identity key).
    pub checksum: u32,

    /// Name of the utility that repairs this revision.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub utility: String,

    /// Identical-to-master record count.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub itm_count: u32,

    /// Deleted reference count.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub deleted_ref_count: u32,

    /// Deleted navmesh count.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub deleted_navmesh_count: u32,
}

impl DirtyInfo {
    /// Create a record with only the identity checksum set.
    pub fn new(checksum: u32) -> Self {
        Self {
            checksum,
            utility: String::new(),
            itm_count: 0,
            deleted_ref_count: 0,
            deleted_navmesh_count: 0,
        }
    }

    /// Set the repairing utility name.
    pub fn with_utility(mut self, utility: impl Into<String>) -> Self {
        self.utility = utility.into();
        self
    }
}

fn is_zero(count: &u32) -> bool {
    *count == 0
}

/// A reference to another entity, used for requirements and
/// incompatibilities.
///
/// YAML shorthand is the bare file name; the map form carries a display
/// name and a condition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "FileRefRepr", into = "FileRefRepr")]
pub struct FileRef {
    /// Referenced entity name.
    pub name: EntityName,

    /// Human-facing display name, if different from the file name.
    pub display: Option<String>,

    /// Gating condition; `None` means the reference always applies.
    pub condition: Option<String>,
}

impl FileRef {
    /// Create an unconditional reference.
    ///
    /// # Errors
    ///
    /// Fails if `name` is not a valid entity name.
    pub fn new(name: impl Into<String>) -> Result<Self, crate::core::types::TypeError> {
        Ok(Self {
            name: EntityName::new(name)?,
            display: None,
            condition: None,
        })
    }

    /// Attach a gating condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// Wire form for [`FileRef`]: shorthand string or full map.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FileRefRepr {
    Short(String),
    Full {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<String>,
    },
}

impl TryFrom<FileRefRepr> for FileRef {
    type Error = crate::core::types::TypeError;

    fn try_from(repr: FileRefRepr) -> Result<Self, Self::Error> {
        match repr {
            FileRefRepr::Short(name) => FileRef::new(name),
            FileRefRepr::Full {
                name,
                display,
                condition,
            } => Ok(FileRef {
                name: EntityName::new(name)?,
                display,
                condition,
            }),
        }
    }
}

impl From<FileRef> for FileRefRepr {
    fn from(file: FileRef) -> Self {
        if file.display.is_none() && file.condition.is_none() {
            FileRefRepr::Short(file.name.to_string())
        } else {
            FileRefRepr::Full {
                name: file.name.to_string(),
                display: file.display,
                condition: file.condition,
            }
        }
    }
}

/// All metadata recorded for one named entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityMetadata {
    /// Entity name (case-insensitive identity).
    pub name: EntityName,

    /// Disabled records contribute nothing to a merge. Userlist-only in
    /// practice; authoritative records are always enabled.
    #[serde(default = "default_enabled", skip_serializing_if = "is_enabled")]
    pub enabled: bool,

    /// Applicability condition for the whole record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Tag directives.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<Tag>,

    /// Messages, in list order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,

    /// Dirty records, unique by checksum.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dirty: Vec<DirtyInfo>,

    /// Entities this one requires.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub requirements: BTreeSet<FileRef>,

    /// Entities this one cannot coexist with.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub incompatibilities: BTreeSet<FileRef>,
}

fn default_enabled() -> bool {
    true
}

fn is_enabled(enabled: &bool) -> bool {
    *enabled
}

impl EntityMetadata {
    /// Create an empty record for `name`.
    pub fn new(name: EntityName) -> Self {
        Self {
            name,
            enabled: true,
            condition: None,
            tags: BTreeSet::new(),
            messages: Vec::new(),
            dirty: Vec::new(),
            requirements: BTreeSet::new(),
            incompatibilities: BTreeSet::new(),
        }
    }

    /// True when the record carries nothing beyond its name.
    pub fn has_name_only(&self) -> bool {
        self.condition.is_none()
            && self.tags.is_empty()
            && self.messages.is_empty()
            && self.dirty.is_empty()
            && self.requirements.is_empty()
            && self.incompatibilities.is_empty()
    }

    /// Insert a dirty record, replacing any entry with the same checksum.
    pub fn upsert_dirty(&mut self, info: DirtyInfo) {
        self.dirty.retain(|d| d.checksum != info.checksum);
        self.dirty.push(info);
    }

    /// Layer `other` on top of this record.
    ///
    /// A disabled `other` contributes nothing. Tags, requirements, and
    /// incompatibilities accumulate as set unions; messages append in order
    /// without deduplication; dirty records accumulate by checksum with
    /// `other` replacing entries that share the key. This record keeps its
    /// own applicability condition and adopts `other`'s only when it has
    /// none.
    pub fn merge(&mut self, other: EntityMetadata) {
        if !other.enabled {
            return;
        }

        if self.condition.is_none() {
            self.condition = other.condition;
        }

        self.tags.extend(other.tags);
        self.messages.extend(other.messages);
        for info in other.dirty {
            self.upsert_dirty(info);
        }
        self.requirements.extend(other.requirements);
        self.incompatibilities.extend(other.incompatibilities);
    }

    /// Names of every tag this record touches, add or remove.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> EntityName {
        EntityName::new(s).unwrap()
    }

    #[test]
    fn new_record_has_name_only() {
        let meta = EntityMetadata::new(name("Foo.esp"));
        assert!(meta.has_name_only());
        assert!(meta.enabled);
    }

    #[test]
    fn merge_accumulates_tags_without_cancellation() {
        let mut base = EntityMetadata::new(name("Foo.esp"));
        base.tags.insert(Tag::add("Relev"));

        let mut user = EntityMetadata::new(name("Foo.esp"));
        user.tags.insert(Tag::remove("Relev"));
        user.tags.insert(Tag::add("Delev"));

        base.merge(user);

        assert_eq!(base.tags.len(), 3);
        assert!(base.tags.contains(&Tag::add("Relev")));
        assert!(base.tags.contains(&Tag::remove("Relev")));
    }

    #[test]
    fn merge_appends_messages_in_order() {
        let mut base = EntityMetadata::new(name("Foo.esp"));
        base.messages.push(Message::say("first"));

        let mut user = EntityMetadata::new(name("Foo.esp"));
        user.messages.push(Message::warn("second"));
        user.messages.push(Message::say("first")); // duplicate preserved

        base.merge(user);

        let texts: Vec<_> = base.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "first"]);
    }

    #[test]
    fn merge_replaces_dirty_by_checksum() {
        let mut base = EntityMetadata::new(name("Foo.esp"));
        base.dirty.push(DirtyInfo::new(0xDEAD).with_utility("OldTool"));
        base.dirty.push(DirtyInfo::new(0xBEEF));

        let mut user = EntityMetadata::new(name("Foo.esp"));
        user.dirty.push(DirtyInfo::new(0xDEAD).with_utility("NewTool"));

        base.merge(user);

        assert_eq!(base.dirty.len(), 2);
        let replaced = base.dirty.iter().find(|d| d.checksum == 0xDEAD).unwrap();
        assert_eq!(replaced.utility, "NewTool");
    }

    #[test]
    fn merge_ignores_disabled_source() {
        let mut base = EntityMetadata::new(name("Foo.esp"));

        let mut user = EntityMetadata::new(name("Foo.esp"));
        user.enabled = false;
        user.tags.insert(Tag::add("Relev"));
        user.messages.push(Message::error("should not appear"));

        base.merge(user);

        assert!(base.has_name_only());
    }

    #[test]
    fn merge_keeps_base_condition() {
        let mut base = EntityMetadata::new(name("Foo.esp"));
        base.condition = Some("file(\"a.esp\")".into());

        let mut user = EntityMetadata::new(name("Foo.esp"));
        user.condition = Some("file(\"b.esp\")".into());

        base.merge(user);
        assert_eq!(base.condition.as_deref(), Some("file(\"a.esp\")"));
    }

    #[test]
    fn merge_adopts_condition_when_base_has_none() {
        let mut base = EntityMetadata::new(name("Foo.esp"));

        let mut user = EntityMetadata::new(name("Foo.esp"));
        user.condition = Some("file(\"b.esp\")".into());

        base.merge(user);
        assert_eq!(base.condition.as_deref(), Some("file(\"b.esp\")"));
    }

    #[test]
    fn tag_shorthand_roundtrip() {
        let add: Tag = serde_yaml::from_str("Relev").unwrap();
        assert_eq!(add, Tag::add("Relev"));

        let remove: Tag = serde_yaml::from_str("-Delev").unwrap();
        assert_eq!(remove, Tag::remove("Delev"));

        let out = serde_yaml::to_string(&Tag::remove("Delev")).unwrap();
        let back: Tag = serde_yaml::from_str(&out).unwrap();
        assert_eq!(back, Tag::remove("Delev"));
    }

    #[test]
    fn tag_full_form_carries_condition() {
        let tag: Tag = serde_yaml::from_str("{ name: Relev, condition: 'file(\"a.esp\")' }")
            .unwrap();
        assert_eq!(tag.name, "Relev");
        assert_eq!(tag.state, TagState::Add);
        assert_eq!(tag.condition.as_deref(), Some("file(\"a.esp\")"));
    }

    #[test]
    fn file_ref_shorthand_roundtrip() {
        let file: FileRef = serde_yaml::from_str("Dep.esp").unwrap();
        assert_eq!(file.name.as_str(), "Dep.esp");
        assert!(file.condition.is_none());

        let out = serde_yaml::to_string(&file).unwrap();
        let back: FileRef = serde_yaml::from_str(&out).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn file_ref_rejects_invalid_name() {
        let result: Result<FileRef, _> = serde_yaml::from_str("\"a/b.esp\"");
        assert!(result.is_err());
    }

    #[test]
    fn entity_rejects_unknown_fields() {
        let yaml = "name: Foo.esp\nnot_a_field: 1\n";
        let result: Result<EntityMetadata, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn entity_minimal_yaml_parses() {
        let meta: EntityMetadata = serde_yaml::from_str("name: Foo.esp").unwrap();
        assert!(meta.has_name_only());
        assert!(meta.enabled);
    }

    #[test]
    fn entity_full_yaml_parses() {
        let yaml = r#"
name: Foo.esp
condition: file("Base.esm")
tags:
  - Relev
  - -Delev
messages:
  - severity: warn
    text: Needs a patch.
dirty:
  - checksum: 123456
    utility: CleanTool
    itm_count: 4
"#;
        let meta: EntityMetadata = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(meta.tags.len(), 2);
        assert_eq!(meta.messages.len(), 1);
        assert_eq!(meta.dirty[0].itm_count, 4);
        assert_eq!(meta.condition.as_deref(), Some("file(\"Base.esm\")"));
    }
}
