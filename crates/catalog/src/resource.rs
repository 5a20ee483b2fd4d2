//! The catalog resource record.

use chrono::{DateTime, Utc};
use geocat_core::{ResourceKey, ResourceType};
use geocat_permission::PermissionSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A catalog resource as far as this service is concerned.
///
/// Domain data (geometry, metadata schema) stays opaque in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Natural key.
    pub uuid: ResourceKey,
    /// Concrete type; selects the permission table.
    pub resource_type: ResourceType,
    /// Display title.
    pub title: String,
    /// Owning username.
    pub owner: String,
    /// Opaque metadata object.
    pub metadata: Map<String, Value>,
    /// Uploaded file references.
    pub files: Vec<String>,
    /// The stored ACL (extended form).
    pub acl: PermissionSpec,
    /// The resource this one was copied from.
    pub source: Option<ResourceKey>,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last write.
    pub last_updated: DateTime<Utc>,
}

/// Everything needed to create a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    /// Natural key.
    pub uuid: ResourceKey,
    /// Concrete type.
    pub resource_type: ResourceType,
    /// Owning username.
    pub owner: String,
    /// Title; defaults to the uuid.
    pub title: Option<String>,
    /// Initial metadata.
    pub metadata: Map<String, Value>,
    /// Uploaded files.
    pub files: Vec<String>,
}

/// A partial update. `None` leaves the field alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourcePatch {
    /// Merged into `metadata` key by key; a string `title` also renames.
    pub vals: Option<Map<String, Value>>,
    /// Merged under `metadata.custom`.
    pub custom: Option<Map<String, Value>>,
    /// Replaces `metadata.regions`.
    pub regions: Option<Vec<String>>,
    /// Replaces `metadata.keywords`.
    pub keywords: Option<Vec<String>>,
    /// Recorded as `metadata.xml_file`.
    pub xml_file: Option<String>,
    /// Recorded as `metadata.metadata_uploaded`.
    pub metadata_uploaded: Option<bool>,
}

impl Resource {
    /// Build a fresh record with the given ACL.
    #[must_use]
    pub fn new(new: NewResource, acl: PermissionSpec) -> Self {
        let now = Utc::now();
        Self {
            title: new.title.unwrap_or_else(|| new.uuid.to_string()),
            uuid: new.uuid,
            resource_type: new.resource_type,
            owner: new.owner,
            metadata: new.metadata,
            files: new.files,
            acl,
            source: None,
            created: now,
            last_updated: now,
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, patch: ResourcePatch) {
        if let Some(vals) = patch.vals {
            if let Some(Value::String(title)) = vals.get("title") {
                self.title.clone_from(title);
            }
            self.metadata.extend(vals);
        }
        if let Some(custom) = patch.custom {
            let slot = self
                .metadata
                .entry("custom")
                .or_insert_with(|| Value::Object(Map::new()));
            match slot {
                Value::Object(existing) => existing.extend(custom),
                other => *other = Value::Object(custom),
            }
        }
        if let Some(regions) = patch.regions {
            self.metadata.insert("regions".to_owned(), Value::from(regions));
        }
        if let Some(keywords) = patch.keywords {
            self.metadata.insert("keywords".to_owned(), Value::from(keywords));
        }
        if let Some(xml_file) = patch.xml_file {
            self.metadata.insert("xml_file".to_owned(), Value::from(xml_file));
        }
        if let Some(uploaded) = patch.metadata_uploaded {
            self.metadata
                .insert("metadata_uploaded".to_owned(), Value::from(uploaded));
        }
        self.last_updated = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn resource() -> Resource {
        let metadata = json!({"abstract": "old", "custom": {"a": 1}, "regions": ["EU"]});
        Resource::new(
            NewResource {
                uuid: ResourceKey::new("r1").unwrap(),
                resource_type: ResourceType::Document,
                owner: "alice".into(),
                title: None,
                metadata: metadata.as_object().cloned().unwrap(),
                files: vec![],
            },
            PermissionSpec::new(),
        )
    }

    #[test]
    fn title_defaults_to_uuid() {
        assert_eq!(resource().title, "r1");
    }

    #[test]
    fn absent_fields_are_untouched() {
        let mut r = resource();
        let before = r.metadata.clone();
        r.apply(ResourcePatch::default());
        assert_eq!(r.metadata, before);
    }

    #[test]
    fn vals_and_custom_merge_while_lists_replace() {
        let mut r = resource();
        r.apply(ResourcePatch {
            vals: json!({"title": "Rivers", "purpose": "demo"}).as_object().cloned(),
            custom: json!({"b": 2}).as_object().cloned(),
            regions: Some(vec!["Africa".into()]),
            xml_file: Some("upload/r1.xml".into()),
            ..ResourcePatch::default()
        });
        assert_eq!(r.title, "Rivers");
        assert_eq!(r.metadata["abstract"], "old");
        assert_eq!(r.metadata["purpose"], "demo");
        assert_eq!(r.metadata["custom"], json!({"a": 1, "b": 2}));
        assert_eq!(r.metadata["regions"], json!(["Africa"]));
        assert_eq!(r.metadata["xml_file"], "upload/r1.xml");
        assert!(r.metadata.get("keywords").is_none());
    }
}
