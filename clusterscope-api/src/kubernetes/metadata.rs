//! Uniform read access to object metadata
//!
//! Typed kinds from k8s-openapi and `DynamicObject` custom resources are
//! covered by a blanket impl over `kube::Resource`.
//! Raw JSON objects go through [`UntypedObject`]. Missing fields read as
//! empty values, never as errors.

use chrono::DateTime;
use serde_json::Value;

/// Owner reference reduced to what the inventory displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRef {
    pub kind: String,
    pub name: String,
}

/// Metadata accessors shared by every object the classifier inspects
pub trait ObjectMetadata {
    fn name(&self) -> &str;

    /// Empty for cluster-scoped objects
    fn namespace(&self) -> &str;

    fn label(&self, key: &str) -> Option<&str>;

    fn label_keys(&self) -> Vec<&str>;

    fn annotation(&self, key: &str) -> Option<&str>;

    fn owner_references(&self) -> Vec<OwnerRef>;

    fn finalizers(&self) -> Vec<String>;

    /// Present iff deletion was requested; RFC 3339 when it parses
    fn deletion_timestamp(&self) -> Option<String>;

    /// RFC 3339 creation time
    fn creation_timestamp(&self) -> Option<String>;

    fn has_owner(&self) -> bool {
        !self.owner_references().is_empty()
    }

    fn has_label_prefix(&self, prefix: &str) -> bool {
        self.label_keys().iter().any(|key| key.starts_with(prefix))
    }
}

impl<K: kube::Resource> ObjectMetadata for K {
    fn name(&self) -> &str {
        self.meta().name.as_deref().unwrap_or_default()
    }

    fn namespace(&self) -> &str {
        self.meta().namespace.as_deref().unwrap_or_default()
    }

    fn label(&self, key: &str) -> Option<&str> {
        self.meta().labels.as_ref()?.get(key).map(String::as_str)
    }

    fn label_keys(&self) -> Vec<&str> {
        self.meta()
            .labels
            .iter()
            .flat_map(|labels| labels.keys().map(String::as_str))
            .collect()
    }

    fn annotation(&self, key: &str) -> Option<&str> {
        self.meta().annotations.as_ref()?.get(key).map(String::as_str)
    }

    fn owner_references(&self) -> Vec<OwnerRef> {
        self.meta()
            .owner_references
            .iter()
            .flatten()
            .map(|owner| OwnerRef {
                kind: owner.kind.clone(),
                name: owner.name.clone(),
            })
            .collect()
    }

    fn has_owner(&self) -> bool {
        self.meta()
            .owner_references
            .as_ref()
            .is_some_and(|owners| !owners.is_empty())
    }

    fn finalizers(&self) -> Vec<String> {
        self.meta().finalizers.clone().unwrap_or_default()
    }

    fn deletion_timestamp(&self) -> Option<String> {
        self.meta().deletion_timestamp.as_ref().map(|t| t.0.to_rfc3339())
    }

    fn creation_timestamp(&self) -> Option<String> {
        self.meta().creation_timestamp.as_ref().map(|t| t.0.to_rfc3339())
    }
}

/// Borrowed view over a raw JSON object with a `metadata` map
#[derive(Debug, Clone, Copy)]
pub struct UntypedObject<'a>(pub &'a Value);

impl<'a> UntypedObject<'a> {
    fn metadata(&self, field: &str) -> Option<&'a Value> {
        self.0.get("metadata")?.get(field)
    }

    fn metadata_str(&self, field: &str) -> &'a str {
        self.metadata(field).and_then(Value::as_str).unwrap_or_default()
    }
}

impl ObjectMetadata for UntypedObject<'_> {
    fn name(&self) -> &str {
        self.metadata_str("name")
    }

    fn namespace(&self) -> &str {
        self.metadata_str("namespace")
    }

    fn label(&self, key: &str) -> Option<&str> {
        self.metadata("labels")?.get(key)?.as_str()
    }

    fn label_keys(&self) -> Vec<&str> {
        self.metadata("labels")
            .and_then(Value::as_object)
            .map(|labels| labels.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata("annotations")?.get(key)?.as_str()
    }

    fn owner_references(&self) -> Vec<OwnerRef> {
        self.metadata("ownerReferences")
            .and_then(Value::as_array)
            .map(|owners| {
                owners
                    .iter()
                    .map(|owner| OwnerRef {
                        kind: owner["kind"].as_str().unwrap_or_default().to_string(),
                        name: owner["name"].as_str().unwrap_or_default().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn finalizers(&self) -> Vec<String> {
        self.metadata("finalizers")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Any non-null value counts; one that does not parse is kept verbatim
    fn deletion_timestamp(&self) -> Option<String> {
        match self.metadata("deletionTimestamp")? {
            Value::Null => None,
            Value::String(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map(|t| t.with_timezone(&chrono::Utc).to_rfc3339())
                    .unwrap_or_else(|_| raw.clone()),
            ),
            other => Some(other.to_string()),
        }
    }

    fn creation_timestamp(&self) -> Option<String> {
        self.metadata("creationTimestamp")
            .and_then(Value::as_str)
            .map(String::from)
    }
}

/// Name of a local object reference
///
/// k8s-openapi models some reference names as `String` and others as
/// `Option<String>`; an empty string means unset in both.
pub trait RefName {
    fn ref_name(&self) -> Option<&str>;
}

impl RefName for String {
    fn ref_name(&self) -> Option<&str> {
        Some(self.as_str()).filter(|name| !name.is_empty())
    }
}

impl RefName for Option<String> {
    fn ref_name(&self) -> Option<&str> {
        self.as_deref().filter(|name| !name.is_empty())
    }
}
