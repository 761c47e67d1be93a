//! Deletion lifecycle of inspected objects

use clusterscope_common::ClassificationResult;

use super::metadata::ObjectMetadata;

/// Whether the object carries a deletion timestamp
pub fn is_pending_deletion<T: ObjectMetadata + ?Sized>(obj: &T) -> bool {
    obj.deletion_timestamp().is_some()
}

/// Combine the orphan verdict with the object's deletion state
///
/// Finalizers are reported only while the object is terminating.
pub fn inspect<T: ObjectMetadata + ?Sized>(obj: &T, orphaned: Option<bool>) -> ClassificationResult {
    match obj.deletion_timestamp() {
        Some(deleted_at) => ClassificationResult {
            orphaned,
            pending_deletion: true,
            deletion_timestamp: Some(deleted_at),
            finalizers: obj.finalizers(),
        },
        None => ClassificationResult {
            orphaned,
            ..Default::default()
        },
    }
}
