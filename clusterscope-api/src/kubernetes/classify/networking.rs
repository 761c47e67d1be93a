//! Service rule

use k8s_openapi::api::core::v1::Service;

use crate::kubernetes::index::SnapshotIndex;
use crate::kubernetes::metadata::ObjectMetadata;

/// Orphaned unless its Endpoints object has at least one ready address
///
/// A Service whose Endpoints are absent from the snapshot is orphaned.
pub fn is_service_orphaned(service: &Service, index: &SnapshotIndex<'_>) -> bool {
    !index
        .ready_endpoints
        .contains(service.namespace(), service.name())
}
