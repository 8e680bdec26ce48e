//! ManagedCluster Custom Resource Definition.
//!
//! A ManagedCluster registers a member cluster with the admin cluster. It is
//! created and maintained by the registration tooling; the webhook only checks
//! whether one exists for a given name.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Registration record for a managed cluster.
///
/// Example:
/// ```yaml
/// apiVersion: clusters.placement.dev/v1alpha1
/// kind: ManagedCluster
/// metadata:
///   name: managed1
///   namespace: mc-system
/// spec:
///   serviceAccount: managed1-agent
///   prometheusSecret: prometheus-managed1
///   managedClusterManifestSecret: managed1-manifest
/// ```
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "clusters.placement.dev",
    version = "v1alpha1",
    kind = "ManagedCluster",
    plural = "managedclusters",
    shortname = "mcluster",
    namespaced,
    printcolumn = r#"{"name":"Description", "type":"string", "jsonPath":".spec.description"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Service account the managed cluster's agent authenticates as.
    pub service_account: String,

    /// Secret holding the managed cluster's Prometheus endpoint credentials.
    pub prometheus_secret: String,

    /// Secret holding the manifest applied on the managed cluster to register it.
    pub managed_cluster_manifest_secret: String,
}
