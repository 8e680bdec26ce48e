//! Multi-cluster mirror resource definitions.
//!
//! Every kind here wraps a template for the object to create on the managed
//! clusters and a [`Placement`] naming those clusters. The webhook ignores the
//! template entirely.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::placement::{MirrorResource, Placement};

// ============================================================================
// MultiClusterSecret
// ============================================================================

/// A Secret replicated to the managed clusters named in its placement.
///
/// Example:
/// ```yaml
/// apiVersion: clusters.placement.dev/v1alpha1
/// kind: MultiClusterSecret
/// metadata:
///   name: db-credentials
///   namespace: mc-system
/// spec:
///   template:
///     stringData:
///       password: hunter2
///   placement:
///     clusters:
///       - name: managed1
/// ```
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "clusters.placement.dev",
    version = "v1alpha1",
    kind = "MultiClusterSecret",
    plural = "multiclustersecrets",
    shortname = "mcsecret",
    status = "MultiClusterResourceStatus",
    namespaced,
    printcolumn = r#"{"name":"State", "type":"string", "jsonPath":".status.state"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MultiClusterSecretSpec {
    /// Secret to create on each target cluster.
    #[serde(default)]
    pub template: SecretTemplate,

    /// Clusters the secret is placed on.
    #[serde(default)]
    pub placement: Placement,
}

/// Template for a replicated Secret.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TemplateMetadata>,

    /// Secret type (defaults to Opaque on the managed cluster).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Base64-encoded data.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub string_data: BTreeMap<String, String>,
}

impl MirrorResource for MultiClusterSecret {
    const WEBHOOK_PATH: &'static str = "/validate-multiclustersecret";

    fn placement(&self) -> &Placement {
        &self.spec.placement
    }
}

// ============================================================================
// MultiClusterConfigMap
// ============================================================================

/// A ConfigMap replicated to the managed clusters named in its placement.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "clusters.placement.dev",
    version = "v1alpha1",
    kind = "MultiClusterConfigMap",
    plural = "multiclusterconfigmaps",
    shortname = "mccm",
    status = "MultiClusterResourceStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct MultiClusterConfigMapSpec {
    #[serde(default)]
    pub template: ConfigMapTemplate,

    #[serde(default)]
    pub placement: Placement,
}

/// Template for a replicated ConfigMap.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TemplateMetadata>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl MirrorResource for MultiClusterConfigMap {
    const WEBHOOK_PATH: &'static str = "/validate-multiclusterconfigmap";

    fn placement(&self) -> &Placement {
        &self.spec.placement
    }
}

// ============================================================================
// MultiClusterComponent
// ============================================================================

/// An application component replicated to the managed clusters named in its
/// placement.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "clusters.placement.dev",
    version = "v1alpha1",
    kind = "MultiClusterComponent",
    plural = "multiclustercomponents",
    shortname = "mccomp",
    status = "MultiClusterResourceStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct MultiClusterComponentSpec {
    #[serde(default)]
    pub template: WorkloadTemplate,

    #[serde(default)]
    pub placement: Placement,
}

impl MirrorResource for MultiClusterComponent {
    const WEBHOOK_PATH: &'static str = "/validate-multiclustercomponent";

    fn placement(&self) -> &Placement {
        &self.spec.placement
    }
}

// ============================================================================
// MultiClusterApplicationConfiguration
// ============================================================================

/// An application configuration replicated to the managed clusters named in
/// its placement.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "clusters.placement.dev",
    version = "v1alpha1",
    kind = "MultiClusterApplicationConfiguration",
    plural = "multiclusterapplicationconfigurations",
    shortname = "mcappconf",
    status = "MultiClusterResourceStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct MultiClusterApplicationConfigurationSpec {
    #[serde(default)]
    pub template: WorkloadTemplate,

    #[serde(default)]
    pub placement: Placement,
}

impl MirrorResource for MultiClusterApplicationConfiguration {
    const WEBHOOK_PATH: &'static str = "/validate-multiclusterapplicationconfiguration";

    fn placement(&self) -> &Placement {
        &self.spec.placement
    }
}

// ============================================================================
// Shared template and status types
// ============================================================================

/// Labels and annotations applied to the replicated object.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct TemplateMetadata {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Opaque workload template. Its schema belongs to the workload's own CRD.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct WorkloadTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TemplateMetadata>,

    #[serde(default)]
    pub spec: serde_json::Value,
}

/// Replication status shared by all mirror kinds.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MultiClusterResourceStatus {
    /// Aggregate state across all placed clusters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PlacementState>,

    /// Per-cluster replication state.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clusters: Vec<ClusterPlacementStatus>,
}

/// State of a mirror resource on one or all of its clusters.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum PlacementState {
    #[default]
    Pending,
    Succeeded,
    Failed,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPlacementStatus {
    pub name: String,
    pub state: PlacementState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
