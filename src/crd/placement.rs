//! Placement types shared by every multi-cluster mirror resource.
//!
//! A mirror resource is authored on the admin cluster and replicated to the
//! managed clusters listed in its placement. The webhook only ever looks at
//! the generic `{name, namespace, placement}` view of such a resource, which
//! is what [`MirrorResource`] extracts.

use k8s_openapi::NamespaceResourceScope;
use kube::{Resource, ResourceExt};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Target clusters for a mirror resource.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Managed clusters the resource is replicated to, in declaration order.
    #[serde(default)]
    pub clusters: Vec<ClusterRef>,
}

impl Placement {
    /// Build a placement targeting the given cluster names, in order.
    pub fn to_clusters<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            clusters: names.into_iter().map(ClusterRef::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Reference to a managed cluster by name.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ClusterRef {
    /// Name of the ManagedCluster resource in the multi-cluster namespace.
    pub name: String,
}

impl ClusterRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The generic shape the placement policy operates on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MirrorResourceView {
    pub name: String,
    pub namespace: String,
    pub placement: Placement,
}

/// A resource kind that is mirrored from the admin cluster to managed clusters.
///
/// Each kind only supplies its placement and the webhook path it is served
/// on; decoding and validation are shared.
pub trait MirrorResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Path of the validating webhook endpoint for this kind.
    const WEBHOOK_PATH: &'static str;

    /// Placement directive declared by the resource.
    fn placement(&self) -> &Placement;

    /// Project the resource onto the view used by the placement policy.
    fn view(&self) -> MirrorResourceView {
        MirrorResourceView {
            name: self.name_any(),
            namespace: self.namespace().unwrap_or_default(),
            placement: self.placement().clone(),
        }
    }
}
