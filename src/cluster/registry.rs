//! Managed-cluster registry lookup.

use std::future::Future;

use super::{LookupError, ObjectLookup};

/// Answers whether a managed cluster is registered.
pub trait ClusterRegistry: Send + Sync {
    fn exists(&self, cluster: &str) -> impl Future<Output = Result<bool, LookupError>> + Send;
}

/// Registry of ManagedCluster objects in the multi-cluster namespace.
#[derive(Clone)]
pub struct ManagedClusterRegistry<L> {
    lookup: L,
    namespace: String,
}

impl<L: ObjectLookup> ManagedClusterRegistry<L> {
    pub fn new(lookup: L, namespace: impl Into<String>) -> Self {
        Self {
            lookup,
            namespace: namespace.into(),
        }
    }
}

impl<L: ObjectLookup> ClusterRegistry for ManagedClusterRegistry<L> {
    async fn exists(&self, cluster: &str) -> Result<bool, LookupError> {
        self.lookup.get_by_name(&self.namespace, cluster).await
    }
}
