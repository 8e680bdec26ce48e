//! Read-only lookups against live cluster state.
//!
//! Both the role detector and the managed-cluster registry are built on a
//! single capability, [`ObjectLookup`], which answers "does an object with
//! this name exist in this namespace". Not-found is an ordinary answer; only
//! backend faults are errors.

pub mod registry;
pub mod role;


pub use registry::{ClusterRegistry, ManagedClusterRegistry};
pub use role::{ClusterRole, MarkerRoleDetector, RoleDetector};

use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;

use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure of a lookup for any reason other than the object being absent.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Kubernetes API error (never a 404)
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// The lookup did not finish before the request deadline
    #[error("lookup did not complete before the request deadline")]
    DeadlineExceeded,

    /// The backing store could not be reached
    #[error("lookup backend unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LookupError::DeadlineExceeded)
    }
}

/// Existence check for a named, namespaced object.
pub trait ObjectLookup: Send + Sync {
    fn get_by_name(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<bool, LookupError>> + Send;
}

/// [`ObjectLookup`] backed by the Kubernetes API.
///
/// Only object metadata is fetched, so Secrets used as markers never have
/// their data read.
pub struct KubeLookup<K> {
    client: Client,
    _kind: PhantomData<fn() -> K>,
}

impl<K> KubeLookup<K> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }
}

impl<K> Clone for KubeLookup<K> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<K> ObjectLookup for KubeLookup<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + Debug
        + Send
        + Sync
        + 'static,
{
    async fn get_by_name(&self, namespace: &str, name: &str) -> Result<bool, LookupError> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let found = api.get_metadata_opt(name).await?;
        Ok(found.is_some())
    }
}
