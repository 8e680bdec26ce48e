//! Cluster role detection.
//!
//! The local cluster is a managed member if the registration marker Secret
//! exists, and the admin cluster otherwise. A failed lookup is reported as an
//! error so that a transient fault is never mistaken for the admin role.

use std::fmt;
use std::future::Future;

use tracing::debug;

use super::{LookupError, ObjectLookup};

/// Role of the cluster the webhook is running on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusterRole {
    /// Administrative hub: placement is enforced here
    Admin,
    /// Managed member: receives objects already validated on the hub
    Managed,
}

impl fmt::Display for ClusterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterRole::Admin => write!(f, "Admin"),
            ClusterRole::Managed => write!(f, "Managed"),
        }
    }
}

/// Determines the role of the local cluster.
pub trait RoleDetector: Send + Sync {
    fn determine_role(&self) -> impl Future<Output = Result<ClusterRole, LookupError>> + Send;
}

/// Infers the cluster role from the presence of a marker object.
#[derive(Clone)]
pub struct MarkerRoleDetector<L> {
    lookup: L,
    namespace: String,
    name: String,
}

impl<L: ObjectLookup> MarkerRoleDetector<L> {
    pub fn new(lookup: L, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            lookup,
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl<L: ObjectLookup> RoleDetector for MarkerRoleDetector<L> {
    async fn determine_role(&self) -> Result<ClusterRole, LookupError> {
        let present = self.lookup.get_by_name(&self.namespace, &self.name).await?;
        let role = if present {
            ClusterRole::Managed
        } else {
            ClusterRole::Admin
        };
        debug!(
            marker = %self.name,
            namespace = %self.namespace,
            role = %role,
            "Determined cluster role"
        );
        Ok(role)
    }
}
