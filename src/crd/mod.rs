//! Custom Resource Definitions (CRDs) for placement-webhook.
//!
//! - Mirror kinds (`MultiClusterSecret`, `MultiClusterConfigMap`, ...): resources
//!   replicated from the admin cluster according to their placement
//! - `ManagedCluster`: registry entry for a member cluster

mod managed_cluster;
mod mirror;
mod placement;

pub use managed_cluster::*;
pub use mirror::*;
pub use placement::*;
