//! Placement validation policy.
//!
//! Enforced on CREATE and UPDATE of every mirror resource kind.
//!
//! On the admin cluster the placement must name at least one cluster and
//! every named cluster must be registered. On a managed cluster the object
//! has already passed this check on the admin cluster before being
//! replicated, and the registry is not available locally, so any placement is
//! accepted.
//!
//! The role is always determined before any registry lookup, and each lookup
//! is bounded by the request deadline. Lookups run one at a time in
//! declaration order so the first unregistered cluster is the one reported.

use std::future::Future;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cluster::{ClusterRegistry, ClusterRole, LookupError, RoleDetector};
use crate::crd::Placement;

/// Terminal state of the placement state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// Running on a managed cluster; placement is not checked
    AllowManaged,
    /// Every target cluster is registered
    AllowValid,
    /// No target clusters were listed
    DenyMissingPlacement,
    /// The first unregistered target cluster
    DenyMissingCluster { cluster: String },
    /// The cluster role could not be determined
    DenyRoleUnknown { detail: String, timed_out: bool },
    /// A registry lookup failed for this cluster
    DenyLookupFailed {
        cluster: String,
        detail: String,
        timed_out: bool,
    },
}

impl PlacementOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(
            self,
            PlacementOutcome::AllowManaged | PlacementOutcome::AllowValid
        )
    }
}

/// Run the placement state machine.
pub async fn evaluate<R, C>(
    roles: &R,
    registry: &C,
    placement: &Placement,
    deadline: Instant,
) -> PlacementOutcome
where
    R: RoleDetector,
    C: ClusterRegistry,
{
    let role = match bounded(deadline, roles.determine_role()).await {
        Ok(role) => role,
        Err(e) => {
            warn!(error = %e, "Cluster role lookup failed, denying");
            return PlacementOutcome::DenyRoleUnknown {
                detail: e.to_string(),
                timed_out: e.is_timeout(),
            };
        }
    };

    if role == ClusterRole::Managed {
        debug!("Managed cluster, skipping placement checks");
        return PlacementOutcome::AllowManaged;
    }

    if placement.is_empty() {
        return PlacementOutcome::DenyMissingPlacement;
    }

    for cluster in &placement.clusters {
        match bounded(deadline, registry.exists(&cluster.name)).await {
            Ok(true) => {}
            Ok(false) => {
                return PlacementOutcome::DenyMissingCluster {
                    cluster: cluster.name.clone(),
                };
            }
            Err(e) => {
                warn!(cluster = %cluster.name, error = %e, "Managed cluster lookup failed, denying");
                return PlacementOutcome::DenyLookupFailed {
                    cluster: cluster.name.clone(),
                    detail: e.to_string(),
                    timed_out: e.is_timeout(),
                };
            }
        }
    }

    PlacementOutcome::AllowValid
}

async fn bounded<T, F>(deadline: Instant, lookup: F) -> Result<T, LookupError>
where
    F: Future<Output = Result<T, LookupError>>,
{
    tokio::time::timeout_at(deadline, lookup)
        .await
        .unwrap_or(Err(LookupError::DeadlineExceeded))
}
