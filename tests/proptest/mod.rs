// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for placement-webhook.
//!
//! Uses proptest to generate placements and registry contents and verify the
//! placement policy invariants.

use std::collections::BTreeSet;
use std::time::Duration;

use proptest::prelude::*;

use placement_webhook::cluster::{ClusterRegistry, ClusterRole, LookupError, RoleDetector};
use placement_webhook::crd::{MirrorResourceView, Placement};
use placement_webhook::webhooks::{DenialCode, Operation, PlacementValidator};

/// Deterministic role for a test run.
struct FixedRole(ClusterRole);

impl RoleDetector for FixedRole {
    async fn determine_role(&self) -> Result<ClusterRole, LookupError> {
        Ok(self.0)
    }
}

/// Registry holding a fixed set of cluster names.
struct FixedRegistry(BTreeSet<String>);

impl ClusterRegistry for FixedRegistry {
    async fn exists(&self, cluster: &str) -> Result<bool, LookupError> {
        Ok(self.0.contains(cluster))
    }
}

/// Strategy for DNS-label-like cluster names.
fn cluster_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,14}"
}

/// Strategy for placements of 0-6 clusters.
fn placement() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(cluster_name(), 0..=6)
}

/// Strategy for registry contents.
fn registry() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(cluster_name(), 0..=6)
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![Just(Operation::Create), Just(Operation::Update)]
}

fn decide(
    role: ClusterRole,
    registered: BTreeSet<String>,
    clusters: &[String],
    op: Operation,
) -> placement_webhook::AdmissionDecision {
    let validator = PlacementValidator::new(
        FixedRole(role),
        FixedRegistry(registered),
        Duration::from_secs(5),
    );
    let view = MirrorResourceView {
        name: "test-mirror".to_string(),
        namespace: "mc-system".to_string(),
        placement: Placement::to_clusters(clusters.iter().cloned()),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    runtime.block_on(async {
        let ctx = validator.context(op, &view, false);
        validator.validate(&ctx).await
    })
}

proptest! {
    /// A managed cluster allows any placement.
    #[test]
    fn managed_always_allows(
        clusters in placement(),
        registered in registry(),
        op in operation(),
    ) {
        let decision = decide(ClusterRole::Managed, registered, &clusters, op);
        prop_assert!(decision.allowed);
        prop_assert!(decision.reason.is_empty());
    }

    /// The admin cluster denies an empty placement whatever is registered.
    #[test]
    fn admin_denies_empty_placement(registered in registry(), op in operation()) {
        let decision = decide(ClusterRole::Admin, registered, &[], op);
        prop_assert!(!decision.allowed);
        prop_assert!(decision.reason.contains("target cluster"));
    }

    /// On the admin cluster a placement is allowed exactly when it is
    /// non-empty and every cluster is registered; otherwise the first
    /// unregistered cluster is named.
    #[test]
    fn admin_reports_first_unregistered_cluster(
        clusters in placement(),
        registered in registry(),
        op in operation(),
    ) {
        let decision = decide(ClusterRole::Admin, registered.clone(), &clusters, op);
        let first_missing = clusters.iter().find(|c| !registered.contains(*c));

        match (clusters.is_empty(), first_missing) {
            (true, _) => {
                prop_assert_eq!(decision.code, Some(DenialCode::MissingPlacement));
            }
            (false, None) => {
                prop_assert!(decision.allowed);
            }
            (false, Some(missing)) => {
                prop_assert!(!decision.allowed);
                prop_assert_eq!(decision.code, Some(DenialCode::UnknownCluster));
                let expected = format!("cluster {missing} is not registered");
                prop_assert!(decision.reason.contains(&expected));
            }
        }
    }

    /// Registering every placed cluster always makes the admin cluster allow.
    #[test]
    fn admin_allows_fully_registered_placement(clusters in prop::collection::vec(cluster_name(), 1..=6)) {
        let registered: BTreeSet<String> = clusters.iter().cloned().collect();
        let decision = decide(ClusterRole::Admin, registered, &clusters, Operation::Create);
        prop_assert!(decision.allowed);
    }

    /// The same input against the same state always yields the same decision.
    #[test]
    fn decisions_are_idempotent(
        clusters in placement(),
        registered in registry(),
        op in operation(),
    ) {
        let first = decide(ClusterRole::Admin, registered.clone(), &clusters, op.clone());
        let second = decide(ClusterRole::Admin, registered, &clusters, op);
        prop_assert_eq!(first, second);
    }
}
