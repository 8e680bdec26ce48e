//! Multi-step scenario tests for the placement webhook.
//!
//! These tests change the mocked cluster state between requests, inject
//! lookup faults, and check ordering and deadline behaviour.

use std::time::Duration;

use axum::http::StatusCode;
use placement_webhook::cluster::{ManagedClusterRegistry, MarkerRoleDetector};
use placement_webhook::crd::{MirrorResource, MultiClusterSecret};
use placement_webhook::webhooks::{PlacementValidator, WebhookState, create_webhook_router};
use serde_json::json;
use std::sync::Arc;

use crate::common::fixtures::{MC_NAMESPACE, REGISTRATION_SECRET, ReviewBuilder, SYSTEM_NAMESPACE};
use crate::mock_state::{MockClusterState, StalledLookup, send_review};

const PATH: &str = MultiClusterSecret::WEBHOOK_PATH;

// ============================================================================
// Live state
// ============================================================================

/// Registering a cluster after a denial makes the same request pass.
#[tokio::test]
async fn test_registration_is_observed_without_restart() {
    let state = MockClusterState::admin();
    let router = state.router();
    let body = ReviewBuilder::new("MultiClusterSecret")
        .cluster("late-cluster")
        .build();

    let res = send_review(router.clone(), PATH, &body).await;
    assert!(!res.allowed());

    state.register("late-cluster");
    let res = send_review(router.clone(), PATH, &body).await;
    assert!(res.allowed());

    state.deregister("late-cluster");
    let res = send_review(router, PATH, &body).await;
    assert!(!res.allowed());
    assert!(res.message().contains("late-cluster"));
}

/// The cluster role is re-read on every request.
#[tokio::test]
async fn test_role_change_is_observed_without_restart() {
    let state = MockClusterState::admin();
    let router = state.router();
    let body = ReviewBuilder::new("MultiClusterSecret").build();

    let res = send_review(router.clone(), PATH, &body).await;
    assert!(!res.allowed());

    state.add_marker();
    let res = send_review(router, PATH, &body).await;
    assert!(res.allowed());
}

/// Repeating a request against unchanged state gives the same answer.
#[tokio::test]
async fn test_repeated_requests_are_idempotent() {
    let state = MockClusterState::admin();
    state.register("east");
    let router = state.router();

    for body in [
        ReviewBuilder::new("MultiClusterSecret").cluster("east").build(),
        ReviewBuilder::new("MultiClusterSecret").cluster("west").build(),
        ReviewBuilder::new("MultiClusterSecret").build(),
    ] {
        let first = send_review(router.clone(), PATH, &body).await;
        let second = send_review(router.clone(), PATH, &body).await;
        assert_eq!(first.body, second.body);
    }
}

// ============================================================================
// Ordering
// ============================================================================

/// The first unregistered cluster in declaration order is reported.
#[tokio::test]
async fn test_first_missing_cluster_is_reported() {
    let state = MockClusterState::admin();
    let body = ReviewBuilder::new("MultiClusterSecret")
        .cluster("missing-a")
        .cluster("missing-b")
        .build();

    let res = send_review(state.router(), PATH, &body).await;
    assert!(!res.allowed());
    assert!(res.message().contains("missing-a"));
    assert!(!res.message().contains("missing-b"));
}

/// Lookups stop at the first unregistered cluster.
#[tokio::test]
async fn test_lookups_stop_at_first_missing_cluster() {
    let state = MockClusterState::admin();
    state.register("east");
    let body = ReviewBuilder::new("MultiClusterSecret")
        .cluster("east")
        .cluster("missing")
        .cluster("west")
        .build();

    let res = send_review(state.router(), PATH, &body).await;
    assert!(!res.allowed());
    // role marker + east + missing
    assert_eq!(state.lookups(), 3);
}

/// A managed cluster never consults the registry.
#[tokio::test]
async fn test_managed_cluster_only_reads_role_marker() {
    let state = MockClusterState::managed();
    let body = ReviewBuilder::new("MultiClusterSecret")
        .cluster("a")
        .cluster("b")
        .build();

    let res = send_review(state.router(), PATH, &body).await;
    assert!(res.allowed());
    assert_eq!(state.lookups(), 1);
}

// ============================================================================
// Non-validated operations and malformed input
// ============================================================================

/// DELETE is allowed without any lookup, even with no object in the request.
#[tokio::test]
async fn test_delete_is_allowed_without_lookups() {
    let state = MockClusterState::admin();
    let body = ReviewBuilder::new("MultiClusterSecret")
        .operation("DELETE")
        .build();

    let res = send_review(state.router(), PATH, &body).await;
    assert!(res.allowed());
    assert_eq!(state.lookups(), 0);
}

/// A malformed object is denied as a bad request before any lookup.
#[tokio::test]
async fn test_malformed_object_is_bad_request() {
    let state = MockClusterState::admin();
    let mut body = ReviewBuilder::new("MultiClusterSecret").build();
    body["request"]["object"]["spec"] = json!({ "placement": { "clusters": [42] } });

    let res = send_review(state.router(), PATH, &body).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(!res.allowed());
    assert!(res.message().contains("bad request"));
    assert_eq!(state.lookups(), 0);
}

/// Objects that are not valid Kubernetes objects still get an AdmissionReview
/// answer with the request UID.
#[tokio::test]
async fn test_unreadable_object_is_bad_request_with_uid() {
    let state = MockClusterState::admin();

    let mut non_string_name = ReviewBuilder::new("MultiClusterSecret").uid("uid-name").build();
    non_string_name["request"]["object"]["metadata"]["name"] = json!(42);
    let mut not_a_map = ReviewBuilder::new("MultiClusterSecret").uid("uid-garbage").build();
    not_a_map["request"]["object"] = json!("garbage");

    for (body, uid) in [(non_string_name, "uid-name"), (not_a_map, "uid-garbage")] {
        let res = send_review(state.router(), PATH, &body).await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(!res.allowed());
        assert_eq!(res.code(), "BadRequest");
        assert!(res.message().starts_with("[BadRequest] bad request"));
        assert_eq!(res.uid(), uid);
    }
    assert_eq!(state.lookups(), 0);
}

/// An unreadable old object does not block a DELETE.
#[tokio::test]
async fn test_unreadable_old_object_on_delete_is_allowed() {
    let state = MockClusterState::admin();
    let mut body = ReviewBuilder::new("MultiClusterSecret")
        .operation("DELETE")
        .build();
    body["request"]["oldObject"] = json!("garbage");

    let res = send_review(state.router(), PATH, &body).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.allowed());
}

/// A review without a request UID cannot be answered and is rejected.
#[tokio::test]
async fn test_review_without_uid_is_rejected() {
    let state = MockClusterState::admin();
    let mut body = ReviewBuilder::new("MultiClusterSecret").build();
    body["request"].as_object_mut().unwrap().remove("uid");

    let res = send_review(state.router(), PATH, &body).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(!res.allowed());
}

/// An object without a spec has an empty placement.
#[tokio::test]
async fn test_object_without_spec_is_missing_placement() {
    let state = MockClusterState::admin();
    let mut body = ReviewBuilder::new("MultiClusterSecret").build();
    body["request"]["object"]
        .as_object_mut()
        .unwrap()
        .remove("spec");

    let res = send_review(state.router(), PATH, &body).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(!res.allowed());
    assert_eq!(res.code(), "MissingPlacement");
    assert!(res.reason().contains("target cluster"));
}

/// The response carries the request UID.
#[tokio::test]
async fn test_response_uid_matches_request() {
    let state = MockClusterState::admin();
    let body = ReviewBuilder::new("MultiClusterSecret")
        .uid("0df28fbd-5f5f-11e8-bc74-36e6bb280816")
        .build();

    let res = send_review(state.router(), PATH, &body).await;
    assert_eq!(res.uid(), "0df28fbd-5f5f-11e8-bc74-36e6bb280816");
}

// ============================================================================
// Faults and deadlines
// ============================================================================

/// An unreachable API server denies with a reason that is not a policy violation.
#[tokio::test]
async fn test_unavailable_api_fails_closed() {
    let state = MockClusterState::admin();
    state.register("valid-cluster-name");
    state.set_unavailable(true);
    let body = ReviewBuilder::new("MultiClusterSecret")
        .cluster("valid-cluster-name")
        .build();

    let res = send_review(state.router(), PATH, &body).await;
    assert!(!res.allowed());
    assert_eq!(res.code(), "LookupFailed");
    assert!(res.message().contains("unable to determine cluster role"));
    assert!(!res.message().contains("not registered"));

    state.set_unavailable(false);
    let res = send_review(state.router(), PATH, &body).await;
    assert!(res.allowed());
}

/// A registry lookup that never answers is denied once the deadline passes.
#[tokio::test]
async fn test_stalled_registry_times_out_closed() {
    let roles = MarkerRoleDetector::new(MockClusterState::admin(), SYSTEM_NAMESPACE, REGISTRATION_SECRET);
    let registry = ManagedClusterRegistry::new(StalledLookup, MC_NAMESPACE);
    let validator = PlacementValidator::new(roles, registry, Duration::from_millis(50));
    let router = create_webhook_router(Arc::new(WebhookState::new(validator, None)));
    let body = ReviewBuilder::new("MultiClusterSecret")
        .cluster("valid-cluster-name")
        .build();

    let res = tokio::time::timeout(Duration::from_secs(5), send_review(router, PATH, &body))
        .await
        .expect("webhook must answer before the test timeout");
    assert!(!res.allowed());
    assert_eq!(res.code(), "LookupFailed");
    assert!(res.message().contains("valid-cluster-name"));
    assert!(res.message().contains("deadline"));
}

/// Concurrent requests against the same router are decided independently.
#[tokio::test]
async fn test_concurrent_requests() {
    let state = MockClusterState::admin();
    state.register("east");
    let router = state.router();

    let mut handles = Vec::new();
    for i in 0..16 {
        let router = router.clone();
        let cluster = if i % 2 == 0 { "east" } else { "west" };
        let body = ReviewBuilder::new("MultiClusterSecret")
            .uid(format!("uid-{i}"))
            .cluster(cluster)
            .build();
        handles.push(tokio::spawn(async move {
            (i, send_review(router, PATH, &body).await)
        }));
    }

    for handle in handles {
        let (i, res) = handle.await.unwrap();
        assert_eq!(res.uid(), format!("uid-{i}"));
        assert_eq!(res.allowed(), i % 2 == 0);
    }
}
