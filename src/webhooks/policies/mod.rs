//! Validation policies for multi-cluster mirror resources.
//!
//! A single policy applies to every mirror kind: placement validation, which
//! is enforced on CREATE and UPDATE only. DELETE and CONNECT are always allowed.

pub mod placement;

use std::time::Duration;

use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use kube::core::admission::Operation;
use tokio::time::Instant;

use crate::cluster::{
    ClusterRegistry, KubeLookup, ManagedClusterRegistry, MarkerRoleDetector, RoleDetector,
};
use crate::config::WebhookConfig;
use crate::crd::{ManagedCluster, MirrorResourceView};
use crate::webhooks::decision::AdmissionDecision;

/// Context for validation
pub struct ValidationContext<'a> {
    /// The resource being validated
    pub resource: &'a MirrorResourceView,
    /// The admission operation
    pub operation: Operation,
    /// Whether this is a dry-run request
    pub dry_run: bool,
    /// All cluster lookups must finish before this instant
    pub deadline: Instant,
}

impl<'a> ValidationContext<'a> {
    /// Check if the operation is subject to placement policy
    pub fn is_create_or_update(&self) -> bool {
        matches!(self.operation, Operation::Create | Operation::Update)
    }
}

/// Placement validator shared by every mirror resource kind.
///
/// Holds only read-only collaborators, so one instance serves concurrent
/// requests.
pub struct PlacementValidator<R, C> {
    roles: R,
    registry: C,
    lookup_timeout: Duration,
}

/// Validator backed by the Kubernetes API.
pub type KubePlacementValidator = PlacementValidator<
    MarkerRoleDetector<KubeLookup<Secret>>,
    ManagedClusterRegistry<KubeLookup<ManagedCluster>>,
>;

impl KubePlacementValidator {
    pub fn from_client(client: Client, config: &WebhookConfig) -> Self {
        let roles = MarkerRoleDetector::new(
            KubeLookup::new(client.clone()),
            config.system_namespace.clone(),
            config.registration_secret.clone(),
        );
        let registry =
            ManagedClusterRegistry::new(KubeLookup::new(client), config.multicluster_namespace.clone());
        Self::new(roles, registry, config.lookup_timeout)
    }
}

impl<R: RoleDetector, C: ClusterRegistry> PlacementValidator<R, C> {
    pub fn new(roles: R, registry: C, lookup_timeout: Duration) -> Self {
        Self {
            roles,
            registry,
            lookup_timeout,
        }
    }

    /// Build a validation context whose deadline starts now.
    pub fn context<'a>(
        &self,
        operation: Operation,
        resource: &'a MirrorResourceView,
        dry_run: bool,
    ) -> ValidationContext<'a> {
        ValidationContext {
            resource,
            operation,
            dry_run,
            deadline: Instant::now() + self.lookup_timeout,
        }
    }

    /// Run all validation policies
    pub async fn validate(&self, ctx: &ValidationContext<'_>) -> AdmissionDecision {
        if !ctx.is_create_or_update() {
            return AdmissionDecision::allowed();
        }

        placement::evaluate(
            &self.roles,
            &self.registry,
            &ctx.resource.placement,
            ctx.deadline,
        )
        .await
        .into()
    }
}
