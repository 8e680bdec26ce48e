//! Admission webhook server.
//!
//! Provides one HTTP endpoint per multi-cluster mirror kind, all backed by the
//! same placement validator.
//!
//! To enable webhooks:
//! 1. Deploy cert-manager for TLS certificates
//! 2. Create a ValidatingWebhookConfiguration for each mirror kind
//! 3. Mount the TLS certificate secret to the webhook pod at /etc/webhook/certs/
//!
//! The webhook server starts automatically when certificates are present.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use kube::core::admission::AdmissionResponse;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::cluster::{ClusterRegistry, RoleDetector};
use crate::config::WebhookConfig;
use crate::crd::{
    MirrorResource, MultiClusterApplicationConfiguration, MultiClusterComponent,
    MultiClusterConfigMap, MultiClusterSecret,
};
use crate::health::HealthState;
use crate::webhooks::gateway::{IncomingReview, admit};
use crate::webhooks::policies::{KubePlacementValidator, PlacementValidator};

/// Shared state for webhook handlers
pub struct WebhookState<R, C> {
    pub validator: PlacementValidator<R, C>,
    /// Optional health state for metrics
    pub health_state: Option<Arc<HealthState>>,
}

impl<R, C> WebhookState<R, C> {
    pub fn new(validator: PlacementValidator<R, C>, health_state: Option<Arc<HealthState>>) -> Self {
        Self {
            validator,
            health_state,
        }
    }
}

/// Create the webhook router with one validation endpoint per mirror kind
pub fn create_webhook_router<R, C>(state: Arc<WebhookState<R, C>>) -> Router
where
    R: RoleDetector + 'static,
    C: ClusterRegistry + 'static,
{
    Router::new()
        .route(
            MultiClusterSecret::WEBHOOK_PATH,
            post(validate_mirror::<MultiClusterSecret, R, C>),
        )
        .route(
            MultiClusterConfigMap::WEBHOOK_PATH,
            post(validate_mirror::<MultiClusterConfigMap, R, C>),
        )
        .route(
            MultiClusterComponent::WEBHOOK_PATH,
            post(validate_mirror::<MultiClusterComponent, R, C>),
        )
        .route(
            MultiClusterApplicationConfiguration::WEBHOOK_PATH,
            post(validate_mirror::<MultiClusterApplicationConfiguration, R, C>),
        )
        .with_state(state)
}

/// Validate a mirror resource admission webhook handler
///
/// The body is read as plain JSON so that an unreadable object still gets an
/// AdmissionReview answer carrying the request uid.
async fn validate_mirror<K, R, C>(
    State(state): State<Arc<WebhookState<R, C>>>,
    Json(body): Json<Value>,
) -> impl IntoResponse
where
    K: MirrorResource,
    R: RoleDetector,
    C: ClusterRegistry,
{
    let kind = K::kind(&());
    let review = match IncomingReview::from_value(body) {
        Ok(review) => review,
        Err(e) => {
            error!(error = %e, kind = %kind, "Failed to extract admission request");
            return (
                StatusCode::BAD_REQUEST,
                Json(
                    AdmissionResponse::invalid(format!("Invalid AdmissionReview: {}", e))
                        .into_review(),
                ),
            );
        }
    };
    let request = &review.request;

    let uid = &request.uid;
    let operation = format!("{:?}", request.operation);
    debug!(
        uid = %uid,
        kind = %kind,
        operation = %operation,
        namespace = ?request.namespace,
        name = ?request.name,
        dry_run = request.dry_run,
        "Processing admission request"
    );

    let started = Instant::now();
    let decision = admit::<K, R, C>(&state.validator, &review).await;

    if let Some(ref health) = state.health_state {
        health.metrics.record_admission(
            &kind,
            &operation,
            &decision,
            started.elapsed().as_secs_f64(),
        );
    }

    if decision.allowed {
        info!(uid = %uid, kind = %kind, operation = %operation, "Admission request allowed");
    } else if decision.is_infrastructure_fault() {
        error!(uid = %uid, kind = %kind, reason = %decision.reason, "Admission request denied, cluster state unavailable");
    } else {
        warn!(uid = %uid, kind = %kind, reason = %decision.reason, "Admission request denied");
    }

    (
        StatusCode::OK,
        Json(decision.into_response(request).into_review()),
    )
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),
    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),
}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0 on the configured webhook port and serves one validation
/// endpoint per mirror kind. TLS certificates are loaded from the configured
/// paths.
pub async fn run_webhook_server(
    validator: KubePlacementValidator,
    health_state: Option<Arc<HealthState>>,
    config: &WebhookConfig,
) -> Result<(), WebhookError> {
    use axum_server::tls_rustls::RustlsConfig;

    let state = Arc::new(WebhookState::new(validator, health_state));
    let app = create_webhook_router(state);

    let tls = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path)
        .await
        .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.webhook_port));
    info!(port = config.webhook_port, "Webhook server listening with TLS");

    axum_server::bind_rustls(addr, tls)
        .serve(app.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}
