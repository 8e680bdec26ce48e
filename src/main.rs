//! placement-webhook - validating admission webhook for multi-cluster placement.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Loads configuration from the environment
//! - Creates the Kubernetes client
//! - Starts the health server and, when certificates are present, the webhook server
//!
//! The webhook holds no state between requests, so every replica serves
//! traffic and no leader election is needed.

use std::sync::Arc;
use std::time::Duration;

use kube::Client;
use tokio::signal;
use tracing::{error, info, warn};

use placement_webhook::health::{HealthState, run_health_server};
use placement_webhook::{KubePlacementValidator, WebhookConfig, run_webhook_server};

/// Grace period for in-flight admission requests to complete during shutdown
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("placement_webhook=info".parse()?)
                .add_directive("kube=info".parse()?),
        )
        .json()
        .init();

    info!("Starting placement-webhook");

    // kube and axum-server both pull in rustls; pick one provider for the process
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider already installed");
    }

    let config = WebhookConfig::from_env()?;
    info!(
        multicluster_namespace = %config.multicluster_namespace,
        system_namespace = %config.system_namespace,
        registration_secret = %config.registration_secret,
        lookup_timeout_secs = config.lookup_timeout.as_secs(),
        "Loaded configuration"
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    // Start health server immediately so liveness probes work during start-up
    let health_handle = {
        let health_state = health_state.clone();
        let port = config.health_port;
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state, port).await {
                error!("Health server error: {}", e);
            }
        })
    };

    // The webhook is useless without TLS, so readiness depends on it
    let webhook_handle = if config.tls_available() {
        info!("TLS certificates found, starting webhook server");
        let validator = KubePlacementValidator::from_client(client, &config);
        let webhook_health = health_state.clone();
        let webhook_config = config.clone();
        health_state.set_ready(true).await;
        Some(tokio::spawn(async move {
            if let Err(e) =
                run_webhook_server(validator, Some(webhook_health), &webhook_config).await
            {
                error!("Webhook server error: {}", e);
            }
        }))
    } else {
        warn!(
            cert_path = %config.cert_path.display(),
            key_path = %config.key_path.display(),
            "Webhook certificates not found, webhook server disabled"
        );
        None
    };

    // Wait for any task to complete (or fail), or shutdown signal
    tokio::select! {
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        result = async {
            match webhook_handle {
                Some(handle) => handle.await,
                None => std::future::pending().await,
            }
        } => {
            if let Err(e) = result {
                error!("Webhook server task panicked: {}", e);
            }
        }
        // Handle graceful shutdown on SIGTERM or SIGINT
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Mark as not ready so the Service stops routing admissions here
            health_state.set_ready(false).await;
            info!("Marked webhook as not ready");

            info!(
                "Waiting {}s for in-flight admission requests to complete...",
                SHUTDOWN_GRACE_PERIOD_SECS
            );
            tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;

            info!("Grace period complete, shutting down");
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the webhook cannot shut down
/// gracefully without them. Using expect() here is intentional.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
