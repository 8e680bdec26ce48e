//! placement-webhook library crate
//!
//! Validating admission webhook for multi-cluster mirror resources. On the
//! admin cluster it requires every mirror resource to be placed on at least
//! one registered managed cluster; on managed clusters it accepts whatever
//! the admin cluster already admitted.

pub mod cluster;
pub mod config;
pub mod crd;
pub mod error;
pub mod health;
pub mod webhooks;

pub use config::WebhookConfig;
pub use error::{Error, Result};
pub use health::HealthState;
pub use webhooks::{
    AdmissionDecision, DenialCode, KubePlacementValidator, PlacementValidator, WebhookError,
    run_webhook_server,
};
