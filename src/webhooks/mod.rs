//! Webhook module for validating admission requests.
//!
//! Every multi-cluster mirror kind is served by the same pipeline:
//! decode ([`gateway`]) → placement policy ([`policies`]) → decision
//! ([`decision`]) → AdmissionReview response ([`server`]).

pub mod decision;
pub mod gateway;
pub mod policies;
mod server;

pub use decision::{AdmissionDecision, DenialCode};
pub use gateway::{DecodeError, EnvelopeError, IncomingReview, admit, decode};
pub use policies::{KubePlacementValidator, PlacementValidator, ValidationContext};
pub use server::{WebhookError, WebhookState, create_webhook_router, run_webhook_server};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
