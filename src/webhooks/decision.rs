//! Admission decisions and their rendering into admission responses.

use std::fmt;

use kube::Resource;
use kube::core::admission::{AdmissionRequest, AdmissionResponse};

use super::policies::placement::PlacementOutcome;

/// Machine-readable category of a denial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DenialCode {
    /// The object could not be decoded
    BadRequest,
    /// No target clusters were listed
    MissingPlacement,
    /// A target cluster is not registered
    UnknownCluster,
    /// Role or registry state could not be read; the object itself may be fine
    LookupFailed,
}

impl fmt::Display for DenialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialCode::BadRequest => write!(f, "BadRequest"),
            DenialCode::MissingPlacement => write!(f, "MissingPlacement"),
            DenialCode::UnknownCluster => write!(f, "UnknownCluster"),
            DenialCode::LookupFailed => write!(f, "LookupFailed"),
        }
    }
}

/// Outcome of an admission check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub allowed: bool,
    /// Human-readable reason; empty when allowed
    pub reason: String,
    pub code: Option<DenialCode>,
    /// Set when a lookup ran out of time rather than failing outright
    pub deadline_exceeded: bool,
}

impl AdmissionDecision {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: String::new(),
            code: None,
            deadline_exceeded: false,
        }
    }

    pub fn denied(code: DenialCode, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            code: Some(code),
            deadline_exceeded: false,
        }
    }

    fn with_deadline_exceeded(mut self, deadline_exceeded: bool) -> Self {
        self.deadline_exceeded = deadline_exceeded;
        self
    }

    pub fn bad_request(detail: impl fmt::Display) -> Self {
        Self::denied(DenialCode::BadRequest, format!("bad request: {detail}"))
    }

    /// Whether the denial was caused by an infrastructure fault rather than
    /// by the object's contents.
    pub fn is_infrastructure_fault(&self) -> bool {
        self.code == Some(DenialCode::LookupFailed)
    }

    /// Render as an admission response.
    ///
    /// The message carries the code as "[code] reason"; `status.reason`
    /// carries the reason alone.
    pub fn into_response<T: Resource>(self, request: &AdmissionRequest<T>) -> AdmissionResponse {
        let response = AdmissionResponse::from(request);
        if self.allowed {
            return response;
        }

        let code = self.code.unwrap_or(DenialCode::BadRequest);
        let mut response = response.deny(format!("[{}] {}", code, self.reason));
        response.result.reason = self.reason;
        response
    }
}

impl From<PlacementOutcome> for AdmissionDecision {
    fn from(outcome: PlacementOutcome) -> Self {
        match outcome {
            PlacementOutcome::AllowManaged | PlacementOutcome::AllowValid => Self::allowed(),
            PlacementOutcome::DenyMissingPlacement => Self::denied(
                DenialCode::MissingPlacement,
                "one or more target clusters must be listed in spec.placement.clusters",
            ),
            PlacementOutcome::DenyMissingCluster { cluster } => Self::denied(
                DenialCode::UnknownCluster,
                format!("target managed cluster {cluster} is not registered"),
            ),
            PlacementOutcome::DenyRoleUnknown { detail, timed_out } => Self::denied(
                DenialCode::LookupFailed,
                format!("unable to determine cluster role, placement not evaluated: {detail}"),
            )
            .with_deadline_exceeded(timed_out),
            PlacementOutcome::DenyLookupFailed {
                cluster,
                detail,
                timed_out,
            } => Self::denied(
                DenialCode::LookupFailed,
                format!(
                    "unable to verify registration of managed cluster {cluster}, placement not evaluated: {detail}"
                ),
            )
            .with_deadline_exceeded(timed_out),
        }
    }
}
