//! Decoding of admission requests into the generic mirror-resource view.

use kube::api::DynamicObject;
use kube::core::admission::{
    AdmissionRequest, AdmissionReview, ConvertAdmissionReviewError, Operation,
};
use serde_json::Value;
use thiserror::Error;

use crate::cluster::{ClusterRegistry, RoleDetector};
use crate::crd::{MirrorResource, MirrorResourceView};
use crate::webhooks::decision::AdmissionDecision;
use crate::webhooks::policies::PlacementValidator;

/// Errors decoding the object carried by an admission request
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("request carries no object")]
    MissingObject,

    #[error("expected kind {expected}, got {found}")]
    KindMismatch { expected: String, found: String },

    #[error("malformed object: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors reading the AdmissionReview envelope itself
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("malformed AdmissionReview: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error(transparent)]
    Convert(#[from] ConvertAdmissionReviewError),
}

/// An admission request whose envelope was read, with any failure to read
/// the embedded objects kept for the decision.
#[derive(Debug)]
pub struct IncomingReview {
    pub request: AdmissionRequest<DynamicObject>,
    object_error: Option<DecodeError>,
}

impl IncomingReview {
    /// Read an AdmissionReview body.
    ///
    /// Objects that are not even valid Kubernetes objects do not fail the
    /// envelope: the request is kept (uid included) and the error is
    /// answered as a bad request. Only a body without a usable `request`
    /// is an [`EnvelopeError`].
    pub fn from_value(mut body: Value) -> Result<Self, EnvelopeError> {
        let object_error = match serde_json::from_value::<AdmissionReview<DynamicObject>>(body.clone()) {
            Ok(review) => {
                return Ok(Self {
                    request: review.try_into()?,
                    object_error: None,
                });
            }
            Err(e) => e,
        };

        if let Some(request) = body.get_mut("request").and_then(Value::as_object_mut) {
            request.insert("object".to_string(), Value::Null);
            request.insert("oldObject".to_string(), Value::Null);
        }
        let review: AdmissionReview<DynamicObject> =
            serde_json::from_value(body).map_err(EnvelopeError::Malformed)?;
        Ok(Self {
            request: review.try_into()?,
            object_error: Some(DecodeError::Malformed(object_error)),
        })
    }
}

/// Decode a dynamic admission object as mirror kind `K`.
pub fn decode<K: MirrorResource>(
    object: Option<&DynamicObject>,
) -> Result<MirrorResourceView, DecodeError> {
    let object = object.ok_or(DecodeError::MissingObject)?;

    if let Some(types) = &object.types {
        let expected = K::kind(&());
        if types.kind != expected {
            return Err(DecodeError::KindMismatch {
                expected: expected.into_owned(),
                found: types.kind.clone(),
            });
        }
    }

    let mut value = serde_json::to_value(object)?;
    // An absent spec is an empty one, and so is its placement
    if let Some(fields) = value.as_object_mut() {
        let spec = fields.entry("spec").or_insert(Value::Null);
        if spec.is_null() {
            *spec = Value::Object(serde_json::Map::new());
        }
    }

    let resource: K = serde_json::from_value(value)?;
    Ok(resource.view())
}

/// Decide an admission request for mirror kind `K`.
///
/// Only CREATE and UPDATE are decoded and validated; anything else is allowed
/// untouched. Decode failures become a "bad request" denial.
pub async fn admit<K, R, C>(
    validator: &PlacementValidator<R, C>,
    review: &IncomingReview,
) -> AdmissionDecision
where
    K: MirrorResource,
    R: RoleDetector,
    C: ClusterRegistry,
{
    let request = &review.request;
    if !matches!(request.operation, Operation::Create | Operation::Update) {
        return AdmissionDecision::allowed();
    }
    if let Some(e) = &review.object_error {
        return AdmissionDecision::bad_request(e);
    }

    let view = match decode::<K>(request.object.as_ref()) {
        Ok(view) => view,
        Err(e) => return AdmissionDecision::bad_request(e),
    };

    let ctx = validator.context(request.operation.clone(), &view, request.dry_run);
    validator.validate(&ctx).await
}
