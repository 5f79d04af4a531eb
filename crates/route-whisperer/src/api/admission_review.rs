use crate::admission::request::RawAdmissionRequest;
use crate::admission::response::AdmissionResponse;

/// An `admission.k8s.io/v1` AdmissionReview, as sent by the API server.
///
/// `request` is optional on purpose: a review without it is answered with a
/// denial instead of a transport error.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RawAdmissionRequest>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewResponse {
    pub api_version: String,
    pub kind: String,
    pub response: AdmissionResponse,
}

impl AdmissionReviewResponse {
    pub fn new(response: AdmissionResponse) -> Self {
        AdmissionReviewResponse {
            api_version: String::from("admission.k8s.io/v1"),
            kind: String::from("AdmissionReview"),
            response,
        }
    }
}
