pub mod admission_review;
pub(crate) mod api_error;
pub(crate) mod handlers;
pub(crate) mod state;

use tracing::Span;

use crate::admission::request::RawAdmissionRequest;
use crate::admission::response::AdmissionResponse;

pub(crate) fn populate_span_with_admission_request_data(request: &RawAdmissionRequest) {
    if let Some(uid) = &request.uid {
        Span::current().record("request_uid", uid.as_str());
    }
    let name = request.name.as_deref().or_else(|| {
        request
            .object
            .as_ref()
            .or(request.old_object.as_ref())
            .and_then(|object| object.pointer("/metadata/name"))
            .and_then(serde_json::Value::as_str)
    });
    if let Some(name) = name {
        Span::current().record("name", name);
    }
    if let Some(operation) = &request.operation {
        Span::current().record("operation", operation.as_str());
    }
}

pub(crate) fn populate_span_with_mutation_results(response: &AdmissionResponse) {
    Span::current().record("allowed", response.allowed);
    Span::current().record("mutated", response.patch.is_some());
    if let Some(status) = &response.status {
        if let Some(code) = &status.code {
            Span::current().record("response_code", code);
        }
        if let Some(message) = &status.message {
            Span::current().record("response_message", message.as_str());
        }
    }
}
