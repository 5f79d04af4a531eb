use axum::{
    Json,
    extract::{self, FromRequest},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{Instrument, Span};

use crate::admission::dispatcher::mutate;
use crate::api::{
    admission_review::{AdmissionReviewRequest, AdmissionReviewResponse},
    api_error::ApiError,
    populate_span_with_admission_request_data, populate_span_with_mutation_results,
    state::ApiServerState,
};
use crate::tracing::dump_yaml;

// create an extractor that internally uses `axum::Json` but has a custom rejection
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct JsonExtractor<T>(T);

#[tracing::instrument(
    name = "mutation",
    fields(
        request_uid=tracing::field::Empty,
        host=crate::config::HOSTNAME.as_str(),
        name=tracing::field::Empty,
        operation=tracing::field::Empty,
        allowed=tracing::field::Empty,
        mutated=tracing::field::Empty,
        response_code=tracing::field::Empty,
        response_message=tracing::field::Empty,
    ),
    skip_all)]
/// Handle an AdmissionReview sent by the API server.
///
/// The mutation runs on its own task: once a ConfigMap write has been sent it
/// is completed even if the API server drops the connection.
pub(crate) async fn mutate_handler(
    extract::State(state): extract::State<Arc<ApiServerState>>,
    JsonExtractor(admission_review): JsonExtractor<AdmissionReviewRequest>,
) -> Result<Json<AdmissionReviewResponse>, ApiError> {
    let debug = state.context.debug;
    if debug {
        dump_yaml("AdmissionReview request", &admission_review);
    }

    if let Some(request) = &admission_review.request {
        populate_span_with_admission_request_data(request);
    }

    let response = tokio::spawn(
        async move { mutate(&state.context, admission_review.request).await }
            .instrument(Span::current()),
    )
    .await?;

    populate_span_with_mutation_results(&response);

    let review = AdmissionReviewResponse::new(response);
    if debug {
        dump_yaml("AdmissionReview response", &review);
    }

    Ok(Json(review))
}

pub(crate) async fn healthz_handler() -> &'static str {
    "ok"
}

pub(crate) async fn readiness_handler() -> StatusCode {
    StatusCode::OK
}
