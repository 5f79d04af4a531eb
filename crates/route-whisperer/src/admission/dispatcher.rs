use tracing::{error, warn};

use crate::admission::errors::MalformedRequest;
use crate::admission::patch::build_label_patch;
use crate::admission::request::{AdmissionRequest, Operation, RawAdmissionRequest, Resource};
use crate::admission::response::AdmissionResponse;
use crate::context::WebhookContext;
use crate::reconciler::ReconcileMode;
use crate::tracing::dump_yaml;

/// Validate the request carried by an AdmissionReview and dispatch it.
///
/// The outcome is always an [`AdmissionResponse`]: malformed requests and
/// store failures become denials.
pub async fn mutate(
    context: &WebhookContext,
    raw: Option<RawAdmissionRequest>,
) -> AdmissionResponse {
    let Some(raw) = raw else {
        warn!("{}", MalformedRequest::MissingRequest);
        return AdmissionResponse::reject_bad_request(
            String::new(),
            MalformedRequest::MissingRequest.to_string(),
        );
    };

    let uid = raw.uid.clone().unwrap_or_default();
    match AdmissionRequest::try_from(raw) {
        Ok(request) => dispatch(context, &request).await,
        Err(e) => {
            warn!(error = %e, "rejecting malformed admission request");
            AdmissionResponse::reject_bad_request(uid, e.to_string())
        }
    }
}

pub async fn dispatch(context: &WebhookContext, request: &AdmissionRequest) -> AdmissionResponse {
    match (&request.operation, &request.object, &request.old_object) {
        (Operation::Create, Some(resource), _) => publish(context, &request.uid, resource).await,
        (Operation::Delete, _, Some(resource)) => withdraw(context, &request.uid, resource).await,
        _ => AdmissionResponse::allow(request.uid.clone()),
    }
}

async fn publish(context: &WebhookContext, uid: &str, resource: &Resource) -> AdmissionResponse {
    if context.debug {
        dump_yaml("subnets", &resource.subnets);
    }

    if let Err(e) = context
        .reconciler
        .reconcile(ReconcileMode::Publish, &resource.name, &resource.subnets)
        .await
    {
        error!(error = %e, "cannot publish route");
        return AdmissionResponse::reject_internal_server_error(uid.to_owned(), e.to_string());
    }

    let patch = build_label_patch(&resource.name);
    if context.debug {
        dump_yaml("patches", &patch);
    }

    AdmissionResponse::allow(uid.to_owned())
        .with_patch(&patch)
        .unwrap_or_else(|e| {
            error!(error = %e, "cannot attach patch");
            AdmissionResponse::reject_internal_server_error(uid.to_owned(), e.to_string())
        })
}

async fn withdraw(context: &WebhookContext, uid: &str, resource: &Resource) -> AdmissionResponse {
    if context.debug {
        dump_yaml("subnets", &resource.subnets);
    }

    match context
        .reconciler
        .reconcile(ReconcileMode::Withdraw, &resource.name, &resource.subnets)
        .await
    {
        Ok(_) => AdmissionResponse::allow(uid.to_owned()),
        Err(e) => {
            error!(error = %e, "cannot withdraw route");
            AdmissionResponse::reject_internal_server_error(uid.to_owned(), e.to_string())
        }
    }
}
