use axum::http::{Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use kube::client::Body;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower_test::mock::{self, Handle, SendResponse};

/// A request received by the mocked API server
#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

pub(crate) type Requests = Arc<Mutex<Vec<RecordedRequest>>>;

/// Scenarios describe how the API server answers the ConfigMap requests
#[derive(Clone, Copy)]
pub(crate) enum Scenario {
    /// No ConfigMap exists yet: creates succeed
    ConfigMapAbsent,
    /// The ConfigMap already exists: creates conflict, patches succeed
    ConfigMapPresent,
    /// Every request fails with an internal error
    ApiServerDown,
}

pub(crate) fn start(scenario: Scenario) -> (kube::Client, Requests) {
    let (mock_service, handle) = mock::pair::<Request<Body>, Response<Body>>();
    let requests = Requests::default();
    tokio::spawn(serve(scenario, handle, requests.clone()));

    (kube::Client::new(mock_service, "default"), requests)
}

async fn serve(
    scenario: Scenario,
    mut handle: Handle<Request<Body>, Response<Body>>,
    requests: Requests,
) {
    while let Some((request, send)) = handle.next_request().await {
        let (parts, body) = request.into_parts();
        let body = body.collect().await.unwrap().to_bytes();
        let body: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        requests.lock().unwrap().push(RecordedRequest {
            method: parts.method.clone(),
            path: parts.uri.path().to_owned(),
            body: body.clone(),
        });

        match (scenario, parts.method) {
            (Scenario::ApiServerDown, _) => send_response(
                send,
                StatusCode::INTERNAL_SERVER_ERROR,
                status(500, "InternalError"),
            ),
            (Scenario::ConfigMapAbsent, Method::POST) => {
                send_response(send, StatusCode::CREATED, body)
            }
            (Scenario::ConfigMapPresent, Method::POST) => {
                send_response(send, StatusCode::CONFLICT, status(409, "AlreadyExists"))
            }
            (Scenario::ConfigMapPresent, Method::PATCH) => {
                send_response(send, StatusCode::OK, existing_config_map(parts.uri.path()))
            }
            (_, method) => panic!("unexpected request: {method} {}", parts.uri.path()),
        }
    }
}

fn existing_config_map(path: &str) -> Value {
    let name = path.rsplit('/').next().unwrap();
    json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": "route-whisperer",
            "labels": {"route-whisperer.openinfra.io": ""}
        },
        "data": {"subnets": "[]", "populate": "true"}
    })
}

fn status(code: u16, reason: &str) -> Value {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": format!("mocked {reason}"),
        "reason": reason,
        "code": code,
    })
}

fn send_response<T: Serialize>(
    send: SendResponse<Response<Body>>,
    status: StatusCode,
    response: T,
) {
    let response = serde_json::to_vec(&response).unwrap();
    send.send_response(
        Response::builder()
            .status(status)
            .body(Body::from(response))
            .unwrap(),
    );
}
