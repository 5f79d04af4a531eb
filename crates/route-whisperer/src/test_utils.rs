use axum::http::{Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::client::Body;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tower_test::mock::{self, Handle};

#[derive(Default)]
struct FakeState {
    config_maps: BTreeMap<(String, String), Value>,
    create_calls: usize,
    patch_calls: usize,
    fail_with: Option<u16>,
    fail_patches_with: Option<u16>,
}

/// In-memory stand-in for the ConfigMap endpoints of the Kubernetes API server.
///
/// Requests are served one at a time, which gives creates the same atomicity
/// the real API server has.
#[derive(Clone, Default)]
pub(crate) struct FakeApiServer {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApiServer {
    /// Must be called from within a tokio runtime
    pub(crate) fn start() -> (kube::Client, FakeApiServer) {
        let (mock_service, handle) = mock::pair::<Request<Body>, Response<Body>>();
        let server = FakeApiServer::default();
        tokio::spawn(server.clone().serve(handle));

        (kube::Client::new(mock_service, "default"), server)
    }

    async fn serve(self, mut handle: Handle<Request<Body>, Response<Body>>) {
        while let Some((request, send)) = handle.next_request().await {
            let (parts, body) = request.into_parts();
            let body = body
                .collect()
                .await
                .expect("cannot read request body")
                .to_bytes();

            let (status, payload) = self.handle(&parts.method, parts.uri.path(), &body);
            let payload = serde_json::to_vec(&payload).expect("cannot serialize response");
            send.send_response(
                Response::builder()
                    .status(status)
                    .body(Body::from(payload))
                    .expect("cannot build response"),
            );
        }
    }

    fn handle(&self, method: &Method, path: &str, body: &[u8]) -> (StatusCode, Value) {
        let mut state = self.state.lock().expect("lock poisoned");
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match (method, segments.as_slice()) {
            (&Method::POST, ["api", "v1", "namespaces", namespace, "configmaps"]) => {
                state.create_calls += 1;
                if let Some(code) = state.fail_with {
                    return failure(code, "InternalError", "injected failure".to_owned());
                }

                let mut config_map: Value =
                    serde_json::from_slice(body).expect("ConfigMap should be valid JSON");
                let name = config_map["metadata"]["name"]
                    .as_str()
                    .expect("ConfigMap should have a name")
                    .to_owned();
                let key = (namespace.to_string(), name.clone());
                if state.config_maps.contains_key(&key) {
                    return failure(
                        409,
                        "AlreadyExists",
                        format!("configmaps \"{name}\" already exists"),
                    );
                }

                config_map["metadata"]["namespace"] = json!(namespace);
                state.config_maps.insert(key, config_map.clone());
                (StatusCode::CREATED, config_map)
            }
            (&Method::PATCH, ["api", "v1", "namespaces", namespace, "configmaps", name]) => {
                state.patch_calls += 1;
                if let Some(code) = state.fail_with.or(state.fail_patches_with) {
                    return failure(code, "Forbidden", "injected failure".to_owned());
                }

                let patch: Value =
                    serde_json::from_slice(body).expect("patch should be valid JSON");
                match state
                    .config_maps
                    .get_mut(&(namespace.to_string(), name.to_string()))
                {
                    Some(config_map) => {
                        json_patch::merge(config_map, &patch);
                        (StatusCode::OK, config_map.clone())
                    }
                    None => not_found(name),
                }
            }
            (&Method::GET, ["api", "v1", "namespaces", namespace, "configmaps", name]) => {
                match state
                    .config_maps
                    .get(&(namespace.to_string(), name.to_string()))
                {
                    Some(config_map) => (StatusCode::OK, config_map.clone()),
                    None => not_found(name),
                }
            }
            _ => panic!("unexpected request: {method} {path}"),
        }
    }

    pub(crate) fn insert(&self, namespace: &str, config_map: ConfigMap) {
        let name = config_map
            .metadata
            .name
            .clone()
            .expect("ConfigMap should have a name");
        let value = serde_json::to_value(&config_map).expect("cannot serialize ConfigMap");
        self.state
            .lock()
            .expect("lock poisoned")
            .config_maps
            .insert((namespace.to_owned(), name), value);
    }

    pub(crate) fn config_map(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
        self.state
            .lock()
            .expect("lock poisoned")
            .config_maps
            .get(&(namespace.to_owned(), name.to_owned()))
            .map(|value| serde_json::from_value(value.clone()).expect("invalid ConfigMap"))
    }

    pub(crate) fn config_map_count(&self) -> usize {
        self.state.lock().expect("lock poisoned").config_maps.len()
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.state.lock().expect("lock poisoned").create_calls
    }

    pub(crate) fn patch_calls(&self) -> usize {
        self.state.lock().expect("lock poisoned").patch_calls
    }

    /// Make every following request fail with the given HTTP status code
    pub(crate) fn fail_with(&self, code: u16) {
        self.state.lock().expect("lock poisoned").fail_with = Some(code);
    }

    pub(crate) fn fail_patches_with(&self, code: u16) {
        self.state.lock().expect("lock poisoned").fail_patches_with = Some(code);
    }
}

fn not_found(name: &str) -> (StatusCode, Value) {
    failure(404, "NotFound", format!("configmaps \"{name}\" not found"))
}

fn failure(code: u16, reason: &str, message: String) -> (StatusCode, Value) {
    (
        StatusCode::from_u16(code).expect("invalid status code"),
        json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": message,
            "reason": reason,
            "code": code,
        }),
    )
}

pub(crate) fn create_request(uid: &str, name: &str, subnets: Value) -> Value {
    json!({
        "uid": uid,
        "kind": {"group": "k8s.ovn.org", "version": "v1", "kind": "ClusterUserDefinedNetwork"},
        "resource": {"group": "k8s.ovn.org", "version": "v1", "resource": "clusteruserdefinednetworks"},
        "name": name,
        "operation": "CREATE",
        "userInfo": {"username": "admin"},
        "object": {
            "apiVersion": "k8s.ovn.org/v1",
            "kind": "ClusterUserDefinedNetwork",
            "metadata": {"name": name},
            "spec": {"network": {"topology": "Layer2", "layer2": {"role": "Primary", "subnets": subnets}}}
        },
        "oldObject": null,
        "dryRun": false
    })
}

pub(crate) fn delete_request(uid: &str, name: &str, subnets: Value) -> Value {
    json!({
        "uid": uid,
        "kind": {"group": "k8s.ovn.org", "version": "v1", "kind": "ClusterUserDefinedNetwork"},
        "resource": {"group": "k8s.ovn.org", "version": "v1", "resource": "clusteruserdefinednetworks"},
        "name": name,
        "operation": "DELETE",
        "userInfo": {"username": "admin"},
        "object": null,
        "oldObject": {
            "apiVersion": "k8s.ovn.org/v1",
            "kind": "ClusterUserDefinedNetwork",
            "metadata": {"name": name, "labels": {"route-whisperer.openinfra.io/configmap": name}},
            "spec": {"network": {"topology": "Layer2", "layer2": {"role": "Primary", "subnets": subnets}}}
        },
        "dryRun": false
    })
}
