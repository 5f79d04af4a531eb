use json_patch::jsonptr::PointerBuf;
use json_patch::{AddOperation, Patch, PatchOperation};
use serde_json::Value;

/// Label added to every admitted ClusterUserDefinedNetwork. Its value is the
/// name of the companion ConfigMap.
pub const CONFIGMAP_LABEL: &str = "route-whisperer.openinfra.io/configmap";

/// Build the patch labelling the resource with the name of its companion ConfigMap.
pub fn build_label_patch(resource_name: &str) -> Patch {
    Patch(vec![add_label(CONFIGMAP_LABEL, resource_name)])
}

// The tokens are escaped while building the pointer: `~` becomes `~0` and `/` becomes `~1`
fn add_label(key: &str, value: &str) -> PatchOperation {
    PatchOperation::Add(AddOperation {
        path: PointerBuf::from_tokens(["metadata", "labels", key]),
        value: Value::String(value.to_owned()),
    })
}
