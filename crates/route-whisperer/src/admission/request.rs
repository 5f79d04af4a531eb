use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::admission::errors::MalformedRequest;

/// JSON pointer of the subnets inside of a ClusterUserDefinedNetwork
pub const SUBNETS_POINTER: &str = "/spec/network/layer2/subnets";

/// The `request` field of an AdmissionReview, as received on the wire.
///
/// Every field is optional: the API server is trusted to send well formed
/// reviews, but a missing field must turn into a denial instead of a crash.
/// [`AdmissionRequest::try_from`] performs the validation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAdmissionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_object: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
    /// Anything the API server may add in the future. Passed through untouched.
    Other(String),
}

impl From<&str> for Operation {
    fn from(operation: &str) -> Self {
        match operation {
            "CREATE" => Operation::Create,
            "UPDATE" => Operation::Update,
            "DELETE" => Operation::Delete,
            "CONNECT" => Operation::Connect,
            other => Operation::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Connect => write!(f, "CONNECT"),
            Operation::Other(other) => write!(f, "{other}"),
        }
    }
}

/// Subnets of a network, in the order they are declared.
/// The descriptors are opaque and never interpreted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subnets(Vec<Value>);

impl Subnets {
    pub fn new(subnets: Vec<Value>) -> Self {
        Subnets(subnets)
    }

    /// Compact JSON encoding, byte-identical for identical input.
    pub fn canonical(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The ClusterUserDefinedNetwork being admitted
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    pub name: String,
    pub subnets: Subnets,
}

impl Resource {
    fn from_object(
        name: &str,
        object: &Value,
        field: &'static str,
    ) -> Result<Self, MalformedRequest> {
        let subnets = object
            .pointer(SUBNETS_POINTER)
            .and_then(Value::as_array)
            .ok_or(MalformedRequest::MissingSubnets { field })?;

        Ok(Resource {
            name: name.to_owned(),
            subnets: Subnets::new(subnets.to_owned()),
        })
    }
}

/// A validated admission request.
///
/// `object` is always set for CREATE, `old_object` is always set for DELETE.
#[derive(Clone, Debug, PartialEq)]
pub struct AdmissionRequest {
    pub uid: String,
    pub operation: Operation,
    pub object: Option<Resource>,
    pub old_object: Option<Resource>,
}

impl TryFrom<RawAdmissionRequest> for AdmissionRequest {
    type Error = MalformedRequest;

    fn try_from(raw: RawAdmissionRequest) -> Result<Self, Self::Error> {
        let uid = raw
            .uid
            .filter(|uid| !uid.is_empty())
            .ok_or(MalformedRequest::MissingUid)?;
        let operation = raw
            .operation
            .as_deref()
            .filter(|operation| !operation.is_empty())
            .map(Operation::from)
            .ok_or(MalformedRequest::MissingOperation)?;

        let name = raw
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| metadata_name(raw.object.as_ref()))
            .or_else(|| metadata_name(raw.old_object.as_ref()));

        let (object, old_object) = match operation {
            Operation::Create => {
                let name = name.ok_or(MalformedRequest::MissingName {
                    operation: operation.to_string(),
                })?;
                let object = raw.object.as_ref().ok_or(MalformedRequest::MissingObject {
                    operation: operation.to_string(),
                    field: "object",
                })?;
                (Some(Resource::from_object(&name, object, "object")?), None)
            }
            Operation::Delete => {
                let name = name.ok_or(MalformedRequest::MissingName {
                    operation: operation.to_string(),
                })?;
                let old_object = raw
                    .old_object
                    .as_ref()
                    .ok_or(MalformedRequest::MissingObject {
                        operation: operation.to_string(),
                        field: "oldObject",
                    })?;
                (
                    None,
                    Some(Resource::from_object(&name, old_object, "oldObject")?),
                )
            }
            _ => (None, None),
        };

        Ok(AdmissionRequest {
            uid,
            operation,
            object,
            old_object,
        })
    }
}

fn metadata_name(object: Option<&Value>) -> Option<String> {
    object
        .and_then(|object| object.pointer("/metadata/name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}
