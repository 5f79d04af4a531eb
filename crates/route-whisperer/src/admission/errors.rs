use thiserror::Error;

use crate::admission::request::SUBNETS_POINTER;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MalformedRequest {
    #[error("admission review has no request")]
    MissingRequest,

    #[error("admission request has no uid")]
    MissingUid,

    #[error("admission request has no operation")]
    MissingOperation,

    #[error("{operation} admission request has no resource name")]
    MissingName { operation: String },

    #[error("{operation} admission request has no {field}")]
    MissingObject {
        operation: String,
        field: &'static str,
    },

    #[error("{field} has no {pointer} sequence", pointer = SUBNETS_POINTER)]
    MissingSubnets { field: &'static str },
}

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("cannot serialize JSON patch: {0}")]
    SerializePatch(#[from] serde_json::Error),
}
