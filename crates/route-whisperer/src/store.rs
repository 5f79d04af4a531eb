//! Access to the ConfigMaps consumed by the route reconciler.
//!
//! The Kubernetes API has no upsert for ConfigMaps: a create either succeeds
//! atomically or fails with `409 Conflict`. [`ConfigMapStore::create`] turns
//! that status into [`StoreError::Conflict`] so callers can fall back to a patch.

use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, ObjectMeta, Patch, PatchParams, PostParams};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Label selecting every ConfigMap owned by the webhook
pub const MARKER_LABEL: &str = "route-whisperer.openinfra.io";

pub const SUBNETS_KEY: &str = "subnets";
pub const POPULATE_KEY: &str = "populate";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("ConfigMap already exists")]
    Conflict,

    #[error("kubernetes API error: {0}")]
    Api(#[from] kube::Error),
}

/// Desired content of the ConfigMap backing a network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompanionRecord {
    pub name: String,
    /// Canonical JSON of the subnets
    pub subnets: String,
    /// Whether the route reconciler must publish the route
    pub populate: bool,
}

impl CompanionRecord {
    pub fn data(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (SUBNETS_KEY.to_owned(), self.subnets.clone()),
            (POPULATE_KEY.to_owned(), self.populate.to_string()),
        ])
    }

    fn to_config_map(&self, namespace: &str) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(namespace.to_owned()),
                labels: Some(BTreeMap::from([(MARKER_LABEL.to_owned(), String::new())])),
                ..Default::default()
            },
            data: Some(self.data()),
            ..Default::default()
        }
    }
}

/// ConfigMap client bound to the namespace given at startup
#[derive(Clone)]
pub struct ConfigMapStore {
    api: Api<ConfigMap>,
    namespace: String,
}

impl ConfigMapStore {
    pub fn new(client: kube::Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            namespace: namespace.to_owned(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn create(&self, record: &CompanionRecord) -> Result<(), StoreError> {
        match self
            .api
            .create(&PostParams::default(), &record.to_config_map(&self.namespace))
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(status)) if status.code == 409 => Err(StoreError::Conflict),
            Err(e) => Err(StoreError::Api(e)),
        }
    }

    /// Merge the record data into the existing ConfigMap. Labels and any other
    /// data key are left untouched.
    pub async fn patch_data(&self, record: &CompanionRecord) -> Result<(), StoreError> {
        let patch = json!({ "data": record.data() });
        self.api
            .patch(&record.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        Ok(())
    }

    pub async fn get(&self, name: &str) -> Result<Option<ConfigMap>, StoreError> {
        Ok(self.api.get_opt(name).await?)
    }
}
