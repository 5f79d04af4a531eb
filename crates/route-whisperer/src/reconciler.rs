use thiserror::Error;
use tracing::{debug, info};

use crate::admission::request::Subnets;
use crate::store::{CompanionRecord, ConfigMapStore, StoreError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReconcileMode {
    /// The network has been created: the route must be published
    Publish,
    /// The network is going away: the route must be withdrawn
    Withdraw,
}

impl ReconcileMode {
    fn populate(self) -> bool {
        matches!(self, ReconcileMode::Publish)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created,
    Updated,
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("cannot serialize subnets of {name}: {source}")]
    Serialize {
        name: String,
        source: serde_json::Error,
    },

    #[error("cannot create ConfigMap {namespace}/{name}: {source}")]
    Create {
        namespace: String,
        name: String,
        source: StoreError,
    },

    #[error("cannot update ConfigMap {namespace}/{name}: {source}")]
    Update {
        namespace: String,
        name: String,
        source: StoreError,
    },
}

/// Converges the companion ConfigMap of a network to the admitted state.
///
/// The ConfigMap is created first, since most of the times it does not exist yet.
/// When it already exists (the network was deleted and created again, or the API
/// server delivered the same admission twice) its data is patched instead.
/// Concurrent calls for the same name all write the same content, hence the
/// last writer winning is harmless. Failures are never retried here.
#[derive(Clone)]
pub struct Reconciler {
    store: ConfigMapStore,
}

impl Reconciler {
    pub fn new(store: ConfigMapStore) -> Self {
        Self { store }
    }

    pub async fn reconcile(
        &self,
        mode: ReconcileMode,
        name: &str,
        subnets: &Subnets,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let record = desired_record(mode, name, subnets)?;
        let namespace = self.store.namespace();

        match self.store.create(&record).await {
            Ok(()) => {
                info!(
                    config_map = name,
                    namespace,
                    populate = record.populate,
                    "created ConfigMap"
                );
                Ok(ReconcileOutcome::Created)
            }
            Err(StoreError::Conflict) => {
                debug!(
                    config_map = name,
                    namespace, "ConfigMap already exists, patching it"
                );
                self.store
                    .patch_data(&record)
                    .await
                    .map_err(|source| ReconcileError::Update {
                        namespace: namespace.to_owned(),
                        name: name.to_owned(),
                        source,
                    })?;
                info!(
                    config_map = name,
                    namespace,
                    populate = record.populate,
                    "updated ConfigMap"
                );
                Ok(ReconcileOutcome::Updated)
            }
            Err(source) => Err(ReconcileError::Create {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
                source,
            }),
        }
    }
}

fn desired_record(
    mode: ReconcileMode,
    name: &str,
    subnets: &Subnets,
) -> Result<CompanionRecord, ReconcileError> {
    let subnets = subnets
        .canonical()
        .map_err(|source| ReconcileError::Serialize {
            name: name.to_owned(),
            source,
        })?;

    Ok(CompanionRecord {
        name: name.to_owned(),
        subnets,
        populate: mode.populate(),
    })
}
