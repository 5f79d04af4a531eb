use crate::config::Config;
use crate::reconciler::Reconciler;
use crate::store::ConfigMapStore;

/// Everything a mutation needs. Built once at startup, shared read-only by
/// all the requests.
#[derive(Clone)]
pub struct WebhookContext {
    pub reconciler: Reconciler,
    pub debug: bool,
}

impl WebhookContext {
    pub fn new(client: kube::Client, config: &Config) -> Self {
        Self {
            reconciler: Reconciler::new(ConfigMapStore::new(client, &config.namespace)),
            debug: config.debug,
        }
    }
}
