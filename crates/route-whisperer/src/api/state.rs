use crate::context::WebhookContext;

pub(crate) struct ApiServerState {
    pub(crate) context: WebhookContext,
}
