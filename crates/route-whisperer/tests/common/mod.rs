use axum::Router;
use route_whisperer::{
    WebhookServer,
    config::{Config, TlsConfig},
};
use std::{net::SocketAddr, path::PathBuf};

pub(crate) const NAMESPACE: &str = "route-whisperer";

pub(crate) fn default_test_config() -> Config {
    Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 3443)),
        tls_config: TlsConfig {
            cert_file: PathBuf::from("/tmp/route-whisperer/tls.crt"),
            key_file: PathBuf::from("/tmp/route-whisperer/tls.key"),
        },
        namespace: NAMESPACE.to_owned(),
        debug: true,
        log_level: "debug".to_owned(),
        log_fmt: "json".to_owned(),
        log_no_color: false,
    }
}

pub(crate) fn app(config: Config, client: kube::Client) -> Router {
    let server = WebhookServer::new_with_client(config, client);

    server.router()
}
