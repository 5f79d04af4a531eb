use anyhow::{Result, anyhow};
use route_whisperer::{WebhookServer, cli, config::Config, tracing::setup_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let config = Config::from_args(&matches)?;

    // Starting from rustls 0.22, each application must set its default crypto provider.
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Cannot install the default crypto provider"))?;

    setup_tracing(&config.log_level, &config.log_fmt, config.log_no_color)?;

    let server = WebhookServer::new_from_config(config).await?;
    server.run().await
}
