use anyhow::{Result, anyhow};
use clap::ArgMatches;
use lazy_static::lazy_static;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

pub static SERVICE_NAME: &str = "route-whisperer";

lazy_static! {
    pub(crate) static ref HOSTNAME: String =
        std::env::var("HOSTNAME").unwrap_or_else(|_| String::from("unknown"));
}

/// Process configuration. Built once at startup and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub tls_config: TlsConfig,
    /// Namespace holding the companion ConfigMaps
    pub namespace: String,
    /// Dump admission payloads as YAML
    pub debug: bool,
    pub log_level: String,
    pub log_fmt: String,
    pub log_no_color: bool,
}

#[derive(Clone, Debug)]
pub struct TlsConfig {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

impl Config {
    pub fn from_args(matches: &ArgMatches) -> Result<Self> {
        let addr = api_bind_address(matches)?;
        let tls_config = tls_files(matches)?;

        let namespace = matches
            .get_one::<String>("namespace")
            .ok_or_else(|| anyhow!("error parsing arguments: --namespace is required"))?
            .trim()
            .to_owned();
        if namespace.is_empty() {
            return Err(anyhow!(
                "error parsing arguments: --namespace cannot be empty"
            ));
        }

        let debug = matches.get_flag("debug");
        let log_level = effective_log_level(
            matches
                .get_one::<String>("log-level")
                .map(String::as_str)
                .unwrap_or("info"),
            debug,
        )?;
        let log_fmt = matches
            .get_one::<String>("log-fmt")
            .cloned()
            .unwrap_or_else(|| String::from("text"));
        let log_no_color = matches.get_flag("log-no-color");

        Ok(Self {
            addr,
            tls_config,
            namespace,
            debug,
            log_level,
            log_fmt,
            log_no_color,
        })
    }
}

fn api_bind_address(matches: &ArgMatches) -> Result<SocketAddr> {
    let address = matches
        .get_one::<String>("address")
        .ok_or_else(|| anyhow!("error parsing arguments: --addr is required"))?;
    let port = matches
        .get_one::<u16>("https-port")
        .ok_or_else(|| anyhow!("error parsing arguments: --https-port is required"))?;

    format!("{address}:{port}")
        .parse()
        .map_err(|e| anyhow!("error parsing arguments: {}", e))
}

fn tls_files(matches: &ArgMatches) -> Result<TlsConfig> {
    let cert_file = matches
        .get_one::<String>("cert-file")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("error parsing arguments: --cert-file is required"))?;
    let key_file = matches
        .get_one::<String>("key-file")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("error parsing arguments: --key-file is required"))?;

    Ok(TlsConfig {
        cert_file,
        key_file,
    })
}

// The debug flag makes the payload dumps visible, which are emitted at debug level.
// A more verbose level requested by the user is left untouched.
fn effective_log_level(log_level: &str, debug: bool) -> Result<String> {
    let level = Level::from_str(log_level)
        .map_err(|e| anyhow!("error parsing arguments: invalid log level {log_level}: {e}"))?;

    if debug && level < Level::DEBUG {
        Ok(Level::DEBUG.as_str().to_lowercase())
    } else {
        Ok(log_level.to_owned())
    }
}
