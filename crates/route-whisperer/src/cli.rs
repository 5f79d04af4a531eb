use clap::builder::PossibleValue;
use clap::{Arg, ArgAction, Command, crate_authors, crate_description, crate_name, crate_version};

pub fn build_cli() -> Command {
    let mut args = vec![
        Arg::new("log-level")
            .long("log-level")
            .value_name("LOG_LEVEL")
            .env("ROUTE_WHISPERER_LOG_LEVEL")
            .default_value("info")
            .value_parser([
                PossibleValue::new("trace"),
                PossibleValue::new("debug"),
                PossibleValue::new("info"),
                PossibleValue::new("warn"),
                PossibleValue::new("error"),
            ])
            .help("Log level"),
        Arg::new("log-fmt")
            .long("log-fmt")
            .value_name("LOG_FMT")
            .env("ROUTE_WHISPERER_LOG_FMT")
            .default_value("text")
            .value_parser([PossibleValue::new("text"), PossibleValue::new("json")])
            .help("Log output format"),
        Arg::new("log-no-color")
            .long("log-no-color")
            .env("NO_COLOR")
            .action(ArgAction::SetTrue)
            .help("Disable colored output for logs"),
        Arg::new("debug")
            .short('d')
            .long("debug")
            .env("ROUTE_WHISPERER_DEBUG")
            .action(ArgAction::SetTrue)
            .help("Dump request and response payloads in YAML format to the log"),
        Arg::new("cert-file")
            .short('c')
            .long("cert-file")
            .value_name("CERT_FILE")
            .env("ROUTE_WHISPERER_CERT_FILE")
            .required(true)
            .help("Location of PEM encoded TLS certificate file"),
        Arg::new("key-file")
            .short('k')
            .long("key-file")
            .value_name("KEY_FILE")
            .env("ROUTE_WHISPERER_KEY_FILE")
            .required(true)
            .help("Location of PEM encoded TLS private key file"),
        Arg::new("address")
            .long("addr")
            .value_name("BIND_ADDRESS")
            .default_value("0.0.0.0")
            .env("ROUTE_WHISPERER_BIND_ADDRESS")
            .help("Bind against ADDRESS"),
        Arg::new("https-port")
            .short('p')
            .long("https-port")
            .value_name("PORT")
            .env("ROUTE_WHISPERER_HTTPS_PORT")
            .required(true)
            .value_parser(clap::value_parser!(u16))
            .help("TCP port to bind the HTTPS server to"),
        Arg::new("namespace")
            .short('n')
            .long("namespace")
            .value_name("NAMESPACE")
            .env("ROUTE_WHISPERER_NAMESPACE")
            .required(true)
            .help("Namespace where the ConfigMaps read by the route reconciler are stored"),
    ];
    args.sort_by(|a, b| a.get_id().cmp(b.get_id()));

    Command::new(crate_name!())
        .author(crate_authors!())
        .version(crate_version!())
        .about(crate_description!())
        .args(args)
}
