use clap::Parser;
use ferrous_q_domain::config::CliOverrides;
use ferrous_q_domain::{
    AddressFamily, ClientSubnet, Config, EdnsOptions, Endpoint, HeaderFlags, Net, TransportKind,
    TsigKey,
};
use ferrous_q_infrastructure::dns::dnssec::{load_pinned_key, KeyReference};
use ferrous_q_infrastructure::system::ResolvConfReader;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

mod args;
mod bootstrap;
mod output;
mod runner;

#[derive(Parser)]
#[command(name = "q")]
#[command(version)]
#[command(about = "q - a small DNS query tool with signature checking")]
struct Cli {
    /// [@server] [qtype] [qclass] [name ...]
    #[arg(value_name = "ARGS")]
    args: Vec<String>,

    /// Abbreviate long DNSSEC records
    #[arg(long)]
    short: bool,

    /// Request DNSSEC records
    #[arg(long)]
    dnssec: bool,

    /// Print the question before sending it
    #[arg(long)]
    question: bool,

    /// Check RRSIGs in the response
    #[arg(long)]
    check: bool,

    /// Use IPv4 only
    #[arg(short = '4', conflicts_with = "ipv6")]
    ipv4: bool,

    /// Use IPv6 only
    #[arg(short = '6')]
    ipv6: bool,

    /// Use the DNSKEY in this file instead of fetching one
    #[arg(long, value_name = "FILE")]
    anchor: Option<PathBuf>,

    /// TSIG key, [hmac:]name:secret
    #[arg(long, value_name = "KEY")]
    tsig: Option<String>,

    /// Port number to use
    #[arg(long)]
    port: Option<u16>,

    /// Set AA flag in query
    #[arg(long)]
    aa: bool,

    /// Set AD flag in query
    #[arg(long)]
    ad: bool,

    /// Set CD flag in query
    #[arg(long)]
    cd: bool,

    /// Set RD flag in query
    #[arg(long, value_name = "BOOL")]
    rd: Option<bool>,

    /// Retry a truncated answer with EDNS0, then TCP
    #[arg(long)]
    fallback: bool,

    /// Query over TCP
    #[arg(long)]
    tcp: bool,

    /// Ask for the NSID
    #[arg(long)]
    nsid: bool,

    /// Add an EDNS0 client-subnet option for this address
    #[arg(long, value_name = "IP")]
    client: Option<String>,

    /// SOA serial to send with an IXFR query
    #[arg(long, value_name = "N")]
    serial: Option<u32>,

    /// Per-exchange timeout in milliseconds, 0 to wait forever
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        port: cli.port,
        timeout_ms: cli.timeout_ms,
        fallback: cli.fallback,
        tcp: cli.tcp,
        recursion_desired: cli.rd,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    let settings = build_settings(&cli, &config).await?;
    runner::run(settings).await
}

async fn build_settings(cli: &Cli, config: &Config) -> anyhow::Result<runner::Settings> {
    let targets = args::parse_targets(&cli.args);

    let client_subnet = cli.client.as_deref().map(ClientSubnet::parse).transpose()?;
    let tsig = cli
        .tsig
        .as_deref()
        .map(TsigKey::parse)
        .transpose()?
        .map(Arc::new);

    let server = match &targets.server {
        Some(server) => server.clone(),
        None => system_nameserver(&config.query.resolv_conf).await,
    };
    let endpoint = Endpoint::parse(&server, config.query.port);

    let family = if cli.ipv4 {
        AddressFamily::V4
    } else if cli.ipv6 {
        AddressFamily::V6
    } else {
        AddressFamily::Any
    };
    let kind = if config.query.tcp {
        TransportKind::Tcp
    } else {
        TransportKind::Udp
    };

    let key = match &cli.anchor {
        Some(path) => match load_pinned_key(path).await {
            Ok(key) => KeyReference::Pinned(key),
            Err(e) => {
                eprintln!("{}", e);
                KeyReference::Network
            }
        },
        None => KeyReference::Network,
    };

    let flags = HeaderFlags {
        authoritative: cli.aa,
        authenticated_data: cli.ad,
        checking_disabled: cli.cd,
        recursion_desired: config.query.recursion_desired,
    };

    debug!(
        server = %endpoint,
        names = targets.names.len(),
        pinned_key = key.is_pinned(),
        "Query plan ready"
    );

    Ok(runner::Settings {
        endpoint,
        net: Net::new(kind, family),
        flags,
        edns: EdnsOptions::for_request(
            cli.dnssec,
            cli.nsid,
            client_subnet,
            config.query.udp_payload_size,
        ),
        tsig,
        ixfr_serial: cli.serial,
        key,
        timeout: config.query.timeout(),
        fallback: config.query.fallback,
        udp_payload_size: config.query.udp_payload_size,
        show_question: cli.question,
        check: cli.check,
        short: cli.short,
        targets,
    })
}

/// First nameserver of the system resolver configuration, or loopback.
async fn system_nameserver(resolv_conf: &str) -> String {
    match ResolvConfReader::with_path(resolv_conf).nameservers().await {
        Ok(servers) => match servers.first() {
            Some(ip) => ip.to_string(),
            None => "127.0.0.1".to_string(),
        },
        Err(e) => {
            warn!(path = %resolv_conf, error = %e, "Cannot read resolver configuration");
            "127.0.0.1".to_string()
        }
    }
}
