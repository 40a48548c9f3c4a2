use ferrous_q_domain::config::CliOverrides;
use ferrous_q_domain::Config;
use tracing::debug;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    debug!(
        config_file = config_path.unwrap_or("default"),
        port = config.query.port,
        timeout_ms = config.query.timeout_ms,
        fallback = config.query.fallback,
        tcp = config.query.tcp,
        "Configuration loaded"
    );

    Ok(config)
}
