use anyhow::Context;
use scaffold::domain::config::ApiConfig;
use scaffold::domain::constants::PRODUCTION;
use scaffold::domain::environment::HostEnvironment;
use scaffold::kernel::config::{ConfigLoader, DEFAULT_SECRETS_DIR, ENVIRONMENT_VAR, SECRETS_DIR_VAR};
use scaffold_logger::{LevelFilter, LogFormat, Logger};
use scaffold_server::Server;
use std::env;

const CONFIG_DIR_VAR: &str = "SCAFFOLD_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = "config";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment_name = env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| PRODUCTION.to_owned());
    let config_dir = env::var(CONFIG_DIR_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_owned());
    let secrets_dir = env::var(SECRETS_DIR_VAR).unwrap_or_else(|_| DEFAULT_SECRETS_DIR.to_owned());

    let loaded = ConfigLoader::new(config_dir)
        .environment(environment_name.clone())
        .secrets_dir(secrets_dir)
        .load::<ApiConfig>()
        .context("Critical: Configuration is malformed")?;

    let logging = &loaded.config.logging;
    let mut logger = Logger::builder(env!("CARGO_PKG_NAME"))
        .level(logging.level.parse::<LevelFilter>().context("Invalid logging.level")?)
        .format(logging.format.parse::<LogFormat>()?);
    if let Some(directives) = &logging.directives {
        logger = logger.directives(directives.clone());
    }
    if let Some(directory) = &logging.directory {
        logger = logger.directory(directory.clone());
    }
    let _log = logger.init()?;

    let environment =
        HostEnvironment::new(environment_name, env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Server::builder()
        .config(loaded.config)
        .config_view(loaded.view)
        .environment(environment)
        .build()?
        .run()
        .await
}
