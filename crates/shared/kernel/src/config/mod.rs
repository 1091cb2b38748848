//! Layered configuration loading.
//!
//! Layers, later ones win:
//! 1. `{directory}/server.toml`
//! 2. `{directory}/server.{Environment}.toml` (optional)
//! 3. environment variables `SCAFFOLD__SECTION__KEY`
//! 4. the secrets directory, one file per key named `section__key`
//!
//! Next to the typed snapshot the loader records a [`ConfigView`]: every
//! effective key with the layer that supplied it.

mod secrets;
mod view;

pub use secrets::SecretsDir;
pub use view::{ConfigEntry, ConfigProvider, ConfigView};

use config::{Config, Environment, File, FileFormat, Map, Source};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix of environment variable overrides (`SCAFFOLD__SERVER__PORT`).
pub const ENV_PREFIX: &str = "SCAFFOLD";
/// Separator between nested keys in environment variables and secret file names.
pub const KEY_SEPARATOR: &str = "__";
/// Selects the host environment name.
pub const ENVIRONMENT_VAR: &str = "SCAFFOLD_ENVIRONMENT";
/// Overrides the secrets directory.
pub const SECRETS_DIR_VAR: &str = "SCAFFOLD_SECRETS_DIR";
/// Secrets directory used when [`SECRETS_DIR_VAR`] is not set.
pub const DEFAULT_SECRETS_DIR: &str = "/run/secrets";

const BASE_FILE: &str = "server";

#[scaffold_derive::scaffold_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Typed configuration together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig<T> {
    pub config: T,
    pub view: ConfigView,
}

type Layer = (ConfigProvider, Box<dyn Source + Send + Sync>);

/// Builds the layered configuration for one process.
#[derive(Debug, Clone)]
#[must_use = "The loader does nothing until `load` is called."]
pub struct ConfigLoader {
    directory: PathBuf,
    environment: Option<String>,
    secrets_dir: Option<PathBuf>,
    env_vars: Option<Map<String, String>>,
    require_base: bool,
}

impl ConfigLoader {
    /// Loader reading `server.toml` from `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            environment: None,
            secrets_dir: None,
            env_vars: None,
            require_base: true,
        }
    }

    /// Adds the optional `server.{name}.toml` layer.
    pub fn environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    /// Adds the secrets directory layer. A missing directory contributes nothing.
    pub fn secrets_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.secrets_dir = Some(path.into());
        self
    }

    /// Reads overrides from the given variables instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Starts from defaults when `server.toml` does not exist.
    pub const fn optional_base(mut self) -> Self {
        self.require_base = false;
        self
    }

    /// Loads every layer and deserializes the merged result.
    ///
    /// # Errors
    /// Returns an error if a required file is missing, a layer cannot be
    /// parsed, or the merged values do not match `T`.
    pub fn load<T>(&self) -> Result<LoadedConfig<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        let mut view = ConfigView::default();
        let mut sources: Vec<Box<dyn Source + Send + Sync>> = Vec::new();

        for (provider, source) in self.layers() {
            let collected = source.collect().context(format!("Failed to read {provider}"))?;
            debug!(%provider, keys = collected.len(), "Configuration layer collected");
            view.merge(&provider, &collected);
            sources.push(source);
        }

        info!(
            directory = %self.directory.display(),
            environment = ?self.environment,
            "Loading config"
        );

        let config = Config::builder()
            .add_source(sources)
            .build()
            .context("Failed to build config")?
            .try_deserialize::<T>()
            .context("Failed to deserialize config")?;

        Ok(LoadedConfig { config, view })
    }

    fn layers(&self) -> Vec<Layer> {
        let mut layers: Vec<Layer> = Vec::with_capacity(4);

        let base = self.directory.join(format!("{BASE_FILE}.toml"));
        layers.push((ConfigProvider::file(&base), Box::new(file(&base, self.require_base))));

        if let Some(environment) = &self.environment {
            let overlay = self.directory.join(format!("{BASE_FILE}.{environment}.toml"));
            layers.push((ConfigProvider::file(&overlay), Box::new(file(&overlay, false))));
        }

        let env = Environment::with_prefix(ENV_PREFIX)
            .separator(KEY_SEPARATOR)
            .source(self.env_vars.clone());
        let prefix = format!("{ENV_PREFIX}{KEY_SEPARATOR}");
        layers.push((ConfigProvider::Environment { prefix }, Box::new(env)));

        if let Some(directory) = &self.secrets_dir {
            layers.push((
                ConfigProvider::Secrets { directory: directory.clone() },
                Box::new(SecretsDir::new(directory)),
            ));
        }

        layers
    }
}

fn file(path: &Path, required: bool) -> impl Source + Send + Sync + 'static {
    File::from(path).format(FileFormat::Toml).required(required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_follow_precedence_order() {
        let loader = ConfigLoader::new("cfg").environment("Staging").secrets_dir("/run/secrets");
        let providers: Vec<String> =
            loader.layers().into_iter().map(|(p, _)| p.to_string()).collect();

        assert_eq!(providers.len(), 4);
        assert!(providers[0].ends_with("server.toml"));
        assert!(providers[1].ends_with("server.Staging.toml"));
        assert!(providers[2].contains("SCAFFOLD__"));
        assert!(providers[3].contains("/run/secrets"));
    }

    #[test]
    fn environment_and_secrets_layers_are_optional() {
        let loader = ConfigLoader::new("cfg");
        assert_eq!(loader.layers().len(), 2);
    }
}
