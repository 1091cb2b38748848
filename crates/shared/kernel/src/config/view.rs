use config::{Map, Value, ValueKind};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Configuration layer that supplied a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigProvider {
    File { path: PathBuf },
    Environment { prefix: String },
    Secrets { directory: PathBuf },
}

impl ConfigProvider {
    pub fn file(path: &Path) -> Self {
        Self::File { path: path.to_path_buf() }
    }

    /// `true` for the secret store; its values are never displayed.
    #[must_use]
    pub const fn is_secret_store(&self) -> bool {
        matches!(self, Self::Secrets { .. })
    }
}

impl fmt::Display for ConfigProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path } => write!(f, "File: {}", path.display()),
            Self::Environment { prefix } => write!(f, "Environment: {prefix}"),
            Self::Secrets { directory } => write!(f, "Secrets: {}", directory.display()),
        }
    }
}

/// Effective value of a single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub value: String,
    pub provider: ConfigProvider,
}

/// Flattened `key -> (value, provider)` listing of the active configuration,
/// sorted by key. Keys use dotted paths (`identity.jwt.secret`), array items
/// an index suffix (`cors.origins[0]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigView {
    entries: BTreeMap<String, ConfigEntry>,
}

impl ConfigView {
    /// Sets a single key, replacing the value of an earlier layer.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        provider: ConfigProvider,
    ) {
        self.entries.insert(key.into(), ConfigEntry { value: value.into(), provider });
    }

    /// Overlays the values collected from one layer.
    pub fn merge(&mut self, provider: &ConfigProvider, collected: &Map<String, Value>) {
        for (key, value) in collected {
            self.flatten(key, value, provider);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mirrors how layers merge: tables merge key by key, anything else
    /// replaces the whole subtree below `key`.
    fn flatten(&mut self, key: &str, value: &Value, provider: &ConfigProvider) {
        match &value.kind {
            ValueKind::Table(table) => {
                self.remove_where(key, |rest| rest.is_empty() || rest.starts_with('['));
                for (child, value) in table {
                    self.flatten(&format!("{key}.{child}"), value, provider);
                }
            },
            ValueKind::Array(items) => {
                self.remove_subtree(key);
                for (index, value) in items.iter().enumerate() {
                    self.flatten(&format!("{key}[{index}]"), value, provider);
                }
            },
            ValueKind::Nil => self.remove_subtree(key),
            _ => {
                self.remove_subtree(key);
                if let Ok(text) = value.clone().into_string() {
                    self.insert(key, text, provider.clone());
                }
            },
        }
    }

    fn remove_subtree(&mut self, key: &str) {
        self.remove_where(key, |rest| {
            rest.is_empty() || rest.starts_with('.') || rest.starts_with('[')
        });
    }

    /// Drops entries below `key` whose remaining path matches `stale`.
    fn remove_where(&mut self, key: &str, stale: impl Fn(&str) -> bool) {
        self.entries
            .retain(|existing, _| existing.strip_prefix(key).is_none_or(|rest| !stale(rest)));
    }
}
