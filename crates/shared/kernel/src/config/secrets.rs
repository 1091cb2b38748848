use super::KEY_SEPARATOR;
use config::{ConfigError, Map, Source, Value, ValueKind};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Secret store mounted as a directory (Docker/Kubernetes secrets).
///
/// Each regular file is one key: `identity__jwt__secret` maps to
/// `identity.jwt.secret` and its trimmed contents become the value. Hidden
/// entries (such as Kubernetes `..data` links) are skipped.
#[derive(Debug, Clone)]
pub struct SecretsDir {
    directory: PathBuf,
}

impl SecretsDir {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self { directory: directory.as_ref().to_path_buf() }
    }

    fn read(&self) -> io::Result<Map<String, Value>> {
        let mut values = Map::new();
        let origin = self.directory.display().to_string();

        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(values),
            Err(e) => return Err(e),
        };

        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if name.starts_with('.') || !path.is_file() {
                continue;
            }

            let key = name.to_ascii_lowercase().replace(KEY_SEPARATOR, ".");
            let secret = fs::read_to_string(&path)?;
            let secret = ValueKind::String(secret.trim().to_owned());
            values.insert(key, Value::new(Some(&origin), secret));
        }

        Ok(values)
    }
}

impl Source for SecretsDir {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        self.read().map_err(|e| ConfigError::Foreign(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_yields_no_values() {
        let source = SecretsDir::new("/definitely/not/a/secrets/dir");
        let values = source.collect().expect("missing dir is not an error");
        assert!(values.is_empty());
    }

    #[test]
    fn files_become_dotted_keys_with_trimmed_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("identity__jwt__secret"), "s3cr3t\n").expect("write");
        fs::write(dir.path().join(".hidden"), "ignored").expect("write");
        fs::create_dir(dir.path().join("..data")).expect("mkdir");

        let values = SecretsDir::new(dir.path()).collect().expect("collect");

        assert_eq!(values.len(), 1);
        let value = values.get("identity.jwt.secret").cloned().expect("key present");
        assert_eq!(value.into_string().expect("string"), "s3cr3t");
    }
}
