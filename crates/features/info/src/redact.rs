use scaffold_domain::constants::REDACTED;
use scaffold_kernel::config::ConfigView;
use std::fmt::Write;

/// Key fragments whose values are never shown, compared against the key
/// lowercased with `_` and `-` removed.
const SENSITIVE_KEY_PARTS: [&str; 3] = ["connectionstring", "auth", "secret"];

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized: String =
        key.chars().filter(|c| *c != '_' && *c != '-').flat_map(char::to_lowercase).collect();
    SENSITIVE_KEY_PARTS.iter().any(|part| normalized.contains(part))
}

/// One `key = value (provider)` line per key, sorted by key. Values from the
/// secret store and from sensitive keys are replaced with `******`.
pub fn redacted_dump(view: &ConfigView) -> String {
    let mut dump = String::new();
    for (key, entry) in view.iter() {
        let hidden = entry.provider.is_secret_store() || is_sensitive_key(key);
        let value = if hidden { REDACTED } else { entry.value.as_str() };
        let _ = writeln!(dump, "{key} = {value} ({})", entry.provider);
    }
    dump
}
