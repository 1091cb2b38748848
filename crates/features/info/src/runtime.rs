//! Facts about the toolchain, platform and executable.

use crate::error::{InfoError, InfoErrorExt};
use chrono::{DateTime, Local};
use std::env::consts::{ARCH, OS};
use std::fs;

const BUILD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Platform facts captured once when the module registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeFacts {
    /// Compiler the service was built with, e.g. `rustc 1.93.0 (...)`.
    pub framework_description: &'static str,
    /// Target triple the service was built for.
    pub runtime_identifier: &'static str,
    pub os_version: String,
    pub os_architecture: &'static str,
}

impl RuntimeFacts {
    #[must_use]
    pub fn capture() -> Self {
        Self {
            framework_description: env!("SCAFFOLD_RUSTC_VERSION"),
            runtime_identifier: env!("SCAFFOLD_TARGET"),
            os_version: os_version(),
            os_architecture: ARCH,
        }
    }
}

/// OS family plus the kernel release where the platform exposes it.
fn os_version() -> String {
    match fs::read_to_string("/proc/sys/kernel/osrelease") {
        Ok(release) if !release.trim().is_empty() => format!("{OS} {}", release.trim()),
        _ => OS.to_owned(),
    }
}

/// Modification time of the running executable, local time.
///
/// # Errors
/// Returns an error if the executable path or its metadata cannot be read.
pub fn build_date() -> Result<String, InfoError> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let modified = fs::metadata(&exe)
        .and_then(|metadata| metadata.modified())
        .context(format!("Failed to read modification time of {}", exe.display()))?;

    Ok(DateTime::<Local>::from(modified).format(BUILD_DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn facts_come_from_build_time_and_platform() {
        let facts = RuntimeFacts::capture();
        assert!(facts.framework_description.starts_with("rustc"));
        assert!(!facts.runtime_identifier.is_empty());
        assert!(facts.os_version.starts_with(OS));
        assert_eq!(facts.os_architecture, ARCH);
    }

    #[test]
    fn build_date_uses_fixed_format() {
        let date = build_date().expect("test binary has metadata");
        assert!(
            NaiveDateTime::parse_from_str(&date, BUILD_DATE_FORMAT).is_ok(),
            "unexpected format: {date}"
        );
    }
}
