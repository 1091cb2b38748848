use crate::constants::{DEVELOPMENT, PRODUCTION};
use std::borrow::Cow;

/// The hosting environment the process runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    /// Environment name, e.g. `Development`, `Production`, `IntegrationTest`.
    pub name: Cow<'static, str>,
    /// Name of the entry binary.
    pub application_name: Cow<'static, str>,
    /// Version of the entry binary.
    pub application_version: Cow<'static, str>,
}

impl HostEnvironment {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        application_name: impl Into<Cow<'static, str>>,
        application_version: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            name: name.into(),
            application_name: application_name.into(),
            application_version: application_version.into(),
        }
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.is(DEVELOPMENT)
    }

    /// Case-insensitive comparison of the environment name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::new(PRODUCTION, "scaffold", "0.0.0")
    }
}
