//! Descriptors of the feature modules registered at startup.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Identity of a registered feature module, reported by `GET /info/modules`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureModuleInfo {
    pub name: Cow<'static, str>,
    pub version: Cow<'static, str>,
}

impl FeatureModuleInfo {
    pub fn new(name: impl Into<Cow<'static, str>>, version: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into(), version: version.into() }
    }
}
