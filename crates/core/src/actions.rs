// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared envelope fields every action message carries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable dispatch key for one action type, e.g.
/// `type.googleapis.com/nodeagent.v1.ConfigureBaseOS`. Constructed from a
/// bare fully-qualified name; the `type.googleapis.com/` prefix is added
/// once and is not re-added on repeated wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeUrl(String);

const TYPE_URL_PREFIX: &str = "type.googleapis.com/";

impl TypeUrl {
    pub fn new(fully_qualified_name: &str) -> Self {
        Self(format!("{TYPE_URL_PREFIX}{fully_qualified_name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeUrl {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Caller-supplied name for one action instance, used only for logging and
/// step identification in the bootstrap executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionName(pub String);

impl ActionName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The `metadata` block every action envelope carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMetadata {
    #[serde(rename = "type")]
    pub type_url: TypeUrl,
    #[serde(default)]
    pub name: ActionName,
}

impl Default for ActionName {
    fn default() -> Self {
        Self(String::new())
    }
}

impl ActionMetadata {
    pub fn new(type_url: TypeUrl, name: impl Into<String>) -> Self {
        Self { type_url, name: ActionName(name.into()) }
    }
}

pub use crate::redact::{BOOTSTRAP_TOKEN_REDACTED, CLIENT_SECRET_REDACTED};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_url_has_stable_prefix() {
        let url = TypeUrl::new("nodeagent.v1.ConfigureBaseOS");
        assert_eq!(url.as_str(), "type.googleapis.com/nodeagent.v1.ConfigureBaseOS");
    }
}
