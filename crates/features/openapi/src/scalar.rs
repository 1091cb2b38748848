//! Scalar API reference page.

use scaffold_domain::config::ApiConfig;
use serde_json::{Value, json};

const IMPERSONATION_SCOPE: &str = "user_impersonation";

/// Client defaults baked into the reference page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarOptions {
    pub client_id: String,
    pub preferred_security_scheme: String,
    /// Pre-selected OAuth2 scope; empty when none is configured.
    pub scope: String,
}

impl ScalarOptions {
    #[must_use]
    pub fn from_config(config: &ApiConfig) -> Self {
        let scope = config
            .identity
            .qualified_scopes()
            .into_iter()
            .find(|scope| scope.contains(IMPERSONATION_SCOPE))
            .unwrap_or_default();

        Self {
            client_id: config.identity.client_id.clone(),
            preferred_security_scheme: config.scalar.preferred_security_scheme.clone(),
            scope,
        }
    }

    /// Value of the `data-configuration` attribute.
    #[must_use]
    pub fn configuration(&self) -> Value {
        let scopes: Vec<&str> =
            if self.scope.is_empty() { Vec::new() } else { vec![self.scope.as_str()] };
        json!({
            "defaultHttpClient": { "targetKey": "shell", "clientKey": "curl" },
            "authentication": {
                "preferredSecurityScheme": self.preferred_security_scheme,
                "oAuth2": { "clientId": self.client_id, "scopes": scopes },
            },
        })
    }

    /// Page template; the document replaces `$spec`.
    #[must_use]
    pub fn html(&self) -> String {
        let configuration = escape_attribute(&self.configuration().to_string());
        format!(
            r#"<!doctype html>
<html>
<head>
    <title>API Reference</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1"/>
</head>
<body>
<script id="api-reference" type="application/json" data-configuration="{configuration}">
    $spec
</script>
<script src="https://cdn.jsdelivr.net/npm/@scalar/api-reference"></script>
</body>
</html>
"#
        )
    }
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
