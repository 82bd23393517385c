//! Plugin configuration loading and types.
//!
//! The host hands the plugin a YAML document. Most values in it are
//! [`SourceRef`]s: either an inline literal or a pointer to a file or an
//! environment variable that holds the real value.

use idm_scim_client::auth::{ClientCertificate, ScimCredentials};
use idm_scim_client::client::{ScimClient, ScimClientConfig};
use idm_scim_client::error::ScimClientError;
use idm_scim_client::request::ListMethod;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::Span;

/// Errors raised while loading the configuration or building the client from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse yaml configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed loading {field}: {reason}")]
    Source { field: String, reason: String },

    #[error("invalid value '{value}' for {name}")]
    InvalidParam { name: String, value: String },

    #[error(transparent)]
    Client(#[from] ScimClientError),
}

/// Where a configuration value lives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SourceLocation {
    /// Inline value.
    Embedded { value: Value },
    /// Contents of a file, without trailing newlines.
    File { path: PathBuf },
    /// Value of an environment variable.
    Env { name: String },
}

/// A configuration value given inline or by reference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SourceRef {
    Reference(SourceLocation),
    Literal(Value),
}

impl SourceRef {
    /// Shorthand for an inline string value.
    pub fn literal(value: impl Into<String>) -> Self {
        SourceRef::Literal(Value::String(value.into()))
    }

    /// Resolve the reference to its string value. `field` names the value in errors.
    pub fn load(&self, field: &str) -> Result<String, ConfigError> {
        let source_error = |reason: String| ConfigError::Source {
            field: field.to_string(),
            reason,
        };

        match self {
            SourceRef::Literal(value) | SourceRef::Reference(SourceLocation::Embedded { value }) => {
                scalar_to_string(value).ok_or_else(|| source_error("expected a scalar value".into()))
            }
            SourceRef::Reference(SourceLocation::File { path }) => std::fs::read_to_string(path)
                .map(|contents| contents.trim_end_matches(['\n', '\r']).to_string())
                .map_err(|e| source_error(format!("cannot read {}: {e}", path.display()))),
            SourceRef::Reference(SourceLocation::Env { name }) => std::env::var(name)
                .map_err(|e| source_error(format!("environment variable {name}: {e}"))),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Root plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    /// Base URL of the SCIM service provider.
    pub host: SourceRef,
    pub auth: AuthConfig,
    #[serde(default)]
    pub auth_context: Option<AuthContextConfig>,
    #[serde(default)]
    pub params: ParamsConfig,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

/// Authentication material for the SCIM service provider.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(flatten)]
    pub mode: AuthMode,
    /// Extra PEM root CA trusted for the server.
    #[serde(default)]
    pub ca: Option<SourceRef>,
}

/// Authentication mode, selected by the `type` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum AuthMode {
    Basic {
        client_id: SourceRef,
        #[serde(default)]
        client_secret: Option<SourceRef>,
    },
    Mtls {
        client_id: SourceRef,
        /// PEM certificate.
        cert: SourceRef,
        /// PEM private key.
        key: SourceRef,
    },
    OAuth2 {
        client_id: SourceRef,
        #[serde(default)]
        client_secret: Option<SourceRef>,
        token_endpoint: SourceRef,
        #[serde(default)]
        scopes: Vec<String>,
    },
}

impl AuthMode {
    fn client_id(&self) -> &SourceRef {
        match self {
            AuthMode::Basic { client_id, .. }
            | AuthMode::Mtls { client_id, .. }
            | AuthMode::OAuth2 { client_id, .. } => client_id,
        }
    }

    /// Resolve every reference into client credentials.
    ///
    /// The client id is checked before any other reference is loaded, so a
    /// blank id is reported as such whatever else is wrong.
    pub fn credentials(&self) -> Result<ScimCredentials, ConfigError> {
        let client_id = self.client_id().load("auth.clientId")?;
        if client_id.trim().is_empty() {
            return Err(ScimClientError::ClientIdRequired.into());
        }

        let credentials = match self {
            AuthMode::Basic { client_secret, .. } => ScimCredentials::Basic {
                client_id,
                client_secret: load_secret(client_secret.as_ref())?,
            },
            AuthMode::Mtls { cert, key, .. } => ScimCredentials::Mtls {
                client_id,
                certificate: ClientCertificate::from_pem(
                    cert.load("auth.cert")?,
                    key.load("auth.key")?,
                ),
            },
            AuthMode::OAuth2 {
                client_secret,
                token_endpoint,
                scopes,
                ..
            } => ScimCredentials::OAuth2 {
                client_id,
                client_secret: load_secret(client_secret.as_ref())?,
                token_endpoint: token_endpoint.load("auth.tokenEndpoint")?,
                scopes: scopes.clone(),
            },
        };
        credentials.validate()?;
        Ok(credentials)
    }
}

/// An absent secret resolves to `""`, which credential validation rejects.
fn load_secret(secret: Option<&SourceRef>) -> Result<String, ConfigError> {
    secret
        .map(|secret| secret.load("auth.clientSecret"))
        .transpose()
        .map(Option::unwrap_or_default)
}

/// How to derive the target of each request from the caller's auth context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContextConfig {
    /// Context key holding the host. Empty keeps the configured host.
    #[serde(default)]
    pub host_field: String,
    /// Header name to context key.
    #[serde(default)]
    pub header_fields: BTreeMap<String, String>,
    /// Appended to the host taken from the context.
    #[serde(default)]
    pub base_path: String,
}

/// Raw resolution parameters, each optional and given by reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamsConfig {
    #[serde(default)]
    pub group_attribute: Option<SourceRef>,
    #[serde(default)]
    pub user_attribute: Option<SourceRef>,
    #[serde(default)]
    pub group_members_attribute: Option<SourceRef>,
    #[serde(default)]
    pub list_method: Option<SourceRef>,
    #[serde(default)]
    pub allow_search_users_by_group: Option<SourceRef>,
}

pub const DEFAULT_GROUP_ATTRIBUTE: &str = "displayName";
pub const DEFAULT_USER_ATTRIBUTE: &str = "groups.display";
pub const DEFAULT_GROUP_MEMBERS_ATTRIBUTE: &str = "groups.value";

/// Resolved parameters controlling attribute names, list method and
/// membership strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionParams {
    /// Attribute matched against the group name by `get_group`.
    pub group_attribute: String,
    /// Attribute matched against the user id by `get_groups_for_user`.
    pub user_attribute: String,
    /// User attribute matched against the group id by the direct search strategy.
    pub group_members_attribute: String,
    pub list_method: ListMethod,
    /// Resolve group members with one user search instead of walking `members`.
    pub allow_search_users_by_group: bool,
}

impl Default for ResolutionParams {
    fn default() -> Self {
        Self {
            group_attribute: DEFAULT_GROUP_ATTRIBUTE.to_string(),
            user_attribute: DEFAULT_USER_ATTRIBUTE.to_string(),
            group_members_attribute: DEFAULT_GROUP_MEMBERS_ATTRIBUTE.to_string(),
            list_method: ListMethod::Get,
            allow_search_users_by_group: true,
        }
    }
}

impl ParamsConfig {
    /// Resolve every parameter, falling back to defaults for absent or empty values.
    pub fn resolve(&self) -> Result<ResolutionParams, ConfigError> {
        let defaults = ResolutionParams::default();

        let list_method = match load_param(self.list_method.as_ref(), "params.listMethod")? {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidParam {
                name: "params.listMethod".into(),
                value: raw,
            })?,
            None => defaults.list_method,
        };

        let allow_search_users_by_group = match load_param(
            self.allow_search_users_by_group.as_ref(),
            "params.allowSearchUsersByGroup",
        )? {
            Some(raw) => parse_bool("params.allowSearchUsersByGroup", raw)?,
            None => defaults.allow_search_users_by_group,
        };

        Ok(ResolutionParams {
            group_attribute: load_param(self.group_attribute.as_ref(), "params.groupAttribute")?
                .unwrap_or(defaults.group_attribute),
            user_attribute: load_param(self.user_attribute.as_ref(), "params.userAttribute")?
                .unwrap_or(defaults.user_attribute),
            group_members_attribute: load_param(
                self.group_members_attribute.as_ref(),
                "params.groupMembersAttribute",
            )?
            .unwrap_or(defaults.group_members_attribute),
            list_method,
            allow_search_users_by_group,
        })
    }
}

/// Load a string parameter. `None` when absent or blank.
///
/// Values stored as JSON strings (`"\"displayName\""`) are unquoted.
fn load_param(source: Option<&SourceRef>, name: &str) -> Result<Option<String>, ConfigError> {
    let Some(source) = source else {
        return Ok(None);
    };
    let raw = source.load(name)?;
    let trimmed = raw.trim();

    let value = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed).map_err(|_| ConfigError::InvalidParam {
            name: name.to_string(),
            value: raw.clone(),
        })?
    } else {
        trimmed.to_string()
    };

    Ok((!value.is_empty()).then_some(value))
}

fn parse_bool(name: &str, raw: String) -> Result<bool, ConfigError> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::InvalidParam {
            name: name.to_string(),
            value: raw,
        })
    }
}

impl PluginConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolve host, credentials and transport settings.
    pub fn client_config(&self) -> Result<ScimClientConfig, ConfigError> {
        let credentials = self.auth.mode.credentials()?;
        let host = self.host.load("host")?;

        let mut config = ScimClientConfig::new(host, credentials)
            .with_timeout(Duration::from_secs(self.request_timeout_secs));
        if let Some(ca) = &self.auth.ca {
            config = config.with_root_ca(ca.load("auth.ca")?);
        }
        Ok(config)
    }

    /// Build the SCIM client, logging under `span`.
    pub fn build_client(&self, span: Span) -> Result<ScimClient, ConfigError> {
        let client = ScimClient::new(self.client_config()?)?;
        Ok(client.with_span(span))
    }
}
