//! SCIM 2.0 lookup client (reqwest-based).
//!
//! Provides a [`ScimClient`] that reads users and groups from a SCIM 2.0
//! service provider using the RFC 7644 retrieval operations.

use crate::auth::{ScimAuth, ScimCredentials};
use crate::decode::{decode_response, SCIM_API};
use crate::error::{RequestError, ScimClientError, ScimClientResult, ScimOperation};
use crate::filter::FilterExpression;
use crate::models::{Group, GroupList, User, UserList};
use crate::request::{ListMethod, ListRequest, Page};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, HOST,
};
use reqwest::{Certificate, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, Instrument, Span};

/// Media type of every SCIM request and response body.
pub const SCIM_JSON: &str = "application/scim+json";

/// Users collection path.
pub const USERS_PATH: &str = "/Users";

/// Groups collection path.
pub const GROUPS_PATH: &str = "/Groups";

/// Headers the client sets itself; a [`RequestTarget`] may not override them.
const RESERVED_HEADERS: [HeaderName; 4] = [ACCEPT, AUTHORIZATION, CONTENT_TYPE, HOST];

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to build a [`ScimClient`].
#[derive(Debug, Clone)]
pub struct ScimClientConfig {
    /// Base URL of the service provider (e.g. `https://idp.example.com/scim/v2`).
    pub host: String,
    pub credentials: ScimCredentials,
    pub timeout: Duration,
    /// Additional PEM root certificate trusted for the server.
    pub root_ca_pem: Option<Vec<u8>>,
}

impl ScimClientConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, credentials: ScimCredentials) -> Self {
        Self {
            host: host.into(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
            root_ca_pem: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_root_ca(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.root_ca_pem = Some(pem.into());
        self
    }
}

/// Per-request override of the target host and extra headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTarget {
    pub host: Option<String>,
    pub headers: Vec<(String, String)>,
}

/// SCIM 2.0 HTTP client for user and group lookups.
///
/// Cloning is cheap: clones share the connection pool and the `OAuth2` token
/// cache.
#[derive(Debug, Clone)]
pub struct ScimClient {
    /// Base URL of the SCIM service provider, without a trailing slash.
    base_url: String,
    /// Authentication handler.
    auth: ScimAuth,
    /// Underlying HTTP client.
    http_client: Client,
    /// Extra headers sent with every request.
    headers: HeaderMap,
    /// Span that request logging is recorded under.
    span: Span,
}

impl ScimClient {
    /// Create a new SCIM client.
    ///
    /// The host is not validated here; a malformed host surfaces as a
    /// transport error on the first request.
    pub fn new(config: ScimClientConfig) -> ScimClientResult<Self> {
        config.credentials.validate()?;

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("idm-scim-client/", env!("CARGO_PKG_VERSION")));

        if let Some(identity) = config.credentials.identity()? {
            builder = builder.identity(identity);
        }
        if let Some(pem) = &config.root_ca_pem {
            let roots = Certificate::from_pem_bundle(pem)
                .map_err(|e| ScimClientError::HttpClient(format!("invalid root CA: {e}")))?;
            if roots.is_empty() {
                return Err(ScimClientError::HttpClient(
                    "invalid root CA: no certificates found".into(),
                ));
            }
            for root in roots {
                builder = builder.add_root_certificate(root);
            }
        }

        let http_client = builder
            .build()
            .map_err(|e| ScimClientError::HttpClient(e.to_string()))?;
        let auth = ScimAuth::new(config.credentials, http_client.clone());

        Ok(Self::with_http_client(config.host, auth, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(base_url: String, auth: ScimAuth, http_client: Client) -> Self {
        Self {
            base_url: normalize_base_url(&base_url),
            auth,
            http_client,
            headers: HeaderMap::new(),
            span: Span::none(),
        }
    }

    /// Record request logging under `span`.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// A clone of this client that talks to `target.host` (when set) and adds
    /// `target.headers` to every request.
    ///
    /// `Accept`, `Authorization`, `Content-Type` and `Host` are rejected.
    pub fn scoped(&self, target: &RequestTarget) -> ScimClientResult<Self> {
        let mut scoped = self.clone();
        if let Some(host) = &target.host {
            scoped.base_url = normalize_base_url(host);
        }
        for (name, value) in &target.headers {
            let invalid = |reason: String| ScimClientError::InvalidHeader {
                name: name.clone(),
                reason,
            };
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
            if RESERVED_HEADERS.contains(&header) {
                return Err(invalid("header is set by the client".into()));
            }
            let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
            scoped.headers.insert(header, value);
        }
        Ok(scoped)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn credentials(&self) -> &ScimCredentials {
        self.auth.credentials()
    }

    // ── User Operations ───────────────────────────────────────────────

    /// Get a user by their SCIM ID (GET /Users/:id).
    pub async fn get_user(&self, id: &str) -> ScimClientResult<User> {
        let url = format!("{}{USERS_PATH}/{id}", self.base_url);
        self.send(Method::GET, url, None)
            .await
            .map_err(|e| ScimClientError::wrap(ScimOperation::GetUser, e))
    }

    /// List users (GET /Users/ or POST /Users/.search).
    pub async fn list_users(
        &self,
        method: ListMethod,
        filter: &FilterExpression,
        page: &Page,
    ) -> ScimClientResult<UserList> {
        self.list(ScimOperation::ListUsers, USERS_PATH, method, filter, page)
            .await
    }

    // ── Group Operations ──────────────────────────────────────────────

    /// Get a group by SCIM ID (GET /Groups/:id).
    pub async fn get_group(&self, id: &str) -> ScimClientResult<Group> {
        let url = format!("{}{GROUPS_PATH}/{id}", self.base_url);
        self.send(Method::GET, url, None)
            .await
            .map_err(|e| ScimClientError::wrap(ScimOperation::GetGroup, e))
    }

    /// List groups (GET /Groups/ or POST /Groups/.search).
    pub async fn list_groups(
        &self,
        method: ListMethod,
        filter: &FilterExpression,
        page: &Page,
    ) -> ScimClientResult<GroupList> {
        self.list(ScimOperation::ListGroups, GROUPS_PATH, method, filter, page)
            .await
    }

    // ── Internal HTTP Methods ─────────────────────────────────────────

    async fn list<T: DeserializeOwned>(
        &self,
        operation: ScimOperation,
        collection: &str,
        method: ListMethod,
        filter: &FilterExpression,
        page: &Page,
    ) -> ScimClientResult<T> {
        let wrap = |e| ScimClientError::wrap(operation, e);

        let request = ListRequest::build(method, filter, page).map_err(wrap)?;
        let mut url = format!("{}{}", self.base_url, request.path(collection));
        let http_method = request.method();
        let body = match request {
            ListRequest::Query(query) => {
                if !query.is_empty() {
                    url.push('?');
                    url.push_str(&query);
                }
                None
            }
            ListRequest::Search(body) => Some(body),
        };

        self.send(http_method, url, body).await.map_err(wrap)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<Vec<u8>>,
    ) -> Result<T, RequestError> {
        async move {
            debug!("SCIM {} {}", method, url);
            let has_body = method == Method::POST || method == Method::PUT || method == Method::PATCH;

            let mut builder = self
                .http_client
                .request(method, &url)
                .headers(self.headers.clone())
                .header(ACCEPT, SCIM_JSON);
            if has_body {
                builder = builder.header(CONTENT_TYPE, SCIM_JSON);
            }
            if let Some(body) = body {
                builder = builder.body(body);
            }

            let builder = self.auth.apply(builder).await?;
            let response = builder.send().await?;
            self.auth.observe_status(response.status()).await;

            decode_response(SCIM_API, response, StatusCode::OK).await
        }
        .instrument(self.span.clone())
        .await
    }
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_credentials() -> ScimCredentials {
        ScimCredentials::Basic {
            client_id: "test-client".into(),
            client_secret: "unreal".into(),
        }
    }

    #[test]
    fn test_new_accepts_unparseable_host() {
        let client = ScimClient::new(ScimClientConfig::new("badurl", basic_credentials())).unwrap();
        assert_eq!(client.base_url(), "badurl");
    }

    #[test]
    fn test_new_rejects_invalid_credentials() {
        let credentials = ScimCredentials::Basic {
            client_id: String::new(),
            client_secret: "unreal".into(),
        };
        let result = ScimClient::new(ScimClientConfig::new("https://idp.example.com", credentials));
        assert!(matches!(result, Err(ScimClientError::ClientIdRequired)));
    }

    #[test]
    fn test_new_rejects_invalid_root_ca() {
        let config = ScimClientConfig::new("https://idp.example.com", basic_credentials())
            .with_root_ca("not a certificate");
        assert!(matches!(
            ScimClient::new(config),
            Err(ScimClientError::HttpClient(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ScimClient::new(ScimClientConfig::new(
            "https://idp.example.com/scim/v2/",
            basic_credentials(),
        ))
        .unwrap();
        assert_eq!(client.base_url(), "https://idp.example.com/scim/v2");
    }

    #[test]
    fn test_scoped_overrides_host_and_headers() {
        let client =
            ScimClient::new(ScimClientConfig::new("https://idp.example.com", basic_credentials()))
                .unwrap();

        let scoped = client
            .scoped(&RequestTarget {
                host: Some("https://tenant.example.com/scim/".into()),
                headers: vec![("X-Tenant".into(), "acme".into())],
            })
            .unwrap();

        assert_eq!(scoped.base_url(), "https://tenant.example.com/scim");
        assert_eq!(scoped.headers.get("x-tenant").unwrap(), "acme");
        assert_eq!(client.base_url(), "https://idp.example.com");
        assert!(client.headers.is_empty());
    }

    #[test]
    fn test_scoped_rejects_invalid_header() {
        let client =
            ScimClient::new(ScimClientConfig::new("https://idp.example.com", basic_credentials()))
                .unwrap();

        let result = client.scoped(&RequestTarget {
            host: None,
            headers: vec![("bad header".into(), "value".into())],
        });
        assert!(matches!(
            result,
            Err(ScimClientError::InvalidHeader { name, .. }) if name == "bad header"
        ));
    }

    #[test]
    fn test_scoped_rejects_reserved_header() {
        let client =
            ScimClient::new(ScimClientConfig::new("https://idp.example.com", basic_credentials()))
                .unwrap();

        let result = client.scoped(&RequestTarget {
            host: None,
            headers: vec![("Authorization".into(), "Bearer other".into())],
        });
        assert!(matches!(
            result,
            Err(ScimClientError::InvalidHeader { name, .. }) if name == "Authorization"
        ));
    }
}
