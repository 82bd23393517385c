//! SCIM client error types.
//!
//! Every client operation wraps its failure in an operation-specific variant of
//! [`ScimClientError`] whose source is a [`RequestError`], so callers can match
//! on the failing operation and still inspect the underlying cause.

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Result alias for SCIM client operations.
pub type ScimClientResult<T> = Result<T, ScimClientError>;

/// The SCIM client operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScimOperation {
    GetUser,
    ListUsers,
    GetGroup,
    ListGroups,
}

impl ScimOperation {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ScimOperation::GetUser => "get_user",
            ScimOperation::ListUsers => "list_users",
            ScimOperation::GetGroup => "get_group",
            ScimOperation::ListGroups => "list_groups",
        }
    }
}

impl fmt::Display for ScimOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single SCIM HTTP exchange.
#[derive(Debug, Error)]
pub enum RequestError {
    /// A `.search` request was built without a filter.
    #[error("filter not provided")]
    NoFilter,

    /// The search request body could not be serialized.
    #[error("failed to marshal search request: {0}")]
    Marshal(#[source] serde_json::Error),

    /// Connection failure, timeout or other transport error.
    #[error("failed to make request: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a status other than the expected one.
    #[error("invalid response from {api}: unexpected status code {status}: {body}")]
    UnexpectedStatus {
        api: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The response body was not the expected JSON document.
    #[error("invalid response from {api}: {source}")]
    InvalidResponse {
        api: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Obtaining credentials for the request failed.
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl RequestError {
    /// HTTP status of an unexpected response, if that is what happened.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::UnexpectedStatus { status, .. } => Some(*status),
            RequestError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

/// Errors returned by [`crate::client::ScimClient`] and its construction.
#[derive(Debug, Error)]
pub enum ScimClientError {
    #[error("error getting SCIM user: {0}")]
    GetUser(#[source] RequestError),

    #[error("error listing SCIM users: {0}")]
    ListUsers(#[source] RequestError),

    #[error("error getting SCIM group: {0}")]
    GetGroup(#[source] RequestError),

    #[error("error listing SCIM groups: {0}")]
    ListGroups(#[source] RequestError),

    #[error("client ID is required")]
    ClientIdRequired,

    #[error("must provide client secret or TLS config")]
    AuthParamsMissing,

    #[error("must provide either a client secret or a client certificate, not both")]
    AmbiguousAuth,

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("failed to parse client certificate x509 pair: {0}")]
    ClientCertificate(String),

    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("failed to create the http client: {0}")]
    HttpClient(String),
}

impl ScimClientError {
    pub(crate) fn wrap(operation: ScimOperation, error: RequestError) -> Self {
        match operation {
            ScimOperation::GetUser => ScimClientError::GetUser(error),
            ScimOperation::ListUsers => ScimClientError::ListUsers(error),
            ScimOperation::GetGroup => ScimClientError::GetGroup(error),
            ScimOperation::ListGroups => ScimClientError::ListGroups(error),
        }
    }

    /// The operation that failed, for request failures.
    #[must_use]
    pub fn operation(&self) -> Option<ScimOperation> {
        match self {
            ScimClientError::GetUser(_) => Some(ScimOperation::GetUser),
            ScimClientError::ListUsers(_) => Some(ScimOperation::ListUsers),
            ScimClientError::GetGroup(_) => Some(ScimOperation::GetGroup),
            ScimClientError::ListGroups(_) => Some(ScimOperation::ListGroups),
            _ => None,
        }
    }

    /// The underlying request failure, for request failures.
    #[must_use]
    pub fn request_error(&self) -> Option<&RequestError> {
        match self {
            ScimClientError::GetUser(e)
            | ScimClientError::ListUsers(e)
            | ScimClientError::GetGroup(e)
            | ScimClientError::ListGroups(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the server reported the resource as missing (HTTP 404).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.request_error()
            .and_then(RequestError::status)
            .is_some_and(|status| status == StatusCode::NOT_FOUND)
    }
}
