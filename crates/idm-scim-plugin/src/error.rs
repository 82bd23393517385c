//! Plugin error types.

use crate::config::ConfigError;
use idm_scim_client::error::ScimClientError;
use std::fmt;
use thiserror::Error;

/// Result alias for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// The host-facing resolution operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginOperation {
    GetGroup,
    GetAllGroups,
    GetUsersForGroup,
    GetGroupsForUser,
}

impl fmt::Display for PluginOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PluginOperation::GetGroup => "failed to get group",
            PluginOperation::GetAllGroups => "failed to get all groups",
            PluginOperation::GetUsersForGroup => "failed to get users for group",
            PluginOperation::GetGroupsForUser => "failed to get groups for user",
        })
    }
}

/// Errors returned by the plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    /// An operation ran before a successful `configure`.
    #[error("no scim client exists")]
    NoScimClient,

    #[error("failed to configure plugin: {0}")]
    Configure(#[from] ConfigError),

    /// A blank group name, group id or user id.
    #[error("no filter id provided")]
    NoId,

    #[error("group '{0}' does not exist")]
    GroupNotFound(String),

    #[error("multiple groups match '{0}'")]
    MultipleGroups(String),

    #[error("auth context has no value for '{0}'")]
    MissingAuthContextField(String),

    /// The SCIM service provider could not be queried.
    #[error("{operation}: {source}")]
    Scim {
        operation: PluginOperation,
        #[source]
        source: ScimClientError,
    },
}

impl PluginError {
    pub(crate) fn scim(operation: PluginOperation) -> impl FnOnce(ScimClientError) -> Self {
        move |source| PluginError::Scim { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idm_scim_client::error::RequestError;
    use std::error::Error as _;

    #[test]
    fn test_scim_error_message_names_operation() {
        let error = PluginError::scim(PluginOperation::GetUsersForGroup)(ScimClientError::GetGroup(
            RequestError::NoFilter,
        ));

        assert_eq!(
            error.to_string(),
            "failed to get users for group: error getting SCIM group: filter not provided"
        );
        let source = error.source().unwrap();
        assert!(source.downcast_ref::<ScimClientError>().is_some());
    }

    #[test]
    fn test_messages() {
        assert_eq!(PluginError::NoScimClient.to_string(), "no scim client exists");
        assert_eq!(PluginError::NoId.to_string(), "no filter id provided");
    }
}
