//! Host-facing request and response messages and the service traits the
//! plugin implements.

use crate::error::PluginResult;
use async_trait::async_trait;
use idm_scim_client::models;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-request key/value map supplied by the host.
pub type AuthContext = HashMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureRequest {
    pub yaml_configuration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureResponse {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetGroupRequest {
    pub group_name: String,
    #[serde(default)]
    pub auth_context: AuthContext,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetGroupResponse {
    pub group: Group,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAllGroupsRequest {
    #[serde(default)]
    pub auth_context: AuthContext,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAllGroupsResponse {
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUsersForGroupRequest {
    pub group_id: String,
    #[serde(default)]
    pub auth_context: AuthContext,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUsersForGroupResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetGroupsForUserRequest {
    pub user_id: String,
    #[serde(default)]
    pub auth_context: AuthContext,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetGroupsForUserResponse {
    pub groups: Vec<Group>,
}

/// A group as the host sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
}

impl From<&models::Group> for Group {
    fn from(group: &models::Group) -> Self {
        Self {
            id: group.id.clone(),
            name: group.display_name.clone().unwrap_or_default(),
        }
    }
}

/// A user as the host sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Display name, or the user name when the display name is absent.
    pub name: String,
    /// Primary email, or `""`.
    pub email: String,
}

impl From<&models::User> for User {
    fn from(user: &models::User) -> Self {
        let name = user
            .display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&user.user_name);
        Self {
            id: user.id.clone(),
            name: name.to_string(),
            email: user.primary_email().to_string(),
        }
    }
}

/// Accepts the host's YAML configuration.
#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn configure(&self, request: ConfigureRequest) -> PluginResult<ConfigureResponse>;
}

/// User and group resolution exposed to the host.
#[async_trait]
pub trait IdentityManagementService: Send + Sync {
    async fn get_group(&self, request: GetGroupRequest) -> PluginResult<GetGroupResponse>;

    async fn get_all_groups(&self, request: GetAllGroupsRequest)
        -> PluginResult<GetAllGroupsResponse>;

    async fn get_users_for_group(
        &self,
        request: GetUsersForGroupRequest,
    ) -> PluginResult<GetUsersForGroupResponse>;

    async fn get_groups_for_user(
        &self,
        request: GetGroupsForUserRequest,
    ) -> PluginResult<GetGroupsForUserResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use idm_scim_client::models::MultiValuedAttribute;

    #[test]
    fn test_user_projection() {
        let user = models::User {
            id: "u1".into(),
            user_name: "jdoe".into(),
            display_name: Some("Jane Doe".into()),
            emails: vec![
                MultiValuedAttribute {
                    value: "other@example.com".into(),
                    ..Default::default()
                },
                MultiValuedAttribute {
                    primary: true,
                    value: "jane@example.com".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        assert_eq!(
            User::from(&user),
            User {
                id: "u1".into(),
                name: "Jane Doe".into(),
                email: "jane@example.com".into(),
            }
        );
    }

    #[test]
    fn test_user_projection_falls_back_to_user_name() {
        let user = models::User {
            id: "u2".into(),
            user_name: "jdoe".into(),
            ..Default::default()
        };
        let projected = User::from(&user);
        assert_eq!(projected.name, "jdoe");
        assert_eq!(projected.email, "");
    }

    #[test]
    fn test_request_wire_names() {
        let request: GetUsersForGroupRequest = serde_json::from_value(serde_json::json!({
            "groupId": "g1",
            "authContext": {"tenantHost": "https://t.example.com"}
        }))
        .unwrap();
        assert_eq!(request.group_id, "g1");
        assert_eq!(request.auth_context["tenantHost"], "https://t.example.com");

        let request: GetGroupsForUserRequest =
            serde_json::from_value(serde_json::json!({"userId": "u1"})).unwrap();
        assert!(request.auth_context.is_empty());
    }
}
