//! The SCIM identity-management plugin.
//!
//! A [`ScimPlugin`] starts unconfigured. A successful
//! [`configure`](ConfigService::configure) swaps in a serving state holding the
//! SCIM client, the resolution parameters and the membership strategy; a
//! failed one leaves whatever state was there before.

use crate::config::{AuthContextConfig, PluginConfig, ResolutionParams};
use crate::error::{PluginError, PluginOperation, PluginResult};
use crate::messages::{
    AuthContext, ConfigService, ConfigureRequest, ConfigureResponse, GetAllGroupsRequest,
    GetAllGroupsResponse, GetGroupRequest, GetGroupResponse, GetGroupsForUserRequest,
    GetGroupsForUserResponse, GetUsersForGroupRequest, GetUsersForGroupResponse, Group,
    IdentityManagementService, User,
};
use crate::strategy::{resolver_for, MembershipResolver};
use async_trait::async_trait;
use idm_scim_client::client::{RequestTarget, ScimClient};
use idm_scim_client::filter::FilterExpression;
use idm_scim_client::request::Page;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, Span};

/// Everything a configured plugin needs to answer requests.
#[derive(Debug)]
struct Serving {
    client: ScimClient,
    params: ResolutionParams,
    auth_context: Option<AuthContextConfig>,
    resolver: Arc<dyn MembershipResolver>,
}

impl Serving {
    /// The client for one request, retargeted by the caller's auth context
    /// when the configuration asks for it.
    fn client_for(
        &self,
        operation: PluginOperation,
        context: &AuthContext,
    ) -> PluginResult<ScimClient> {
        let Some(config) = &self.auth_context else {
            return Ok(self.client.clone());
        };

        let lookup = |key: &str| {
            context
                .get(key)
                .cloned()
                .ok_or_else(|| PluginError::MissingAuthContextField(key.to_string()))
        };

        let host = if config.host_field.is_empty() {
            None
        } else {
            Some(format!("{}{}", lookup(&config.host_field)?, config.base_path))
        };
        let headers = config
            .header_fields
            .iter()
            .map(|(header, key)| -> PluginResult<(String, String)> {
                Ok((header.clone(), lookup(key)?))
            })
            .collect::<PluginResult<Vec<_>>>()?;

        self.client
            .scoped(&RequestTarget { host, headers })
            .map_err(PluginError::scim(operation))
    }
}

/// Identity-management plugin backed by a SCIM service provider.
#[derive(Debug)]
pub struct ScimPlugin {
    state: RwLock<Option<Arc<Serving>>>,
    span: Span,
}

impl Default for ScimPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ScimPlugin {
    /// An unconfigured plugin.
    #[must_use]
    pub fn new() -> Self {
        Self::with_span(Span::none())
    }

    /// An unconfigured plugin whose logging, including the SCIM client it
    /// builds, is recorded under `span`.
    #[must_use]
    pub fn with_span(span: Span) -> Self {
        Self {
            state: RwLock::new(None),
            span,
        }
    }

    /// Whether a configuration has been applied.
    pub async fn is_configured(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Parse, resolve and apply a YAML configuration.
    pub async fn apply_yaml(&self, yaml: &str) -> PluginResult<()> {
        let serving = {
            let _entered = self.span.enter();
            info!("Configuring plugin");

            let config = PluginConfig::from_yaml(yaml)?;
            let client = config.build_client(self.span.clone())?;
            let params = config.params.resolve()?;
            let resolver = resolver_for(&params);

            info!(
                host = client.base_url(),
                list_method = %params.list_method,
                strategy = resolver.name(),
                "Plugin configured"
            );

            Serving {
                client,
                params,
                auth_context: config.auth_context,
                resolver,
            }
        };

        *self.state.write().await = Some(Arc::new(serving));
        Ok(())
    }

    async fn serving(&self) -> PluginResult<Arc<Serving>> {
        self.state
            .read()
            .await
            .clone()
            .ok_or(PluginError::NoScimClient)
    }
}

#[async_trait]
impl ConfigService for ScimPlugin {
    async fn configure(&self, request: ConfigureRequest) -> PluginResult<ConfigureResponse> {
        self.apply_yaml(&request.yaml_configuration).await?;
        Ok(ConfigureResponse {})
    }
}

#[async_trait]
impl IdentityManagementService for ScimPlugin {
    async fn get_group(&self, request: GetGroupRequest) -> PluginResult<GetGroupResponse> {
        const OPERATION: PluginOperation = PluginOperation::GetGroup;
        let serving = self.serving().await?;
        let name = non_blank(&request.group_name)?;
        let client = serving.client_for(OPERATION, &request.auth_context)?;

        let filter = FilterExpression::eq(&serving.params.group_attribute, name);
        let groups = client
            .list_groups(serving.params.list_method, &filter, &Page::unbounded())
            .await
            .map_err(PluginError::scim(OPERATION))?;

        match groups.resources.as_slice() {
            [group] => Ok(GetGroupResponse {
                group: Group::from(group),
            }),
            [] => Err(PluginError::GroupNotFound(name.to_string())),
            _ => Err(PluginError::MultipleGroups(name.to_string())),
        }
    }

    async fn get_all_groups(
        &self,
        request: GetAllGroupsRequest,
    ) -> PluginResult<GetAllGroupsResponse> {
        const OPERATION: PluginOperation = PluginOperation::GetAllGroups;
        let serving = self.serving().await?;
        let client = serving.client_for(OPERATION, &request.auth_context)?;

        let groups = client
            .list_groups(
                serving.params.list_method,
                &FilterExpression::all_resources(),
                &Page::unbounded(),
            )
            .await
            .map_err(PluginError::scim(OPERATION))?;

        Ok(GetAllGroupsResponse {
            groups: groups.resources.iter().map(Group::from).collect(),
        })
    }

    async fn get_users_for_group(
        &self,
        request: GetUsersForGroupRequest,
    ) -> PluginResult<GetUsersForGroupResponse> {
        const OPERATION: PluginOperation = PluginOperation::GetUsersForGroup;
        let serving = self.serving().await?;
        let group_id = non_blank(&request.group_id)?;
        let client = serving.client_for(OPERATION, &request.auth_context)?;

        debug!(
            parent: &self.span,
            group_id,
            strategy = serving.resolver.name(),
            "Resolving users for group"
        );
        let users = serving
            .resolver
            .users_for_group(&client, group_id)
            .await
            .map_err(PluginError::scim(OPERATION))?;

        Ok(GetUsersForGroupResponse {
            users: users.iter().map(User::from).collect(),
        })
    }

    async fn get_groups_for_user(
        &self,
        request: GetGroupsForUserRequest,
    ) -> PluginResult<GetGroupsForUserResponse> {
        const OPERATION: PluginOperation = PluginOperation::GetGroupsForUser;
        let serving = self.serving().await?;
        let user_id = non_blank(&request.user_id)?;
        let client = serving.client_for(OPERATION, &request.auth_context)?;

        let filter = FilterExpression::eq(&serving.params.user_attribute, user_id);
        let groups = client
            .list_groups(serving.params.list_method, &filter, &Page::unbounded())
            .await
            .map_err(PluginError::scim(OPERATION))?;

        Ok(GetGroupsForUserResponse {
            groups: groups.resources.iter().map(Group::from).collect(),
        })
    }
}

fn non_blank(value: &str) -> PluginResult<&str> {
    if value.trim().is_empty() {
        Err(PluginError::NoId)
    } else {
        Ok(value)
    }
}
