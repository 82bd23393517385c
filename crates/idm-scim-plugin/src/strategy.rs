//! Strategies for resolving the members of a group.
//!
//! Servers that expose a queryable membership attribute on users answer with
//! a single search ([`DirectSearch`]). Others only list members on the group
//! itself, so each member has to be fetched in turn ([`MembershipTraversal`]).

use crate::config::ResolutionParams;
use async_trait::async_trait;
use idm_scim_client::client::ScimClient;
use idm_scim_client::error::ScimClientResult;
use idm_scim_client::filter::FilterExpression;
use idm_scim_client::models::User;
use idm_scim_client::request::{ListMethod, Page};
use std::sync::Arc;
use tracing::debug;

/// Resolves the users that belong to a group.
#[async_trait]
pub trait MembershipResolver: Send + Sync + std::fmt::Debug {
    /// Strategy name, for logging.
    fn name(&self) -> &'static str;

    /// Users in `group_id`, in the order the server reports them.
    async fn users_for_group(
        &self,
        client: &ScimClient,
        group_id: &str,
    ) -> ScimClientResult<Vec<User>>;
}

/// One user search on a membership attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectSearch {
    pub attribute: String,
    pub method: ListMethod,
}

#[async_trait]
impl MembershipResolver for DirectSearch {
    fn name(&self) -> &'static str {
        "direct_search"
    }

    async fn users_for_group(
        &self,
        client: &ScimClient,
        group_id: &str,
    ) -> ScimClientResult<Vec<User>> {
        let filter = FilterExpression::eq(&self.attribute, group_id);
        let users = client
            .list_users(self.method, &filter, &Page::unbounded())
            .await?;
        Ok(users.resources)
    }
}

/// Fetch the group, then each member by id.
///
/// Lookups run one after another and the first failure aborts the whole
/// resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipTraversal;

#[async_trait]
impl MembershipResolver for MembershipTraversal {
    fn name(&self) -> &'static str {
        "membership_traversal"
    }

    async fn users_for_group(
        &self,
        client: &ScimClient,
        group_id: &str,
    ) -> ScimClientResult<Vec<User>> {
        let group = client.get_group(group_id).await?;
        debug!(group_id, members = group.members.len(), "Resolving group members");

        let mut users = Vec::with_capacity(group.members.len());
        for member in &group.members {
            users.push(client.get_user(&member.value).await?);
        }
        Ok(users)
    }
}

/// The strategy selected by `params`.
#[must_use]
pub fn resolver_for(params: &ResolutionParams) -> Arc<dyn MembershipResolver> {
    if params.allow_search_users_by_group {
        Arc::new(DirectSearch {
            attribute: params.group_members_attribute.clone(),
            method: params.list_method,
        })
    } else {
        Arc::new(MembershipTraversal)
    }
}
