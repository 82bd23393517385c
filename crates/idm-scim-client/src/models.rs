//! SCIM resource schemas read by the client (RFC 7643).
//!
//! Only the attributes the lookup operations need are modelled; unknown
//! attributes and extension schemas are ignored on decode.

use serde::{Deserialize, Serialize};

/// Multi-valued attribute entry, used for emails, group memberships and group members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiValuedAttribute {
    /// Whether this is the primary value.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary: bool,

    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// The value itself (an address, or the id of the referenced resource).
    #[serde(default)]
    pub value: String,
}

/// SCIM resource metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// SCIM User resource (RFC 7643 Section 4.1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned resource id.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    #[serde(default)]
    pub schemas: Vec<String>,

    #[serde(default)]
    pub user_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub emails: Vec<MultiValuedAttribute>,

    /// Groups the user belongs to (read-only on most servers).
    #[serde(default)]
    pub groups: Vec<MultiValuedAttribute>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl User {
    /// SCIM Core User schema URI.
    pub const SCHEMA: &'static str = "urn:ietf:params:scim:schemas:core:2.0:User";

    /// The primary email address.
    ///
    /// Falls back to the first listed address when none is flagged primary,
    /// and to the empty string when the user has no addresses.
    #[must_use]
    pub fn primary_email(&self) -> &str {
        self.emails
            .iter()
            .find(|email| email.primary)
            .or_else(|| self.emails.first())
            .map_or("", |email| email.value.as_str())
    }
}

/// SCIM Group resource (RFC 7643 Section 4.2).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Server-assigned resource id.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    #[serde(default)]
    pub schemas: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Members; each `value` is the id of a user resource.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MultiValuedAttribute>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Group {
    /// SCIM Core Group schema URI.
    pub const SCHEMA: &'static str = "urn:ietf:params:scim:schemas:core:2.0:Group";
}

/// SCIM List Response (RFC 7644 Section 3.4.2).
///
/// Pagination metadata is decoded when present but the client never derives
/// follow-up requests from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default)]
    pub schemas: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<i64>,

    /// Cursor for the next page, on servers with cursor pagination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,

    #[serde(rename = "Resources", default = "Vec::new")]
    pub resources: Vec<T>,
}

impl<T> ListResponse<T> {
    /// SCIM List Response schema URI.
    pub const SCHEMA: &'static str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";
}

/// List of users returned by `/Users`.
pub type UserList = ListResponse<User>;

/// List of groups returned by `/Groups`.
pub type GroupList = ListResponse<Group>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn email(value: &str, primary: bool) -> MultiValuedAttribute {
        MultiValuedAttribute {
            primary,
            display: None,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_primary_email_prefers_flagged_entry() {
        let user = User {
            emails: vec![email("home@example.com", false), email("work@example.com", true)],
            ..User::default()
        };
        assert_eq!(user.primary_email(), "work@example.com");
    }

    #[test]
    fn test_primary_email_falls_back_to_first() {
        let user = User {
            emails: vec![email("first@example.com", false), email("second@example.com", false)],
            ..User::default()
        };
        assert_eq!(user.primary_email(), "first@example.com");
    }

    #[test]
    fn test_primary_email_empty_without_emails() {
        assert_eq!(User::default().primary_email(), "");
    }

    #[test]
    fn test_decode_user_ignores_extensions() {
        let user: User = serde_json::from_value(json!({
            "id": "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee",
            "meta": {"created": "2020-04-10T11:29:36Z", "resourceType": "User", "groups.cnt": 0},
            "schemas": [User::SCHEMA],
            "userName": "cloudanalyst",
            "name": {"familyName": "Analyst", "givenName": "Cloud"},
            "displayName": "None",
            "userType": "employee",
            "active": true,
            "emails": [{"value": "cloud.analyst@example.com", "primary": true}],
            "groups": [{"value": "16e720aa", "display": "CloudAnalyst"}],
            "urn:ietf:params:scim:schemas:extension:comp:2.0:User": {"userId": "P000011"}
        }))
        .unwrap();

        assert_eq!(user.user_name, "cloudanalyst");
        assert_eq!(user.display_name.as_deref(), Some("None"));
        assert!(user.active);
        assert_eq!(user.groups[0].display.as_deref(), Some("CloudAnalyst"));
        assert_eq!(
            user.meta.unwrap().resource_type.as_deref(),
            Some("User")
        );
    }

    #[test]
    fn test_decode_list_without_pagination_metadata() {
        let list: GroupList = serde_json::from_value(json!({
            "Resources": [{"id": "g1", "displayName": "KeyAdmin", "members": [{"value": "u1", "type": "User"}]}]
        }))
        .unwrap();

        assert_eq!(list.total_results, None);
        assert_eq!(list.resources.len(), 1);
        assert_eq!(list.resources[0].members[0].value, "u1");
    }
}
