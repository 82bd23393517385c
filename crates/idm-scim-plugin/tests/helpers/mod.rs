//! Shared fixtures for plugin integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Once;

pub const USER_ID: &str = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee";
pub const GROUP_ID: &str = "16e720aa-a009-4949-9bf9-aaaaaaaaaaaa";
pub const MEMBER_ID: &str = "11111111-bbbb-cccc-dddd-ffffffffffff";
pub const SECOND_MEMBER_ID: &str = "22222222-bbbb-cccc-dddd-ffffffffffff";

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// Basic-auth configuration for `host`, with extra YAML appended.
pub fn basic_yaml(host: &str, extra: &str) -> String {
    format!(
        r#"
host: {host}
auth:
  type: basic
  clientId: test-client
  clientSecret: unreal
{extra}
"#
    )
}

pub fn user_json(id: &str, user_name: &str, email: &str) -> Value {
    json!({
        "id": id,
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
        "userName": user_name,
        "name": {"familyName": "Analyst", "givenName": "Cloud"},
        "displayName": "None",
        "active": true,
        "emails": [
            {"value": "secondary@example.com"},
            {"value": email, "primary": true}
        ],
        "meta": {"resourceType": "User"}
    })
}

pub fn group_json(id: &str, name: &str, members: &[&str]) -> Value {
    let members: Vec<Value> = members
        .iter()
        .map(|member| json!({"value": member, "type": "User"}))
        .collect();
    json!({
        "id": id,
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
        "displayName": name,
        "members": members,
        "meta": {"resourceType": "Group"}
    })
}

pub fn list_json(resources: Vec<Value>) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
        "totalResults": resources.len(),
        "Resources": resources
    })
}
