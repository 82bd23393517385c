//! Mock SCIM service provider built on wiremock.
//!
//! Serves canned user and group fixtures on the lookup endpoints and hands
//! out clients already pointed at the mock.

#![allow(dead_code)]

use idm_scim_client::auth::{ScimAuth, ScimCredentials};
use idm_scim_client::client::ScimClient;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "unreal";

pub const USER_ID: &str = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee";
pub const GROUP_ID: &str = "16e720aa-a009-4949-9bf9-aaaaaaaaaaaa";
pub const MEMBER_ID: &str = "11111111-bbbb-cccc-dddd-ffffffffffff";

/// A user resource as a typical service provider returns it.
pub fn user_json() -> Value {
    json!({
        "id": USER_ID,
        "meta": {
            "created": "2020-04-10T11:29:36Z",
            "lastModified": "2021-10-20T20:52:19Z",
            "resourceType": "User",
            "location": format!("/Users/{USER_ID}")
        },
        "schemas": [
            "urn:ietf:params:scim:schemas:core:2.0:User",
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"
        ],
        "userName": "cloudanalyst",
        "name": {"familyName": "Analyst", "givenName": "Cloud"},
        "displayName": "None",
        "userType": "employee",
        "active": true,
        "emails": [{"value": "cloud.analyst@example.com", "primary": true}],
        "groups": [{"value": GROUP_ID, "display": "KeyAdmin"}]
    })
}

/// A group resource with a single member.
pub fn group_json() -> Value {
    json!({
        "id": GROUP_ID,
        "meta": {
            "created": "2020-04-10T11:29:36Z",
            "lastModified": "2021-10-20T20:52:19Z",
            "resourceType": "Group",
            "location": format!("/Groups/{GROUP_ID}")
        },
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
        "displayName": "KeyAdmin",
        "members": [{"value": MEMBER_ID, "type": "User"}]
    })
}

/// Wrap resources in a list response.
pub fn list_json(resources: Vec<Value>) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
        "totalResults": resources.len(),
        "itemsPerPage": resources.len(),
        "startIndex": 1,
        "Resources": resources
    })
}

/// A SCIM error document.
pub fn error_json(status: u16, detail: &str) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:Error"],
        "detail": detail,
        "status": status.to_string()
    })
}

/// Wiremock server standing in for a SCIM service provider.
pub struct MockScimServer {
    server: MockServer,
}

impl MockScimServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Client using basic auth with the fixture credentials.
    pub fn client(&self) -> ScimClient {
        basic_client(&self.uri())
    }

    pub async fn mock_get_user(&self, id: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/Users/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_get_group(&self, id: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/Groups/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_list_users(&self, resources: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/Users/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(resources)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_list_groups(&self, resources: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/Groups/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(resources)))
            .mount(&self.server)
            .await;
    }

    /// Every request to `route` answers with `status` and a SCIM error body.
    pub async fn mock_error(&self, route: &str, status: u16, detail: &str) {
        Mock::given(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(error_json(status, detail)))
            .mount(&self.server)
            .await;
    }
}

/// Basic-auth client for `base_url`.
pub fn basic_client(base_url: &str) -> ScimClient {
    let auth = ScimAuth::new(
        ScimCredentials::Basic {
            client_id: CLIENT_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
        },
        reqwest::Client::new(),
    );
    ScimClient::with_http_client(base_url.to_string(), auth, reqwest::Client::new())
}
