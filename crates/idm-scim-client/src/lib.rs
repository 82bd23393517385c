//! SCIM 2.0 lookup client.
//!
//! Builds SCIM filter expressions, turns them into `GET` or `POST .search`
//! list requests, and executes user and group lookups against a SCIM service
//! provider with basic, mutual-TLS or `OAuth2` authentication.

pub mod auth;
pub mod client;
pub mod decode;
pub mod error;
pub mod filter;
pub mod models;
pub mod request;

pub use auth::{ClientCertificate, ScimAuth, ScimCredentials};
pub use client::{RequestTarget, ScimClient, ScimClientConfig};
pub use error::{RequestError, ScimClientError, ScimClientResult, ScimOperation};
pub use filter::{FilterExpression, FilterOperator};
pub use models::{Group, GroupList, ListResponse, MultiValuedAttribute, User, UserList};
pub use request::{ListMethod, Page};
