//! List request construction.
//!
//! A list call is either a `GET` with `count`, `cursor` and `filter` query
//! parameters, or a `POST` of a [`SearchRequest`] to the `.search` sub-path.

use crate::error::RequestError;
use crate::filter::FilterExpression;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Schema URN of a SCIM search request body.
pub const SEARCH_REQUEST_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:SearchRequest";

/// Path segment appended to a resource collection for `POST` searches.
pub const SEARCH_PATH: &str = ".search";

/// HTTP method used for list calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListMethod {
    /// `GET {collection}/?filter=...`
    #[default]
    Get,
    /// `POST {collection}/.search` with a JSON body.
    Post,
}

impl ListMethod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ListMethod::Get => "GET",
            ListMethod::Post => "POST",
        }
    }

    /// `Post` when `use_post` is set, `Get` otherwise.
    #[must_use]
    pub fn from_post_flag(use_post: bool) -> Self {
        if use_post {
            ListMethod::Post
        } else {
            ListMethod::Get
        }
    }
}

impl fmt::Display for ListMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(ListMethod::Get),
            "POST" => Ok(ListMethod::Post),
            other => Err(format!("unsupported list method '{other}'")),
        }
    }
}

/// Caller-supplied pagination parameters, passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub cursor: Option<String>,
    pub count: Option<u32>,
}

impl Page {
    /// No pagination parameters.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }
}

/// Body of a `POST .search` request (RFC 7644 Section 3.4.3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub schemas: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// A fully built list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRequest {
    /// Encoded query string for a `GET` (may be empty).
    Query(String),
    /// Serialized [`SearchRequest`] for a `POST .search`.
    Search(Vec<u8>),
}

impl ListRequest {
    /// Build the request for `method`.
    pub fn build(
        method: ListMethod,
        filter: &FilterExpression,
        page: &Page,
    ) -> Result<Self, RequestError> {
        match method {
            ListMethod::Get => Ok(ListRequest::Query(build_query_string(filter, page))),
            ListMethod::Post => build_search_body(filter, page).map(ListRequest::Search),
        }
    }

    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            ListRequest::Query(_) => Method::GET,
            ListRequest::Search(_) => Method::POST,
        }
    }

    /// Path of the request relative to the resource collection (`/Users`, `/Groups`).
    #[must_use]
    pub fn path(&self, collection: &str) -> String {
        match self {
            ListRequest::Query(_) => format!("{collection}/"),
            ListRequest::Search(_) => format!("{collection}/{SEARCH_PATH}"),
        }
    }
}

/// Encode `count`, `cursor` and `filter` as a query string.
///
/// Absent parameters are omitted, and so is a null filter.
#[must_use]
pub fn build_query_string(filter: &FilterExpression, page: &Page) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(count) = page.count {
        query.append_pair("count", &count.to_string());
    }
    if let Some(cursor) = &page.cursor {
        query.append_pair("cursor", cursor);
    }
    if !filter.is_null() {
        query.append_pair("filter", &filter.to_string());
    }
    query.finish()
}

/// Serialize a [`SearchRequest`]. A search needs a filter, so a null filter is rejected.
pub fn build_search_body(filter: &FilterExpression, page: &Page) -> Result<Vec<u8>, RequestError> {
    if filter.is_null() {
        return Err(RequestError::NoFilter);
    }

    let search = SearchRequest {
        schemas: vec![SEARCH_REQUEST_SCHEMA.to_string()],
        filter: Some(filter.to_string()),
        count: page.count,
        cursor: page.cursor.clone(),
    };

    serde_json::to_vec(&search).map_err(RequestError::Marshal)
}
