//! Response decoding shared by every client operation.

use crate::error::RequestError;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Name of the remote API used in decode error messages.
pub const SCIM_API: &str = "SCIM";

/// Decode a JSON response body, requiring `expected` as the status.
///
/// Any other status becomes [`RequestError::UnexpectedStatus`] carrying the
/// response body. If that body cannot be read the failure is logged and a
/// placeholder is used instead.
pub async fn decode_response<T: DeserializeOwned>(
    api: &'static str,
    response: Response,
    expected: StatusCode,
) -> Result<T, RequestError> {
    let status = response.status();

    if status != expected {
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(api, %status, error = %e, "Failed to read error response body");
                "<no body>".to_string()
            }
        };
        return Err(RequestError::UnexpectedStatus { api, status, body });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| RequestError::InvalidResponse { api, source })
}
