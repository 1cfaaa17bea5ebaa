//! Helpers shared by the HTTP provider adapters.

use cofounder_application::ports::llm_gateway::GatewayError;
use reqwest::StatusCode;

/// Map a transport failure onto the gateway taxonomy
pub(crate) fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

/// Map a non-success HTTP status onto the gateway taxonomy
pub(crate) fn status_error(status: StatusCode, body: &str) -> GatewayError {
    let detail = format!("{}: {}", status, truncate(body, 200));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized(detail),
        StatusCode::NOT_FOUND => GatewayError::ModelNotAvailable(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        _ => GatewayError::RequestFailed(detail),
    }
}

/// Send a JSON request and return the JSON body of a successful reply
pub(crate) async fn post_json(
    request: reqwest::RequestBuilder,
    body: &serde_json::Value,
) -> Result<serde_json::Value, GatewayError> {
    let response = request.json(body).send().await.map_err(transport_error)?;
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(status_error(status, &text));
    }
    response
        .json()
        .await
        .map_err(|e| GatewayError::Other(format!("invalid provider response: {e}")))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}...")
    }
}
