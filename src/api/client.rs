//! The single outbound request: build a client from the resolved
//! session, POST the chat completion, and pull out the reply text.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::config::Session;
use crate::core::error::SayError;
use crate::utils::url::endpoint_url;

/// Build the HTTP client for one invocation, with the session's static
/// gateway headers installed as defaults.
///
/// When `session.insecure` is set, certificate verification is turned
/// off; the connection then has no transport trust guarantees.
pub fn build_http_client(session: &Session) -> Result<reqwest::Client, SayError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &session.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SayError::configuration(format!("invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| SayError::configuration(format!("invalid value for header '{name}': {e}")))?;
        headers.insert(header_name, header_value);
    }

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if session.insecure {
        builder = builder.danger_accept_invalid_certs(true);
    }
    Ok(builder.build()?)
}

/// POST one chat-completion request and parse the typed response.
///
/// There is deliberately no retry and no timeout override; the call
/// blocks until the transport default gives up or the endpoint answers.
pub async fn send_chat_completion(
    client: &reqwest::Client,
    session: &Session,
    request: &ChatRequest,
) -> Result<ChatResponse, SayError> {
    let url = endpoint_url(&session.base_url, "chat/completions");
    debug!(model = %request.model, %url, "sending chat completion");

    let response = client
        .post(&url)
        .header(AUTHORIZATION, format!("Bearer {}", session.api_key))
        .header(CONTENT_TYPE, "application/json")
        .json(request)
        .send()
        .await?;

    let status = response.status();
    debug!(status = status.as_u16(), "received response");
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(SayError::UpstreamStatus {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<ChatResponse>().await?)
}

/// The whole request path for one invocation: client construction, the
/// single POST, and extraction of `choices[0].message.content`.
pub async fn complete(
    session: &Session,
    messages: Vec<ChatMessage>,
) -> Result<String, SayError> {
    let client = build_http_client(session)?;
    let request = ChatRequest {
        model: session.model.clone(),
        messages,
    };
    let response = send_chat_completion(&client, session, &request).await?;
    response.into_content()
}
