use crate::config::BridgeConfig;
use crate::error::{ProxyError, Result};
use crate::logging::{LogLevel, SharedLogger};
use crate::translate::anthropic_types::{MessagesRequest, TranslatedResponse};
use crate::translate::request::anthropic_to_openai;
use crate::translate::response::openai_to_anthropic;

use bytes::Bytes;
use serde_json::Value;

/// Outcome of forwarding one request to the backend.
#[derive(Debug)]
pub enum ProxyResult {
    Success(TranslatedResponse),
    /// The backend answered with a non-2xx status; relayed as-is.
    BackendError { status: u16, body: BackendBody },
}

/// An error body from the backend, kept as JSON when it parses.
#[derive(Debug)]
pub enum BackendBody {
    Json(Value),
    Raw {
        content_type: Option<String>,
        bytes: Bytes,
    },
}

/// Translate a Messages request, send it to the backend's chat completions
/// endpoint, and translate the answer back.
pub async fn forward(
    req: &MessagesRequest,
    config: &BridgeConfig,
    client: &reqwest::Client,
    logger: &SharedLogger,
) -> Result<ProxyResult> {
    let url = config.completions_url()?;
    let api_key = config.resolve_api_key();
    let timeout_secs = config.backend.timeout_secs;

    let openai_req = anthropic_to_openai(req, &config.models);
    if openai_req.stream {
        logger.warn(
            "proxy",
            "Client asked for streaming; the backend reply is not translated as a stream",
        );
    }

    let payload = serde_json::to_vec(&openai_req)
        .map_err(|e| ProxyError::translation(format!("Failed to encode request: {e}")))?;

    logger.info(
        "proxy",
        format!(
            "POST {} model={} messages={} bytes={}",
            url,
            openai_req.model,
            openai_req.messages.len(),
            payload.len()
        ),
    );

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .body(payload)
        .send()
        .await
        .map_err(|e| ProxyError::from_transport(e, timeout_secs, "Request failed"))?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.bytes().await.map_err(|e| {
        ProxyError::from_transport(e, timeout_secs, "Failed to read response body")
    })?;

    logger.debug(
        "proxy",
        format!("Response status={} body_len={}", status.as_u16(), body.len()),
    );

    if !status.is_success() {
        logger.log_with_context(
            LogLevel::Warn,
            "proxy",
            format!("Backend returned status {}", status.as_u16()),
            serde_json::json!({ "body": truncate(&String::from_utf8_lossy(&body), 200) }),
        );
        let body = match serde_json::from_slice::<Value>(&body) {
            Ok(json) => BackendBody::Json(json),
            Err(_) => BackendBody::Raw {
                content_type,
                bytes: body,
            },
        };
        return Ok(ProxyResult::BackendError {
            status: status.as_u16(),
            body,
        });
    }

    if body.is_empty() {
        return Err(ProxyError::backend("Empty response from backend"));
    }

    let doc: Value = serde_json::from_slice(&body).map_err(|e| {
        ProxyError::backend(format!(
            "Invalid JSON response: {}. Body: {}",
            e,
            truncate(&String::from_utf8_lossy(&body), 300)
        ))
    })?;

    let translated = openai_to_anthropic(doc);

    match &translated {
        TranslatedResponse::Message(msg) => logger.info(
            "proxy",
            format!(
                "Completed: stop_reason={} blocks={} in={} out={} tokens",
                msg.stop_reason.as_deref().unwrap_or("null"),
                msg.content.len(),
                msg.usage.input_tokens,
                msg.usage.output_tokens
            ),
        ),
        TranslatedResponse::Passthrough(_) => {
            logger.warn("proxy", "Backend response has no choices, passing it through")
        }
    }

    Ok(ProxyResult::Success(translated))
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
