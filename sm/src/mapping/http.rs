//! HTTP mapping client
//!
//! Posts the request as JSON with the credential in the `api_key` header.
//! Single attempt, transport default timeout, no retries.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, error, info};

use super::error::UNKNOWN_ERROR;
use super::{MappingClient, MappingError, MappingRequest, MappingResult};
use crate::config::ApiSettings;

/// Header carrying the credential
pub const API_KEY_HEADER: &str = "api_key";

/// Mapping service client over HTTPS
pub struct HttpMappingClient {
    endpoint: String,
    api_key: String,
    http: Client,
}

impl HttpMappingClient {
    /// Create a client for the configured endpoint
    pub fn new(settings: &ApiSettings) -> Result<Self, MappingError> {
        debug!(endpoint = %settings.url, "HttpMappingClient::new: called");
        let http = Client::builder().build()?;

        Ok(Self {
            endpoint: settings.url.clone(),
            api_key: settings.key.clone(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MappingClient for HttpMappingClient {
    async fn submit(&self, request: &MappingRequest) -> Result<MappingResult, MappingError> {
        info!(
            source_columns = request.source_table.columns.len(),
            destination_columns = request.destination_table.columns.len(),
            "Sending JSON payload to API for mapping..."
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Error during API call: {}", e);
                MappingError::from(e)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            error!(status, error = %e, "Error reading API response: {}", e);
            MappingError::from(e)
        })?;
        debug!(status, body_len = body.len(), "submit: response received");

        let result = interpret_response(status, &body);
        match &result {
            Ok(mappings) => info!(entries = mappings.len(), "Mapping results received"),
            Err(MappingError::Remote { status, message }) => error!("API error: {} - {}", status, message),
            Err(e) => error!(status, "Error during API call: {}", e),
        }
        result
    }
}

/// Turn a status code and body into a mapping or an error
pub fn interpret_response(status: u16, body: &str) -> Result<MappingResult, MappingError> {
    debug!(status, "interpret_response: called");
    if status != 200 {
        return Err(MappingError::Remote {
            status,
            message: error_detail(body),
        });
    }

    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| MappingError::Transport(format!("malformed response body: {}", e)))?;

    let Value::Object(mut root) = parsed else {
        return Err(MappingError::Transport(
            "malformed response body: expected a JSON object".to_string(),
        ));
    };

    match root.remove("mappings") {
        None | Some(Value::Null) => {
            debug!("interpret_response: no mappings field, returning empty result");
            Ok(MappingResult::default())
        }
        Some(Value::Object(entries)) => Ok(MappingResult::new(entries)),
        Some(other) => Err(MappingError::Transport(format!(
            "malformed response body: `mappings` is not an object ({})",
            json_kind(&other)
        ))),
    }
}

/// Human-readable message of a failed response
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(root)) => match root.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(Value::Null) | None => UNKNOWN_ERROR.to_string(),
            Some(other) => other.to_string(),
        },
        _ => UNKNOWN_ERROR.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
