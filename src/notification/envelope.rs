use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// The reasons an inbound request is rejected with `400 Invalid request`.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("missing `message` field")]
    MissingMessage,
    #[error("missing `message.data` field")]
    MissingData,
}

#[derive(Error, Debug, PartialEq)]
#[error("message data is not valid base64: {0}")]
pub struct DecodeError(String);

/// Body of a Pub/Sub push request.
#[derive(Debug, PartialEq, Clone)]
pub struct PushEnvelope {
    pub message: PubSubMessage,
    pub subscription: Option<String>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PubSubMessage {
    /// Base64 encoded payload.
    pub data: String,
    pub message_id: Option<String>,
    pub publish_time: Option<String>,
    pub attributes: HashMap<String, String>,
}

impl PushEnvelope {
    /// Parses the request body, requiring at least `{"message": {"data": "..."}}`.
    /// Every other field is informational: a missing or mistyped one is left empty.
    pub fn try_from_slice(body: &[u8]) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|err| ValidationError::InvalidJson(err.to_string()))?;

        let message = value
            .get("message")
            .and_then(Value::as_object)
            .ok_or(ValidationError::MissingMessage)?;
        let data = message
            .get("data")
            .and_then(Value::as_str)
            .ok_or(ValidationError::MissingData)?;

        Ok(Self {
            message: PubSubMessage {
                data: data.to_string(),
                message_id: string_field(message, "messageId"),
                publish_time: string_field(message, "publishTime"),
                attributes: message
                    .get("attributes")
                    .and_then(Value::as_object)
                    .map(|attributes| {
                        attributes
                            .iter()
                            .filter_map(|(key, value)| {
                                value.as_str().map(|value| (key.clone(), value.to_string()))
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            subscription: value
                .as_object()
                .and_then(|envelope| string_field(envelope, "subscription")),
        })
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

impl PubSubMessage {
    /// Decodes the payload as text. Invalid UTF-8 sequences are replaced.
    pub fn decode_data(&self) -> Result<String, DecodeError> {
        let data = self.data.trim();
        let bytes = STANDARD
            .decode(data)
            .or_else(|_| URL_SAFE.decode(data))
            .map_err(|err| DecodeError(err.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
