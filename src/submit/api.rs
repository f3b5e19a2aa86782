use crate::state::error_map::{DETAIL_KEY, ErrorMap, GLOBAL_KEY};
use crate::submit::payload::ReverseMapping;
use async_trait::async_trait;
use serde_json::Value as Json;
use thiserror::Error;

pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong while saving. Please try again in a moment.";

const NON_FIELD_KEYS: &[&str] = &[GLOBAL_KEY, DETAIL_KEY, "non_field_errors", "__all__"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The backend answered with an error status.
    #[error("request rejected with status {status}")]
    Rejected { status: u16, body: Json },
    /// No usable answer: connection, timeout, malformed response.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// The persistence collaborator a wizard submits its payload to.
#[async_trait]
pub trait SubmissionApi: Send + Sync {
    async fn submit(&self, payload: Json) -> Result<Json, ApiError>;
}

/// Turns an API failure into error feedback. Structured bodies become field
/// errors; anything else becomes a generic `global` message.
pub fn errors_from_failure(error: &ApiError, reverse: &ReverseMapping) -> ErrorMap {
    match error {
        ApiError::Rejected { body, .. } => structured_errors(body, reverse)
            .unwrap_or_else(|| ErrorMap::global(GENERIC_FAILURE_MESSAGE)),
        ApiError::Transport(_) => ErrorMap::global(GENERIC_FAILURE_MESSAGE),
    }
}

/// Reads `{"errors": {...}, "detail": "..."}` or a flat `{field: [messages]}` body.
pub fn structured_errors(body: &Json, reverse: &ReverseMapping) -> Option<ErrorMap> {
    let root = body.as_object()?;
    let fields = root
        .get("errors")
        .and_then(Json::as_object)
        .unwrap_or(root);

    let mut errors = ErrorMap::new();
    for (key, raw) in fields {
        collect(key.clone(), raw, reverse, &mut errors);
    }
    if !std::ptr::eq(fields, root) {
        for key in NON_FIELD_KEYS {
            if let Some(message) = root.get(*key).and_then(first_message) {
                errors.insert_first(GLOBAL_KEY, message);
            }
        }
    }
    errors.into_option()
}

fn collect(key: String, raw: &Json, reverse: &ReverseMapping, errors: &mut ErrorMap) {
    if NON_FIELD_KEYS.contains(&key.as_str()) {
        if let Some(message) = first_message(raw) {
            errors.insert_first(GLOBAL_KEY, message);
        }
        return;
    }
    if let Json::Object(children) = raw {
        for (child, value) in children {
            collect(format!("{key}_{child}"), value, reverse, errors);
        }
        return;
    }
    if let Some(message) = first_message(raw) {
        errors.insert_first(reverse.field_for(&key), message);
    }
}

fn first_message(raw: &Json) -> Option<String> {
    match raw {
        Json::String(message) => Some(message.clone()),
        Json::Array(items) => items.iter().find_map(first_message),
        Json::Object(map) => map.values().find_map(first_message),
        _ => None,
    }
}
