use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap},
};
use serde_json::{Map, Value};

use super::error::{ApiError, ValidationError};

/// A request body type that can be built from a checked JSON object.
pub trait Validated: Sized {
    /// Fields that must be present and truthy, in reporting order.
    const REQUIRED: &'static [&'static str];

    /// Called only after every field in `REQUIRED` passed `validate`.
    fn from_fields(fields: &Map<String, Value>) -> Self;
}

/// Extractor that rejects non-JSON requests and bodies missing required
/// fields before the handler runs.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Validated,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(req.headers()) {
            return Err(ApiError::NotJson);
        }
        let bytes = Bytes::from_request(req, state).await.unwrap_or_default();
        let body = parse_lenient(&bytes);
        let fields = validate(&body, T::REQUIRED)?;
        Ok(ValidatedJson(T::from_fields(&fields)))
    }
}

/// `application/json` or any `application/*+json` type.
pub fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Anything that is not a JSON object becomes an empty object.
pub fn parse_lenient(bytes: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice(bytes) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Checks every required field and reports all the missing ones at once.
pub fn validate(
    body: &Map<String, Value>,
    required: &[&str],
) -> Result<Map<String, Value>, ValidationError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|field| body.get(**field).map_or(true, is_falsy))
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError { missing });
    }
    Ok(body.clone())
}

/// String form of a JSON value: strings as-is, everything else as JSON text,
/// so booleans come out lowercase (`true`, not `True`).
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Field as a string; empty when absent.
pub fn field_string(fields: &Map<String, Value>, name: &str) -> String {
    fields.get(name).map(scalar_to_string).unwrap_or_default()
}
