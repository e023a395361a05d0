use crate::domain::{Entity, EntityDescriptor};
use crate::transport::http::alerts::Alerts;
use crate::transport::http::error::ApiError;
use crate::transport::http::types::{NDJSON, STREAM_JSON};
use axum::extract::rejection::JsonRejection;
use axum::http::header::ACCEPT;
use axum::http::HeaderMap;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Unwraps a JSON body, turning extractor rejections into API errors.
pub fn read_json(
    alerts: &Alerts,
    descriptor: &'static EntityDescriptor,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<JsonValue, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(e)) => {
            Err(ApiError::UnsupportedMediaType(e.body_text()))
        }
        Err(e) => Err(alerts.bad_request(
            descriptor,
            format!("Invalid JSON body: {}", e.body_text()),
            "invalidbody",
        )),
    }
}

/// Decodes a full entity after checking its required fields.
pub fn decode_entity<E: Entity>(alerts: &Alerts, payload: JsonValue) -> Result<E, ApiError> {
    let descriptor = E::DESCRIPTOR;
    if !payload.is_object() {
        return Err(alerts.bad_request(descriptor, "Payload must be an object", "invalidbody"));
    }
    let missing = descriptor.missing_required(&payload);
    if !missing.is_empty() {
        return Err(alerts.bad_request(
            descriptor,
            format!("Missing required field(s): {}", missing.join(", ")),
            "validation",
        ));
    }
    decode(alerts, descriptor, payload)
}

/// Decodes a payload into any target type, reporting shape errors as 400.
pub fn decode<T: DeserializeOwned>(
    alerts: &Alerts,
    descriptor: &'static EntityDescriptor,
    payload: JsonValue,
) -> Result<T, ApiError> {
    serde_json::from_value(payload).map_err(|e| {
        alerts.bad_request(descriptor, format!("Invalid JSON body: {}", e), "invalidbody")
    })
}

/// Checks the payload id against the path id (`idnull` / `idinvalid`).
pub fn check_path_id(
    alerts: &Alerts,
    descriptor: &'static EntityDescriptor,
    path_id: &str,
    payload_id: Option<&str>,
) -> Result<(), ApiError> {
    match payload_id {
        None => Err(alerts.bad_request(descriptor, "Invalid id", "idnull")),
        Some(id) if id != path_id => Err(alerts.bad_request(descriptor, "Invalid ID", "idinvalid")),
        Some(_) => Ok(()),
    }
}

/// True when the client asked for line-delimited JSON.
pub fn wants_stream(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .any(|v| v == NDJSON || v == STREAM_JSON)
}
