//! Notification headers attached to mutation responses.
//!
//! Success: `X-{app}-alert` carries a human readable message and
//! `X-{app}-params` the affected id. Failure: `X-{app}-error` carries
//! `error.{key}` and `X-{app}-params` the entity name.

use crate::domain::EntityDescriptor;
use crate::transport::http::error::ApiError;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Alerts {
    app_name: Arc<str>,
}

impl Alerts {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: Arc::from(app_name),
        }
    }

    pub fn alert_header(&self) -> String {
        format!("X-{}-alert", self.app_name)
    }

    pub fn params_header(&self) -> String {
        format!("X-{}-params", self.app_name)
    }

    pub fn error_header(&self) -> String {
        format!("X-{}-error", self.app_name)
    }

    pub fn created(&self, descriptor: &EntityDescriptor, id: &str) -> HeaderMap {
        self.success(
            format!("A new {} is created with identifier {}", descriptor.entity_name, id),
            id,
        )
    }

    pub fn updated(&self, descriptor: &EntityDescriptor, id: &str) -> HeaderMap {
        self.success(
            format!("A {} is updated with identifier {}", descriptor.entity_name, id),
            id,
        )
    }

    pub fn deleted(&self, descriptor: &EntityDescriptor, id: &str) -> HeaderMap {
        self.success(
            format!("A {} is deleted with identifier {}", descriptor.entity_name, id),
            id,
        )
    }

    pub fn failure(&self, descriptor: &EntityDescriptor, error_key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        insert(&mut headers, &self.error_header(), &format!("error.{}", error_key));
        insert(&mut headers, &self.params_header(), descriptor.entity_name);
        headers
    }

    /// A client-fixable failure carrying the failure alert headers.
    pub fn bad_request(
        &self,
        descriptor: &'static EntityDescriptor,
        message: impl Into<String>,
        error_key: &'static str,
    ) -> ApiError {
        ApiError::BadRequest {
            message: message.into(),
            entity_name: descriptor.entity_name,
            error_key,
            headers: self.failure(descriptor, error_key),
        }
    }

    fn success(&self, message: String, id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        insert(&mut headers, &self.alert_header(), &message);
        insert(&mut headers, &self.params_header(), id);
        headers
    }
}

// Ids come from request paths and may hold bytes a header cannot carry;
// those headers are dropped rather than failing the request.
fn insert(headers: &mut HeaderMap, name: &str, value: &str) {
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => tracing::debug!(header = name, "skipping alert header with unencodable value"),
    }
}
