use crate::domain::EntityRegistry;
use crate::storage::DocumentStore;
use crate::transport::http::alerts::Alerts;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub registry: Arc<EntityRegistry>,
    pub alerts: Alerts,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, registry: EntityRegistry, app_name: &str) -> Self {
        Self {
            store,
            registry: Arc::new(registry),
            alerts: Alerts::new(app_name),
        }
    }
}

/// Envelope used for health reports and error bodies.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query parameters accepted by collection reads.
#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
    /// `field` or `field,asc|desc`.
    #[serde(default)]
    pub sort: Option<String>,
}

pub const NDJSON: &str = "application/x-ndjson";
pub const STREAM_JSON: &str = "application/stream+json";
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";
