//! Managed entity definitions.
//!
//! Every entity family is a flat record with an opaque string `id` plus a few
//! nullable scalar fields. The service and HTTP layers are written once
//! against [`Entity`]; each family only supplies its struct, its merge-patch
//! payload and an [`EntityDescriptor`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt::Debug;

pub mod account;
pub mod cron_schedule;
pub mod registry;
pub mod traffic_record;

pub use account::{Account, AccountPatch};
pub use cron_schedule::{CronSchedule, CronSchedulePatch};
pub use registry::EntityRegistry;
pub use traffic_record::{TrafficRecord, TrafficRecordPatch};

/// Name of the identity field in API payloads.
pub const ID_FIELD: &str = "id";

/// One scalar field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name in API payloads (camelCase).
    pub name: &'static str,
    /// Field name inside the stored document.
    pub document_name: &'static str,
    /// Enforced at the HTTP boundary on create and full update.
    pub required: bool,
}

impl FieldSpec {
    pub const fn optional(name: &'static str, document_name: &'static str) -> Self {
        Self {
            name,
            document_name,
            required: false,
        }
    }

    pub const fn required(name: &'static str, document_name: &'static str) -> Self {
        Self {
            name,
            document_name,
            required: true,
        }
    }
}

/// Static description of an entity family.
#[derive(Debug, PartialEq, Eq)]
pub struct EntityDescriptor {
    /// Name used in alert headers and error payloads, e.g. `trafficData`.
    pub entity_name: &'static str,
    /// Document collection holding one document per instance.
    pub collection: &'static str,
    /// OpenAPI component name of the entity schema.
    pub schema_name: &'static str,
    /// Path segment under `/api`, e.g. `traffic-data`.
    pub api_path: &'static str,
    /// Non-identity fields.
    pub fields: &'static [FieldSpec],
}

impl EntityDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_document_name(&self, document_name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.document_name == document_name)
    }

    /// `/api/{api_path}`
    pub fn collection_url(&self) -> String {
        format!("/api/{}", self.api_path)
    }

    /// `/api/{api_path}/{id}`
    pub fn item_url(&self, id: &str) -> String {
        format!("/api/{}/{}", self.api_path, id)
    }

    /// Required fields that are missing or `null` in a raw payload.
    pub fn missing_required(&self, payload: &JsonValue) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| payload.get(f.name).map_or(true, JsonValue::is_null))
            .map(|f| f.name)
            .collect()
    }
}

/// Contract implemented by every managed entity family.
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Merge-patch payload: same fields, each one absent-or-value.
    type Patch: DeserializeOwned + Debug + Send + 'static;

    const DESCRIPTOR: &'static EntityDescriptor;

    fn id(&self) -> Option<&str>;

    fn patch_id(patch: &Self::Patch) -> Option<&str>;

    /// Overwrites every field the patch carries a value for. The identity
    /// field is never touched.
    fn merge(&mut self, patch: Self::Patch);
}

/// Identity equality: both ids present and equal, or the very same instance.
///
/// Two unsaved instances are never equal, even with identical field values.
pub fn same_identity<E: Entity>(a: &E, b: &E) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    matches!((a.id(), b.id()), (Some(x), Some(y)) if x == y)
}
