use super::{same_identity, Entity, EntityDescriptor, FieldSpec};
use crate::domain::patch::Patch;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Daily traffic metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRecord {
    pub id: Option<String>,
    pub rank: Option<String>,
    pub impressions: Option<i32>,
    /// Required.
    pub clicks: Option<i32>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRecordPatch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rank: Patch<String>,
    #[serde(default)]
    pub impressions: Patch<i32>,
    #[serde(default)]
    pub clicks: Patch<i32>,
    #[serde(default)]
    pub date: Patch<NaiveDate>,
}

const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    entity_name: "trafficData",
    collection: "traffic_data",
    schema_name: "TrafficRecord",
    api_path: "traffic-data",
    fields: &[
        FieldSpec::optional("rank", "rank"),
        FieldSpec::optional("impressions", "impressions"),
        FieldSpec::required("clicks", "clicks"),
        FieldSpec::optional("date", "date"),
    ],
};

impl Entity for TrafficRecord {
    type Patch = TrafficRecordPatch;

    const DESCRIPTOR: &'static EntityDescriptor = &DESCRIPTOR;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn patch_id(patch: &Self::Patch) -> Option<&str> {
        patch.id.as_deref()
    }

    fn merge(&mut self, patch: Self::Patch) {
        patch.rank.apply_to(&mut self.rank);
        patch.impressions.apply_to(&mut self.impressions);
        patch.clicks.apply_to(&mut self.clicks);
        patch.date.apply_to(&mut self.date);
    }
}

impl PartialEq for TrafficRecord {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self, other)
    }
}
