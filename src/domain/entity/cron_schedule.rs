use super::{same_identity, Entity, EntityDescriptor, FieldSpec};
use crate::domain::patch::Patch;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named cron schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CronSchedule {
    pub id: Option<String>,
    /// Required.
    pub name: Option<String>,
    pub cron_expression: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronSchedulePatch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub cron_expression: Patch<String>,
}

const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    entity_name: "cronScheduler",
    collection: "cron_scheduler",
    schema_name: "CronSchedule",
    api_path: "cron-schedulers",
    fields: &[
        FieldSpec::required("name", "name"),
        FieldSpec::optional("cronExpression", "cron_expression"),
    ],
};

impl Entity for CronSchedule {
    type Patch = CronSchedulePatch;

    const DESCRIPTOR: &'static EntityDescriptor = &DESCRIPTOR;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn patch_id(patch: &Self::Patch) -> Option<&str> {
        patch.id.as_deref()
    }

    fn merge(&mut self, patch: Self::Patch) {
        patch.name.apply_to(&mut self.name);
        patch.cron_expression.apply_to(&mut self.cron_expression);
    }
}

impl PartialEq for CronSchedule {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self, other)
    }
}
