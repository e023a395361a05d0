use super::{same_identity, Entity, EntityDescriptor, FieldSpec};
use crate::domain::patch::Patch;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A user account.
///
/// The password is stored and returned as given; hashing is not part of this
/// service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Option<String>,
    /// Required.
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPatch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub password: Patch<String>,
}

const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    entity_name: "user",
    collection: "users",
    schema_name: "Account",
    api_path: "users",
    fields: &[
        FieldSpec::required("name", "name"),
        FieldSpec::optional("email", "email"),
        FieldSpec::optional("password", "password"),
    ],
};

impl Entity for Account {
    type Patch = AccountPatch;

    const DESCRIPTOR: &'static EntityDescriptor = &DESCRIPTOR;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn patch_id(patch: &Self::Patch) -> Option<&str> {
        patch.id.as_deref()
    }

    fn merge(&mut self, patch: Self::Patch) {
        patch.name.apply_to(&mut self.name);
        patch.email.apply_to(&mut self.email);
        patch.password.apply_to(&mut self.password);
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self, other)
    }
}
