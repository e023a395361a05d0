//! Merge-patch field values.
//!
//! A merge-patch payload only ever says "set this field" or "leave it alone".
//! `null` and a missing key both decode to [`Patch::Absent`]; there is no way
//! to clear a stored value through a patch.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Value(T),
}

impl<T> Patch<T> {
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Overwrites `slot` when a value is present; absent leaves it untouched.
    pub fn apply_to(self, slot: &mut Option<T>) {
        if let Self::Value(v) = self {
            *slot = Some(v);
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}
