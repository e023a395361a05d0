//! Sort directives for collection reads (`?sort=field[,asc|desc]`).

use crate::domain::entity::{EntityDescriptor, ID_FIELD};
use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

/// What a directive orders by, already resolved to storage names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Document(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDirective {
    pub field: SortField,
    pub direction: OrderDirection,
}

impl SortDirective {
    /// Parses `field` or `field,direction` against an entity's field table.
    pub fn parse(raw: &str, descriptor: &EntityDescriptor) -> Result<Self> {
        let mut parts = raw.split(',').map(str::trim);
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(Error::InvalidSort("missing field name".to_string()));
        }

        let field = if name == ID_FIELD {
            SortField::Id
        } else {
            let known = descriptor.field(name).ok_or_else(|| {
                Error::InvalidSort(format!(
                    "unknown field '{}' for {}",
                    name, descriptor.entity_name
                ))
            })?;
            SortField::Document(known.document_name)
        };

        let direction = match parts.next() {
            None => OrderDirection::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => OrderDirection::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => OrderDirection::Desc,
            Some(other) => {
                return Err(Error::InvalidSort(format!(
                    "unknown direction '{}'",
                    other
                )))
            }
        };

        if parts.next().is_some() {
            return Err(Error::InvalidSort(format!("unexpected trailing input in '{}'", raw)));
        }

        Ok(Self { field, direction })
    }
}
