//! Domain types: entity families, merge-patch values and sort directives.

pub mod entity;
pub mod patch;
pub mod sort;

pub use entity::{Entity, EntityDescriptor, EntityRegistry};
pub use patch::Patch;
pub use sort::{OrderDirection, SortDirective, SortField};
