//! EntityRegistry for mapping collection names to entity descriptors.

use super::{Account, CronSchedule, Entity, EntityDescriptor, TrafficRecord};
use std::collections::BTreeMap;

/// A registry of every entity family served by this process.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    descriptors: BTreeMap<&'static str, &'static EntityDescriptor>,
}

impl EntityRegistry {
    /// Creates a new empty EntityRegistry.
    pub fn new() -> Self {
        Self {
            descriptors: BTreeMap::new(),
        }
    }

    /// The three built-in families: cron schedules, traffic data and users.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register::<CronSchedule>();
        registry.register::<TrafficRecord>();
        registry.register::<Account>();
        registry
    }

    /// Registers an entity family under its collection name.
    pub fn register<E: Entity>(&mut self) {
        self.descriptors
            .insert(E::DESCRIPTOR.collection, E::DESCRIPTOR);
    }

    /// Retrieves a descriptor by collection name.
    pub fn get(&self, collection: &str) -> Option<&'static EntityDescriptor> {
        self.descriptors.get(collection).copied()
    }

    /// Returns all registered collection names, sorted.
    pub fn collections(&self) -> Vec<&'static str> {
        self.descriptors.keys().copied().collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static EntityDescriptor> + '_ {
        self.descriptors.values().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
