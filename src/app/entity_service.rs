//! The entity service.
//!
//! Orchestrates every operation of one entity family on top of its
//! [`EntityRepository`]:
//! 1.  `save` / `update`: whole-record writes.
//! 2.  `partial_update`: load, merge the patch field by field, write back.
//! 3.  `find_all` / `count_all` / `find_one` / `delete`: thin pass-throughs.

use crate::domain::Entity;
use crate::errors::Result;
use crate::storage::{DocumentStore, EntityRepository};
use futures::stream::BoxStream;
use std::sync::Arc;

pub struct EntityService<E: Entity> {
    repository: EntityRepository<E>,
}

impl<E: Entity> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<E: Entity> EntityService<E> {
    pub fn new(repository: EntityRepository<E>) -> Self {
        Self { repository }
    }

    pub fn from_store(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(EntityRepository::new(store))
    }

    /// Stores a new entity; the returned copy carries the assigned id.
    pub async fn save(&self, entity: E) -> Result<E> {
        tracing::debug!(entity = E::DESCRIPTOR.entity_name, payload = ?entity, "Request to save");
        self.repository.save(&entity).await
    }

    /// Replaces an existing entity wholesale. Same write as [`Self::save`];
    /// the caller is expected to have checked that the record exists.
    pub async fn update(&self, entity: E) -> Result<E> {
        tracing::debug!(entity = E::DESCRIPTOR.entity_name, payload = ?entity, "Request to update");
        self.repository.save(&entity).await
    }

    /// Merges `patch` into the stored record named by its id.
    ///
    /// Returns `Ok(None)` when there is no such record (or the patch has no id).
    pub async fn partial_update(&self, patch: E::Patch) -> Result<Option<E>> {
        tracing::debug!(entity = E::DESCRIPTOR.entity_name, payload = ?patch, "Request to partially update");

        let Some(id) = E::patch_id(&patch) else {
            return Ok(None);
        };
        let Some(mut existing) = self.repository.find_by_id(id).await? else {
            return Ok(None);
        };

        existing.merge(patch);
        self.repository.save(&existing).await.map(Some)
    }

    /// Lazily reads every entity, optionally ordered by a raw sort directive
    /// which is handed to the repository untouched.
    pub async fn find_all(&self, sort: Option<&str>) -> Result<BoxStream<'static, Result<E>>> {
        tracing::debug!(entity = E::DESCRIPTOR.entity_name, ?sort, "Request to get all");
        self.repository.find_all(sort).await
    }

    pub async fn count_all(&self) -> Result<u64> {
        self.repository.count().await
    }

    pub async fn find_one(&self, id: &str) -> Result<Option<E>> {
        tracing::debug!(entity = E::DESCRIPTOR.entity_name, id, "Request to get");
        self.repository.find_by_id(id).await
    }

    /// Deletes unconditionally; does not report whether the record existed.
    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::debug!(entity = E::DESCRIPTOR.entity_name, id, "Request to delete");
        self.repository.delete_by_id(id).await
    }
}
