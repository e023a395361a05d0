//! Typed per-collection wrapper over a [`DocumentStore`].

use super::{Document, DocumentFields, DocumentStore};
use crate::domain::entity::{Entity, ID_FIELD};
use crate::domain::SortDirective;
use crate::errors::{Error, Result};
use futures::stream::{BoxStream, StreamExt};
use serde_json::Value as JsonValue;
use std::marker::PhantomData;
use std::sync::Arc;

/// Capability set over one entity collection: save, find, stream, exists,
/// delete, count.
pub struct EntityRepository<E: Entity> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<E: Entity> EntityRepository<E> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn collection(&self) -> &'static str {
        E::DESCRIPTOR.collection
    }

    /// Stores the entity and returns it with its id populated.
    pub async fn save(&self, entity: &E) -> Result<E> {
        let stored = self
            .store
            .save(self.collection(), to_document(entity)?)
            .await?;
        from_document(stored)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<E>> {
        self.store
            .find_by_id(self.collection(), id)
            .await?
            .map(from_document)
            .transpose()
    }

    /// Lazily reads every entity. `sort` is the raw `field[,dir]` directive.
    pub async fn find_all(&self, sort: Option<&str>) -> Result<BoxStream<'static, Result<E>>> {
        let directive = sort
            .map(|raw| SortDirective::parse(raw, E::DESCRIPTOR))
            .transpose()?;
        let documents = self.store.find_all(self.collection(), directive).await?;
        Ok(documents
            .map(|doc| doc.and_then(from_document::<E>))
            .boxed())
    }

    pub async fn exists_by_id(&self, id: &str) -> Result<bool> {
        self.store.exists_by_id(self.collection(), id).await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.store.delete_by_id(self.collection(), id).await
    }

    pub async fn count(&self) -> Result<u64> {
        self.store.count(self.collection()).await
    }
}

/// Entity to document: API names become document names, nulls are dropped.
pub fn to_document<E: Entity>(entity: &E) -> Result<Document> {
    let descriptor = E::DESCRIPTOR;
    let value = serde_json::to_value(entity)
        .map_err(|e| Error::serialization(e, format!("encoding {}", descriptor.entity_name)))?;
    let JsonValue::Object(payload) = value else {
        return Err(Error::InvalidDocument(format!(
            "{} does not encode to an object",
            descriptor.entity_name
        )));
    };

    let fields: DocumentFields = payload
        .into_iter()
        .filter(|(name, value)| name != ID_FIELD && !value.is_null())
        .map(|(name, value)| {
            let stored = descriptor
                .field(&name)
                .map_or(name.clone(), |f| f.document_name.to_string());
            (stored, value)
        })
        .collect();

    Ok(Document::new(entity.id().map(str::to_string), fields))
}

/// Document to entity: the inverse of [`to_document`].
pub fn from_document<E: Entity>(document: Document) -> Result<E> {
    let descriptor = E::DESCRIPTOR;
    let mut payload: DocumentFields = document
        .fields
        .into_iter()
        .map(|(name, value)| {
            let api = descriptor
                .field_by_document_name(&name)
                .map_or(name.clone(), |f| f.name.to_string());
            (api, value)
        })
        .collect();
    payload.insert(
        ID_FIELD.to_string(),
        document.id.map_or(JsonValue::Null, JsonValue::String),
    );

    serde_json::from_value(JsonValue::Object(payload))
        .map_err(|e| Error::serialization(e, format!("decoding {}", descriptor.entity_name)))
}
