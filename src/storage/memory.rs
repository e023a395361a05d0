//! In-process document store.
//!
//! Backs the test suite and `STORE_BACKEND=memory`. Collection reads take a
//! snapshot under the read lock and stream it afterwards, so a slow reader
//! never blocks writers. Unlike the PostgreSQL backend the read is not lazy:
//! the whole collection is copied before the first document is yielded.

use super::{generate_object_id, Document, DocumentFields, DocumentStore, DocumentStream};
use crate::domain::{OrderDirection, SortDirective, SortField};
use crate::errors::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, DocumentFields>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save(&self, collection: &str, document: Document) -> Result<Document> {
        let id = document.id.unwrap_or_else(generate_object_id);
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), document.fields.clone());
        Ok(Document::new(Some(id), document.fields))
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(Some(id.to_string()), fields.clone())))
    }

    async fn find_all(
        &self,
        collection: &str,
        sort: Option<SortDirective>,
    ) -> Result<DocumentStream> {
        let mut snapshot: Vec<Document> = {
            let collections = self.collections.read().await;
            collections
                .get(collection)
                .map(|docs| {
                    docs.iter()
                        .map(|(id, fields)| Document::new(Some(id.clone()), fields.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };

        if let Some(directive) = sort {
            snapshot.sort_by(|a, b| compare_documents(a, b, directive));
        }

        Ok(stream::iter(snapshot.into_iter().map(Ok)).boxed())
    }

    async fn exists_by_id(&self, collection: &str, id: &str) -> Result<bool> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .is_some_and(|docs| docs.contains_key(id)))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

// Mirrors PostgreSQL jsonb ordering: missing values sort last ascending and
// first descending, ties broken by id in the same direction.
fn compare_documents(a: &Document, b: &Document, directive: SortDirective) -> Ordering {
    let ordering = match directive.field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Document(name) => compare_values(field_value(a, name), field_value(b, name))
            .then_with(|| a.id.cmp(&b.id)),
    };
    match directive.direction {
        OrderDirection::Asc => ordering,
        OrderDirection::Desc => ordering.reverse(),
    }
}

fn field_value<'a>(doc: &'a Document, name: &str) -> Option<&'a JsonValue> {
    doc.fields.get(name).filter(|v| !v.is_null())
}

fn compare_values(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => compare_json(x, y),
    }
}

fn type_rank(v: &JsonValue) -> u8 {
    match v {
        JsonValue::Null => 0,
        JsonValue::String(_) => 1,
        JsonValue::Number(_) => 2,
        JsonValue::Bool(_) => 3,
        JsonValue::Array(_) => 4,
        JsonValue::Object(_) => 5,
    }
}

fn compare_json(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a, b) {
        (JsonValue::String(x), JsonValue::String(y)) => x.cmp(y),
        (JsonValue::Number(x), JsonValue::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (JsonValue::Bool(x), JsonValue::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
