//! Document store interface and its backends.
//!
//! The store keeps one collection per entity family and one document per
//! entity instance, keyed by an opaque string id that the store assigns on
//! first save. It guarantees per-document atomicity only.

use crate::domain::SortDirective;
use crate::errors::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::{Map, Value as JsonValue};

pub mod id;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use id::generate_object_id;
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use repository::EntityRepository;

/// Stored field values keyed by document field name.
pub type DocumentFields = Map<String, JsonValue>;

/// A lazily pulled sequence of documents. Dropping it stops the read.
pub type DocumentStream = BoxStream<'static, Result<Document>>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// `None` until the document has been saved once.
    pub id: Option<String>,
    pub fields: DocumentFields,
}

impl Document {
    pub fn new(id: Option<String>, fields: DocumentFields) -> Self {
        Self { id, fields }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts or replaces a document. A missing id is generated and the
    /// stored document is returned with it.
    async fn save(&self, collection: &str, document: Document) -> Result<Document>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Opens a lazy read over the whole collection, in store order unless a
    /// sort directive is given.
    async fn find_all(&self, collection: &str, sort: Option<SortDirective>)
        -> Result<DocumentStream>;

    async fn exists_by_id(&self, collection: &str, id: &str) -> Result<bool>;

    /// Removing an absent id is not an error.
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<()>;

    async fn count(&self, collection: &str) -> Result<u64>;

    /// Cheap reachability probe used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}
