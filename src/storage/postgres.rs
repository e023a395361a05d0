//! PostgreSQL-backed document store.
//!
//! Each collection is a table `(id TEXT PRIMARY KEY, document JSONB NOT NULL)`.

use super::{generate_object_id, Document, DocumentStore, DocumentStream};
use crate::domain::{EntityRegistry, OrderDirection, SortDirective, SortField};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| Error::database(e, "connecting to document store"))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the table of every registered collection that does not exist yet.
    pub async fn ensure_collections(&self, registry: &EntityRegistry) -> Result<()> {
        for collection in registry.collections() {
            let sql = create_collection_sql(table(collection)?);
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::database(e, format!("creating collection {}", collection)))?;
            tracing::debug!(collection, "collection ready");
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn save(&self, collection: &str, document: Document) -> Result<Document> {
        let table = table(collection)?;
        let id = document.id.unwrap_or_else(generate_object_id);
        let sql = format!(
            "INSERT INTO {} (id, document) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET document = EXCLUDED.document",
            table
        );
        sqlx::query(&sql)
            .bind(&id)
            .bind(JsonValue::Object(document.fields.clone()))
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database(e, format!("saving {} in {}", id, collection)))?;
        Ok(Document::new(Some(id), document.fields))
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let sql = format!("SELECT id, document FROM {} WHERE id = $1", table(collection)?);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::database(e, format!("reading {} from {}", id, collection)))?;
        row.as_ref().map(row_to_document).transpose()
    }

    async fn find_all(
        &self,
        collection: &str,
        sort: Option<SortDirective>,
    ) -> Result<DocumentStream> {
        let sql = format!(
            "SELECT id, document FROM {}{}",
            table(collection)?,
            order_by_clause(sort)?
        );
        let pool = self.pool.clone();
        let context = format!("streaming {}", collection);

        let stream = async_stream::stream! {
            let mut rows = sqlx::query(&sql).fetch(&pool);
            while let Some(row) = rows.next().await {
                let item: Result<Document> = row
                    .map_err(|e| Error::database(e, context.clone()))
                    .and_then(|r| row_to_document(&r));
                let failed = item.is_err();
                yield item;
                if failed {
                    break;
                }
            }
        };
        Ok(stream.boxed())
    }

    async fn exists_by_id(&self, collection: &str, id: &str) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            table(collection)?
        );
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::database(e, format!("checking {} in {}", id, collection)))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table(collection)?);
        sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database(e, format!("deleting {} from {}", id, collection)))?;
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table(collection)?);
        let n = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::database(e, format!("counting {}", collection)))?;
        Ok(n.max(0) as u64)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database(e, "ping"))?;
        Ok(())
    }
}

pub fn validate_ident(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn table(collection: &str) -> Result<&str> {
    if validate_ident(collection) {
        Ok(collection)
    } else {
        Err(Error::InvalidDocument(format!(
            "invalid collection name '{}'",
            collection
        )))
    }
}

pub fn create_collection_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id TEXT PRIMARY KEY,
            document JSONB NOT NULL
        )",
        table
    )
}

fn order_by_clause(sort: Option<SortDirective>) -> Result<String> {
    let Some(directive) = sort else {
        return Ok(String::new());
    };
    let direction = match directive.direction {
        OrderDirection::Asc => "ASC",
        OrderDirection::Desc => "DESC",
    };
    match directive.field {
        SortField::Id => Ok(format!(" ORDER BY id {}", direction)),
        SortField::Document(name) if validate_ident(name) => Ok(format!(
            " ORDER BY document -> '{}' {}, id {}",
            name, direction, direction
        )),
        SortField::Document(name) => Err(Error::InvalidSort(format!(
            "field '{}' cannot be used for ordering",
            name
        ))),
    }
}

fn row_to_document(row: &PgRow) -> Result<Document> {
    let id: String = row
        .try_get("id")
        .map_err(|e| Error::database(e, "decoding document id"))?;
    let document: JsonValue = row
        .try_get("document")
        .map_err(|e| Error::database(e, format!("decoding document {}", id)))?;
    match document {
        JsonValue::Object(fields) => Ok(Document::new(Some(id), fields)),
        other => Err(Error::InvalidDocument(format!(
            "document {} is not an object: {}",
            id, other
        ))),
    }
}
