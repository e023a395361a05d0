//! Error types shared by the storage, repository and service layers.

/// Result alias used below the HTTP boundary.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The document store could not be reached or rejected a statement.
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// An entity could not be converted to or from its document form.
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// The sort directive names an unknown field or direction.
    #[error("Invalid sort directive: {0}")]
    InvalidSort(String),

    /// A stored document does not have the expected shape.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

impl Error {
    pub fn database(source: sqlx::Error, context: impl Into<String>) -> Self {
        Self::Database {
            source,
            context: context.into(),
        }
    }

    pub fn serialization(source: serde_json::Error, context: impl Into<String>) -> Self {
        Self::Serialization {
            source,
            context: context.into(),
        }
    }
}
