pub mod alerts;
pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod entity;
    pub mod health;
}

pub use alerts::Alerts;
pub use error::ApiError;
pub use router::{api_doc, create_router, entity_routes, ApiDoc};
pub use types::AppState;
