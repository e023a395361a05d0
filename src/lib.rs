pub mod app;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::EntityService;
pub use domain::entity::{Account, CronSchedule, TrafficRecord};
pub use domain::{Entity, EntityRegistry, Patch};
pub use errors::{Error, Result};
pub use storage::{DocumentStore, EntityRepository, InMemoryDocumentStore, PostgresDocumentStore};
