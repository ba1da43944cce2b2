//! Social-graph discovery engine: personalized user and post suggestions,
//! the aggregated home feed, and time-windowed notification feeds.
//!
//! The engine is a pure read layer over a [`store::GraphStore`]; content CRUD,
//! auth, media and transport are external collaborators.

pub mod config;
pub mod deadline;
pub mod domain;
pub mod error;
pub mod services;
pub mod store;

pub use config::EngineConfig;
pub use deadline::Deadline;
pub use error::{ServiceError, ServiceResult};
pub use services::{DiscoveryService, Page};
pub use store::{GraphStore, MemoryGraphStore, PostgresGraphStore};
