//! The discovery engine's operations.
//!
//! Every operation is a pure read pipeline: validate the viewer, collect the
//! viewer's graph scope, issue the independent store reads (concurrently
//! where they do not depend on each other), then group/join/slice in memory.
//! No operation holds state across calls, so concurrent invocations for
//! different viewers are fully independent.

pub mod engagement;
pub mod enrichment;
pub mod feed;
pub mod notifications;
pub mod pagination;
pub mod signals;
pub mod suggested_posts;
pub mod suggested_users;

use std::sync::Arc;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::store::GraphStore;

pub use pagination::Page;
pub use signals::ViewerScope;

/// The engine facade. Holds the store seam and tuning config; all operations
/// hang off this type (one `impl` block per operation module).
#[derive(Clone)]
pub struct DiscoveryService<S: GraphStore + ?Sized> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S: GraphStore + ?Sized> DiscoveryService<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) async fn ensure_viewer(&self, viewer_id: Uuid) -> ServiceResult<()> {
        if self.store.user_exists(viewer_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("viewer_id", "User", viewer_id))
        }
    }

    pub(crate) async fn ensure_post(&self, post_id: Uuid) -> ServiceResult<()> {
        if self.store.post_exists(post_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("post_id", "Post", post_id))
        }
    }

    pub(crate) async fn ensure_comment(&self, comment_id: Uuid) -> ServiceResult<()> {
        if self.store.comment_exists(comment_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("comment_id", "Comment", comment_id))
        }
    }
}
