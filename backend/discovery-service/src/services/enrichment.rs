//! Shared attach-related-entity-by-id enrichment.
//!
//! Every denormalized feed works the same way: collect the foreign ids out of
//! an ordered row list, batch-fetch the referenced entities once, then zip
//! them back preserving the original ordering. Rows whose referent is missing
//! are dropped rather than surfaced as holes.

use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::models::{Post, User};
use crate::error::ServiceResult;
use crate::store::GraphStore;

/// Batch-fetch users and key them by id.
pub async fn user_map<S: GraphStore + ?Sized>(
    store: &S,
    ids: impl IntoIterator<Item = Uuid>,
) -> ServiceResult<HashMap<Uuid, User>> {
    let mut unique: Vec<Uuid> = ids.into_iter().collect();
    unique.sort();
    unique.dedup();
    let users = store.users_by_ids(&unique).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// Batch-fetch posts and key them by id.
pub async fn post_map<S: GraphStore + ?Sized>(
    store: &S,
    ids: impl IntoIterator<Item = Uuid>,
) -> ServiceResult<HashMap<Uuid, Post>> {
    let mut unique: Vec<Uuid> = ids.into_iter().collect();
    unique.sort();
    unique.dedup();
    let posts = store.posts_by_ids(&unique).await?;
    Ok(posts.into_iter().map(|p| (p.id, p)).collect())
}

/// Zip fetched entities back onto ordered rows. `key` extracts each row's
/// foreign id; rows without a fetched referent are dropped.
pub fn attach<R, E: Clone, T>(
    rows: Vec<R>,
    entities: &HashMap<Uuid, E>,
    key: impl Fn(&R) -> Uuid,
    build: impl Fn(R, E) -> T,
) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| {
            let entity = entities.get(&key(&row))?.clone();
            Some(build(row, entity))
        })
        .collect()
}
