//! Read seam over the social graph.
//!
//! The engine only ever reads; every computation treats the store as a
//! read-only snapshot. Ordering of returned rows is unspecified unless a
//! method documents otherwise - the engine applies its own comparators.

mod memory;
mod postgres;

use crate::error::ServiceResult;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::{Comment, CommentLike, Favorite, Follow, Post, PostLike, User};

pub use memory::MemoryGraphStore;
pub use postgres::PostgresGraphStore;

/// Typed read primitives the engine consumes. Implemented by Postgres for
/// production and by [`MemoryGraphStore`] for tests and simulations.
#[async_trait::async_trait]
pub trait GraphStore: Send + Sync {
    // --- users ---

    async fn user_exists(&self, id: Uuid) -> ServiceResult<bool>;

    /// Fetch users by id. Missing ids are silently absent from the result.
    async fn users_by_ids(&self, ids: &[Uuid]) -> ServiceResult<Vec<User>>;

    /// Users with no incoming follow edge, ordered by id ascending.
    async fn user_ids_without_followers(&self, limit: i64) -> ServiceResult<Vec<Uuid>>;

    // --- follows ---

    /// Distinct ids of users that `user_id` follows.
    async fn followee_ids(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>>;

    /// All follow edges whose follower is in `follower_ids`.
    async fn follows_by_followers(&self, follower_ids: &[Uuid]) -> ServiceResult<Vec<Follow>>;

    /// Follow edges pointing at `user_id` created at or after `since`.
    async fn follows_to_user_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<Follow>>;

    /// Users ranked by incoming-follow count, count descending then id
    /// ascending, truncated to `limit`. Only users with at least one
    /// follower appear.
    async fn top_followed_users(&self, limit: i64) -> ServiceResult<Vec<(Uuid, i64)>>;

    // --- posts ---

    async fn post_exists(&self, id: Uuid) -> ServiceResult<bool>;

    async fn post_ids_by_owners(&self, owner_ids: &[Uuid]) -> ServiceResult<Vec<Uuid>>;

    async fn posts_by_owners(&self, owner_ids: &[Uuid]) -> ServiceResult<Vec<Post>>;

    /// Fetch posts by id. Missing ids are silently absent from the result.
    async fn posts_by_ids(&self, ids: &[Uuid]) -> ServiceResult<Vec<Post>>;

    /// Each owner's single most recent post (ties broken by smaller id).
    /// Owners without posts are absent.
    async fn latest_post_per_owner(&self, owner_ids: &[Uuid]) -> ServiceResult<Vec<Post>>;

    // --- post likes ---

    async fn post_likes_by_users(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<PostLike>>;

    async fn post_likes_on_posts(&self, post_ids: &[Uuid]) -> ServiceResult<Vec<PostLike>>;

    async fn post_likes_on_posts_since(
        &self,
        post_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<PostLike>>;

    // --- favorites ---

    async fn favorites_by_users(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<Favorite>>;

    async fn favorites_on_posts(&self, post_ids: &[Uuid]) -> ServiceResult<Vec<Favorite>>;

    // --- comments ---

    async fn comment_exists(&self, id: Uuid) -> ServiceResult<bool>;

    async fn comments_by_users(&self, author_ids: &[Uuid]) -> ServiceResult<Vec<Comment>>;

    async fn comments_on_posts(&self, post_ids: &[Uuid]) -> ServiceResult<Vec<Comment>>;

    async fn comments_on_posts_since(
        &self,
        post_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<Comment>>;

    // --- comment likes ---

    async fn comment_likes_on_comments(
        &self,
        comment_ids: &[Uuid],
    ) -> ServiceResult<Vec<CommentLike>>;
}
