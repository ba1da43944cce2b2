use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::{Comment, CommentLike, Favorite, Follow, Post, PostLike, User};
use crate::error::ServiceResult;
use crate::store::GraphStore;

/// PostgreSQL implementation of the graph read seam.
#[derive(Clone)]
pub struct PostgresGraphStore {
    pool: PgPool,
}

impl PostgresGraphStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Health check
    pub async fn health_check(&self) -> ServiceResult<bool> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(true)
    }
}

#[async_trait::async_trait]
impl GraphStore for PostgresGraphStore {
    async fn user_exists(&self, id: Uuid) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> ServiceResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, last_name, avatar_url
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn user_ids_without_followers(&self, limit: i64) -> ServiceResult<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT u.id
            FROM users u
            WHERE NOT EXISTS (SELECT 1 FROM follows f WHERE f.followee_id = u.id)
            ORDER BY u.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn followee_ids(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT DISTINCT followee_id FROM follows WHERE follower_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn follows_by_followers(&self, follower_ids: &[Uuid]) -> ServiceResult<Vec<Follow>> {
        let follows = sqlx::query_as::<_, Follow>(
            r#"
            SELECT id, follower_id, followee_id, created_at
            FROM follows
            WHERE follower_id = ANY($1)
            "#,
        )
        .bind(follower_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(follows)
    }

    async fn follows_to_user_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<Follow>> {
        let follows = sqlx::query_as::<_, Follow>(
            r#"
            SELECT id, follower_id, followee_id, created_at
            FROM follows
            WHERE followee_id = $1 AND created_at >= $2
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(follows)
    }

    async fn top_followed_users(&self, limit: i64) -> ServiceResult<Vec<(Uuid, i64)>> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT followee_id, COUNT(*) AS followers
            FROM follows
            GROUP BY followee_id
            ORDER BY followers DESC, followee_id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn post_exists(&self, id: Uuid) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn post_ids_by_owners(&self, owner_ids: &[Uuid]) -> ServiceResult<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM posts WHERE owner_id = ANY($1)")
            .bind(owner_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn posts_by_owners(&self, owner_ids: &[Uuid]) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, owner_id, title, photo_url, video_url, created_at
            FROM posts
            WHERE owner_id = ANY($1)
            "#,
        )
        .bind(owner_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn posts_by_ids(&self, ids: &[Uuid]) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, owner_id, title, photo_url, video_url, created_at
            FROM posts
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn latest_post_per_owner(&self, owner_ids: &[Uuid]) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT DISTINCT ON (owner_id)
                id, owner_id, title, photo_url, video_url, created_at
            FROM posts
            WHERE owner_id = ANY($1)
            ORDER BY owner_id, created_at DESC, id ASC
            "#,
        )
        .bind(owner_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn post_likes_by_users(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<PostLike>> {
        let likes = sqlx::query_as::<_, PostLike>(
            r#"
            SELECT id, post_id, user_id, created_at
            FROM post_likes
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }

    async fn post_likes_on_posts(&self, post_ids: &[Uuid]) -> ServiceResult<Vec<PostLike>> {
        let likes = sqlx::query_as::<_, PostLike>(
            r#"
            SELECT id, post_id, user_id, created_at
            FROM post_likes
            WHERE post_id = ANY($1)
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }

    async fn post_likes_on_posts_since(
        &self,
        post_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<PostLike>> {
        let likes = sqlx::query_as::<_, PostLike>(
            r#"
            SELECT id, post_id, user_id, created_at
            FROM post_likes
            WHERE post_id = ANY($1) AND created_at >= $2
            "#,
        )
        .bind(post_ids)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }

    async fn favorites_by_users(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<Favorite>> {
        let favorites = sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, post_id, user_id, created_at
            FROM favorites
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(favorites)
    }

    async fn favorites_on_posts(&self, post_ids: &[Uuid]) -> ServiceResult<Vec<Favorite>> {
        let favorites = sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, post_id, user_id, created_at
            FROM favorites
            WHERE post_id = ANY($1)
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(favorites)
    }

    async fn comment_exists(&self, id: Uuid) -> ServiceResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn comments_by_users(&self, author_ids: &[Uuid]) -> ServiceResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, text, created_at
            FROM comments
            WHERE author_id = ANY($1)
            "#,
        )
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn comments_on_posts(&self, post_ids: &[Uuid]) -> ServiceResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, text, created_at
            FROM comments
            WHERE post_id = ANY($1)
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn comments_on_posts_since(
        &self,
        post_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, text, created_at
            FROM comments
            WHERE post_id = ANY($1) AND created_at >= $2
            "#,
        )
        .bind(post_ids)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn comment_likes_on_comments(
        &self,
        comment_ids: &[Uuid],
    ) -> ServiceResult<Vec<CommentLike>> {
        let likes = sqlx::query_as::<_, CommentLike>(
            r#"
            SELECT id, comment_id, user_id, created_at
            FROM comment_likes
            WHERE comment_id = ANY($1)
            "#,
        )
        .bind(comment_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }
}
