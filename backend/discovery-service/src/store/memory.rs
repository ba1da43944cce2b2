use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::models::{Comment, CommentLike, Favorite, Follow, Post, PostLike, User};
use crate::error::{ServiceError, ServiceResult};
use crate::store::GraphStore;

/// In-memory implementation of the graph read seam.
///
/// Holds plain vectors behind an `RwLock` and evaluates every primitive by
/// filtering. Used as the test fixture store and for offline simulations;
/// it honors the same ordering contracts as the Postgres implementation.
#[derive(Default)]
pub struct MemoryGraphStore {
    inner: RwLock<Data>,
}

#[derive(Default)]
struct Data {
    users: Vec<User>,
    follows: Vec<Follow>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    post_likes: Vec<PostLike>,
    comment_likes: Vec<CommentLike>,
    favorites: Vec<Favorite>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.write(|d| d.users.push(user));
    }

    pub fn add_follow(&self, follow: Follow) {
        self.write(|d| d.follows.push(follow));
    }

    pub fn add_post(&self, post: Post) {
        self.write(|d| d.posts.push(post));
    }

    pub fn add_comment(&self, comment: Comment) {
        self.write(|d| d.comments.push(comment));
    }

    pub fn add_post_like(&self, like: PostLike) {
        self.write(|d| d.post_likes.push(like));
    }

    pub fn add_comment_like(&self, like: CommentLike) {
        self.write(|d| d.comment_likes.push(like));
    }

    pub fn add_favorite(&self, favorite: Favorite) {
        self.write(|d| d.favorites.push(favorite));
    }

    fn write(&self, f: impl FnOnce(&mut Data)) {
        if let Ok(mut data) = self.inner.write() {
            f(&mut data);
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Data) -> T) -> ServiceResult<T> {
        self.inner
            .read()
            .map(|data| f(&data))
            .map_err(|_| ServiceError::Internal("memory store lock poisoned".to_string()))
    }
}

fn in_set(set: &[Uuid]) -> HashSet<Uuid> {
    set.iter().copied().collect()
}

#[async_trait::async_trait]
impl GraphStore for MemoryGraphStore {
    async fn user_exists(&self, id: Uuid) -> ServiceResult<bool> {
        self.read(|d| d.users.iter().any(|u| u.id == id))
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> ServiceResult<Vec<User>> {
        let wanted = in_set(ids);
        self.read(|d| {
            d.users
                .iter()
                .filter(|u| wanted.contains(&u.id))
                .cloned()
                .collect()
        })
    }

    async fn user_ids_without_followers(&self, limit: i64) -> ServiceResult<Vec<Uuid>> {
        self.read(|d| {
            let followed: HashSet<Uuid> = d.follows.iter().map(|f| f.followee_id).collect();
            let mut ids: Vec<Uuid> = d
                .users
                .iter()
                .map(|u| u.id)
                .filter(|id| !followed.contains(id))
                .collect();
            ids.sort();
            ids.truncate(limit.max(0) as usize);
            ids
        })
    }

    async fn followee_ids(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        self.read(|d| {
            let ids: HashSet<Uuid> = d
                .follows
                .iter()
                .filter(|f| f.follower_id == user_id)
                .map(|f| f.followee_id)
                .collect();
            ids.into_iter().collect()
        })
    }

    async fn follows_by_followers(&self, follower_ids: &[Uuid]) -> ServiceResult<Vec<Follow>> {
        let wanted = in_set(follower_ids);
        self.read(|d| {
            d.follows
                .iter()
                .filter(|f| wanted.contains(&f.follower_id))
                .cloned()
                .collect()
        })
    }

    async fn follows_to_user_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<Follow>> {
        self.read(|d| {
            d.follows
                .iter()
                .filter(|f| f.followee_id == user_id && f.created_at >= since)
                .cloned()
                .collect()
        })
    }

    async fn top_followed_users(&self, limit: i64) -> ServiceResult<Vec<(Uuid, i64)>> {
        self.read(|d| {
            let mut counts: HashMap<Uuid, i64> = HashMap::new();
            for follow in &d.follows {
                *counts.entry(follow.followee_id).or_insert(0) += 1;
            }
            let mut ranked: Vec<(Uuid, i64)> = counts.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            ranked.truncate(limit.max(0) as usize);
            ranked
        })
    }

    async fn post_exists(&self, id: Uuid) -> ServiceResult<bool> {
        self.read(|d| d.posts.iter().any(|p| p.id == id))
    }

    async fn post_ids_by_owners(&self, owner_ids: &[Uuid]) -> ServiceResult<Vec<Uuid>> {
        let wanted = in_set(owner_ids);
        self.read(|d| {
            d.posts
                .iter()
                .filter(|p| wanted.contains(&p.owner_id))
                .map(|p| p.id)
                .collect()
        })
    }

    async fn posts_by_owners(&self, owner_ids: &[Uuid]) -> ServiceResult<Vec<Post>> {
        let wanted = in_set(owner_ids);
        self.read(|d| {
            d.posts
                .iter()
                .filter(|p| wanted.contains(&p.owner_id))
                .cloned()
                .collect()
        })
    }

    async fn posts_by_ids(&self, ids: &[Uuid]) -> ServiceResult<Vec<Post>> {
        let wanted = in_set(ids);
        self.read(|d| {
            d.posts
                .iter()
                .filter(|p| wanted.contains(&p.id))
                .cloned()
                .collect()
        })
    }

    async fn latest_post_per_owner(&self, owner_ids: &[Uuid]) -> ServiceResult<Vec<Post>> {
        let wanted = in_set(owner_ids);
        self.read(|d| {
            let mut latest: HashMap<Uuid, &Post> = HashMap::new();
            for post in d.posts.iter().filter(|p| wanted.contains(&p.owner_id)) {
                latest
                    .entry(post.owner_id)
                    .and_modify(|current| {
                        // newest wins; equal timestamps break toward the smaller id
                        let newer = post.created_at > current.created_at
                            || (post.created_at == current.created_at && post.id < current.id);
                        if newer {
                            *current = post;
                        }
                    })
                    .or_insert(post);
            }
            latest.into_values().cloned().collect()
        })
    }

    async fn post_likes_by_users(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<PostLike>> {
        let wanted = in_set(user_ids);
        self.read(|d| {
            d.post_likes
                .iter()
                .filter(|l| wanted.contains(&l.user_id))
                .cloned()
                .collect()
        })
    }

    async fn post_likes_on_posts(&self, post_ids: &[Uuid]) -> ServiceResult<Vec<PostLike>> {
        let wanted = in_set(post_ids);
        self.read(|d| {
            d.post_likes
                .iter()
                .filter(|l| wanted.contains(&l.post_id))
                .cloned()
                .collect()
        })
    }

    async fn post_likes_on_posts_since(
        &self,
        post_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<PostLike>> {
        let wanted = in_set(post_ids);
        self.read(|d| {
            d.post_likes
                .iter()
                .filter(|l| wanted.contains(&l.post_id) && l.created_at >= since)
                .cloned()
                .collect()
        })
    }

    async fn favorites_by_users(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<Favorite>> {
        let wanted = in_set(user_ids);
        self.read(|d| {
            d.favorites
                .iter()
                .filter(|f| wanted.contains(&f.user_id))
                .cloned()
                .collect()
        })
    }

    async fn favorites_on_posts(&self, post_ids: &[Uuid]) -> ServiceResult<Vec<Favorite>> {
        let wanted = in_set(post_ids);
        self.read(|d| {
            d.favorites
                .iter()
                .filter(|f| wanted.contains(&f.post_id))
                .cloned()
                .collect()
        })
    }

    async fn comment_exists(&self, id: Uuid) -> ServiceResult<bool> {
        self.read(|d| d.comments.iter().any(|c| c.id == id))
    }

    async fn comments_by_users(&self, author_ids: &[Uuid]) -> ServiceResult<Vec<Comment>> {
        let wanted = in_set(author_ids);
        self.read(|d| {
            d.comments
                .iter()
                .filter(|c| wanted.contains(&c.author_id))
                .cloned()
                .collect()
        })
    }

    async fn comments_on_posts(&self, post_ids: &[Uuid]) -> ServiceResult<Vec<Comment>> {
        let wanted = in_set(post_ids);
        self.read(|d| {
            d.comments
                .iter()
                .filter(|c| wanted.contains(&c.post_id))
                .cloned()
                .collect()
        })
    }

    async fn comments_on_posts_since(
        &self,
        post_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<Comment>> {
        let wanted = in_set(post_ids);
        self.read(|d| {
            d.comments
                .iter()
                .filter(|c| wanted.contains(&c.post_id) && c.created_at >= since)
                .cloned()
                .collect()
        })
    }

    async fn comment_likes_on_comments(
        &self,
        comment_ids: &[Uuid],
    ) -> ServiceResult<Vec<CommentLike>> {
        let wanted = in_set(comment_ids);
        self.read(|d| {
            d.comment_likes
                .iter()
                .filter(|l| wanted.contains(&l.comment_id))
                .cloned()
                .collect()
        })
    }
}
