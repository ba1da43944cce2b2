//! Feed Composer: the aggregated home feed.
//!
//! Candidate set = every post owned by the viewer or a followee - the
//! viewer's own posts are always present regardless of engagement state.
//! Aggregates are attached by explicit in-memory left-joins over the likes,
//! comments and favorites of the sliced page only.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::deadline::Deadline;
use crate::domain::models::Post;
use crate::domain::views::FeedPost;
use crate::error::ServiceResult;
use crate::services::{enrichment, pagination, DiscoveryService, Page, ViewerScope};
use crate::store::GraphStore;

/// Feed ordering: newest first, id ascending on equal timestamps.
fn newest_first(a: &Post, b: &Post) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id))
}

#[derive(Default)]
struct PostAggregates {
    likes_count: i64,
    comments_count: i64,
    liked: bool,
    favorite: bool,
    latest_like: Option<(DateTime<Utc>, Uuid)>,
}

impl<S: GraphStore + ?Sized> DiscoveryService<S> {
    /// The viewer's aggregated home feed, newest first, with denormalized
    /// per-post aggregates.
    pub async fn get_followed_users_feed(
        &self,
        viewer_id: Uuid,
        offset: usize,
        limit: usize,
        deadline: &Deadline,
    ) -> ServiceResult<Page<FeedPost>> {
        deadline.check()?;
        self.ensure_viewer(viewer_id).await?;

        let scope = ViewerScope::collect(self.store(), viewer_id).await?;

        deadline.check()?;
        let mut posts = self.store().posts_by_owners(&scope.owner_ids()).await?;
        posts.sort_by(newest_first);
        let (total, window) = pagination::slice(posts, offset, limit);
        let window_ids: Vec<Uuid> = window.iter().map(|p| p.id).collect();

        deadline.check()?;
        let (likes, comments, favorites) = tokio::try_join!(
            self.store().post_likes_on_posts(&window_ids),
            self.store().comments_on_posts(&window_ids),
            self.store().favorites_on_posts(&window_ids),
        )?;

        let mut aggregates: HashMap<Uuid, PostAggregates> = HashMap::new();
        for like in &likes {
            let agg = aggregates.entry(like.post_id).or_default();
            agg.likes_count += 1;
            if like.user_id == viewer_id {
                agg.liked = true;
            }
            let newer = match agg.latest_like {
                None => true,
                Some((at, _)) => like.created_at > at,
            };
            if newer {
                agg.latest_like = Some((like.created_at, like.user_id));
            }
        }
        for comment in &comments {
            aggregates.entry(comment.post_id).or_default().comments_count += 1;
        }
        for favorite in &favorites {
            if favorite.user_id == viewer_id {
                aggregates.entry(favorite.post_id).or_default().favorite = true;
            }
        }

        // one user batch covers owners and latest likers
        deadline.check()?;
        let wanted = window
            .iter()
            .map(|p| p.owner_id)
            .chain(aggregates.values().filter_map(|a| {
                a.latest_like.map(|(_, user_id)| user_id)
            }));
        let users = enrichment::user_map(self.store(), wanted).await?;

        let data: Vec<FeedPost> = window
            .into_iter()
            .filter_map(|post| {
                let owner = users.get(&post.owner_id)?.clone();
                let agg = aggregates.remove(&post.id).unwrap_or_default();
                let latest_like_user = agg
                    .latest_like
                    .and_then(|(_, user_id)| users.get(&user_id))
                    .cloned();
                Some(FeedPost {
                    post,
                    owner,
                    comments_count: agg.comments_count,
                    likes_count: agg.likes_count,
                    liked: agg.liked,
                    favorite: agg.favorite,
                    latest_like_user,
                })
            })
            .collect();

        debug!(viewer = %viewer_id, total, page = data.len(), "Composed home feed");

        Ok(Page { total, data })
    }
}
