//! Suggestion Scorer - posts.
//!
//! Post suggestions carry no score: candidates are ordered by discovery
//! precedence (like pool, then favorite pool, then comment pool, then the
//! popular-user fallback), deduplicating by post id on first occurrence.

use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use crate::deadline::Deadline;
use crate::domain::models::Post;
use crate::error::ServiceResult;
use crate::services::{pagination, DiscoveryService, Page, ViewerScope};
use crate::store::GraphStore;

/// Group (user, post) engagement pairs by post, order post ids by engagement
/// count descending (id ascending on ties), and cap the pool. `dedup_pairs`
/// collapses repeat engagements by the same user on the same post to one.
fn pool_by_count(
    pairs: impl Iterator<Item = (Uuid, Uuid)>,
    excluded_posts: &HashSet<Uuid>,
    cap: usize,
    dedup_pairs: bool,
) -> Vec<Uuid> {
    let mut seen_pairs: HashSet<(Uuid, Uuid)> = HashSet::new();
    let mut counts: HashMap<Uuid, i64> = HashMap::new();
    for (user_id, post_id) in pairs {
        if excluded_posts.contains(&post_id) {
            continue;
        }
        if dedup_pairs && !seen_pairs.insert((user_id, post_id)) {
            continue;
        }
        *counts.entry(post_id).or_insert(0) += 1;
    }
    let mut ranked: Vec<(Uuid, i64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(cap);
    ranked.into_iter().map(|(post_id, _)| post_id).collect()
}

impl<S: GraphStore + ?Sized> DiscoveryService<S> {
    /// Ordered, deduplicated post suggestions for `viewer_id`, paginated with
    /// the standard envelope.
    pub async fn get_suggested_posts(
        &self,
        viewer_id: Uuid,
        offset: usize,
        limit: usize,
        deadline: &Deadline,
    ) -> ServiceResult<Page<Post>> {
        deadline.check()?;
        self.ensure_viewer(viewer_id).await?;

        let scope = ViewerScope::collect(self.store(), viewer_id).await?;
        let followees = scope.followee_ids();

        deadline.check()?;
        let (owned_posts, likes, favorites, comments) = tokio::try_join!(
            scope.owned_post_ids(self.store()),
            self.store().post_likes_by_users(&followees),
            self.store().favorites_by_users(&followees),
            self.store().comments_by_users(&followees),
        )?;

        let cap = self.config().suggestion_pool_cap;
        let like_pool = pool_by_count(
            likes.iter().map(|l| (l.user_id, l.post_id)),
            &owned_posts,
            cap,
            false,
        );
        let favorite_pool = pool_by_count(
            favorites.iter().map(|f| (f.user_id, f.post_id)),
            &owned_posts,
            cap,
            false,
        );
        // repeat comments by the same commenter on one post count once
        let comment_pool = pool_by_count(
            comments.iter().map(|c| (c.author_id, c.post_id)),
            &owned_posts,
            cap,
            true,
        );

        // union in discovery order; the earlier pool wins the position
        let mut ordered: Vec<Uuid> = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();
        for post_id in like_pool
            .into_iter()
            .chain(favorite_pool)
            .chain(comment_pool)
        {
            if seen.insert(post_id) {
                ordered.push(post_id);
            }
        }

        // fallback: the most recent post of each popular user, in popularity
        // order, appended after the engagement pools
        deadline.check()?;
        let popular = self.popular_user_ids(&scope).await?;
        deadline.check()?;
        let latest_posts = self.store().latest_post_per_owner(&popular).await?;
        let latest_by_owner: HashMap<Uuid, Uuid> =
            latest_posts.iter().map(|p| (p.owner_id, p.id)).collect();
        for owner_id in &popular {
            if let Some(post_id) = latest_by_owner.get(owner_id) {
                if !owned_posts.contains(post_id) && seen.insert(*post_id) {
                    ordered.push(*post_id);
                }
            }
        }

        debug!(
            viewer = %viewer_id,
            candidates = ordered.len(),
            "Computed post suggestions"
        );

        // paginate the id list, then enrich only the requested window
        let (total, window) = pagination::slice(ordered, offset, limit);
        deadline.check()?;
        let posts = self.store().posts_by_ids(&window).await?;
        let by_id: HashMap<Uuid, Post> = posts.into_iter().map(|p| (p.id, p)).collect();
        let data = window
            .into_iter()
            .filter_map(|post_id| by_id.get(&post_id).cloned())
            .collect();

        Ok(Page { total, data })
    }

    /// Popular users the viewer does not follow: ranked by follower count
    /// descending (capped per pool), padded with zero-follower users up to
    /// the combined cap.
    async fn popular_user_ids(&self, scope: &ViewerScope) -> ServiceResult<Vec<Uuid>> {
        let pool_cap = self.config().suggestion_pool_cap;
        let combined_cap = self.config().popular_users_cap;
        let excluded = &scope.circle;

        // over-fetch so the exclusion filter cannot starve the pool
        let fetch = (pool_cap + excluded.len()) as i64;
        let ranked = self.store().top_followed_users(fetch).await?;
        let mut popular: Vec<Uuid> = ranked
            .into_iter()
            .map(|(user_id, _)| user_id)
            .filter(|user_id| !excluded.contains(user_id))
            .take(pool_cap)
            .collect();

        if popular.len() < combined_cap {
            let fetch = (combined_cap + excluded.len()) as i64;
            let unfollowed = self.store().user_ids_without_followers(fetch).await?;
            for user_id in unfollowed {
                if popular.len() >= combined_cap {
                    break;
                }
                if !excluded.contains(&user_id) {
                    popular.push(user_id);
                }
            }
        }

        Ok(popular)
    }
}
