//! Suggestion Scorer - users.
//!
//! Combines three weighted signals over the viewer's second-degree
//! neighborhood into one additively scored candidate list:
//!
//! - second-degree follow: users the viewer's followees follow
//! - co-like: users who liked posts the viewer's circle liked
//! - co-comment: users who commented on those same posts
//!
//! The viewer and their followees are excluded from every pool. Ranking is
//! combined score descending, candidate id ascending on ties.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use crate::deadline::Deadline;
use crate::domain::models::Follow;
use crate::domain::views::SuggestedUser;
use crate::error::ServiceResult;
use crate::services::{enrichment, DiscoveryService, ViewerScope};
use crate::store::GraphStore;

/// Per-candidate annotation derived from the second-degree edge set.
#[derive(Default)]
struct FollowerStats {
    followed_count: i64,
    latest: Option<(DateTime<Utc>, Uuid)>,
}

impl FollowerStats {
    fn record(&mut self, edge: &Follow) {
        self.followed_count += 1;
        let newer = match self.latest {
            None => true,
            Some((at, _)) => edge.created_at > at,
        };
        if newer {
            self.latest = Some((edge.created_at, edge.follower_id));
        }
    }
}

impl<S: GraphStore + ?Sized> DiscoveryService<S> {
    /// Ranked user suggestions for `viewer_id`, capped to the configured
    /// suggestion size.
    pub async fn get_suggested_users(
        &self,
        viewer_id: Uuid,
        deadline: &Deadline,
    ) -> ServiceResult<Vec<SuggestedUser>> {
        deadline.check()?;
        self.ensure_viewer(viewer_id).await?;

        let scope = ViewerScope::collect(self.store(), viewer_id).await?;
        let followees = scope.followee_ids();

        deadline.check()?;
        // the circle's likes define the co-engagement post set
        let owner_ids = scope.owner_ids();
        let (second_degree, circle_likes) = tokio::try_join!(
            self.store().follows_by_followers(&followees),
            self.store().post_likes_by_users(&owner_ids),
        )?;

        let mut liked_post_ids: Vec<Uuid> =
            circle_likes.iter().map(|like| like.post_id).collect();
        liked_post_ids.sort();
        liked_post_ids.dedup();

        deadline.check()?;
        let (co_likes, co_comments) = tokio::try_join!(
            self.store().post_likes_on_posts(&liked_post_ids),
            self.store().comments_on_posts(&liked_post_ids),
        )?;

        let excluded = &scope.circle;
        let mut scores: HashMap<Uuid, i64> = HashMap::new();
        let mut stats: HashMap<Uuid, FollowerStats> = HashMap::new();

        // Signal A: one point per distinct followee following the candidate.
        // Edges are unique per (follower, followee) pair upstream, so each
        // edge is one distinct followee.
        for edge in &second_degree {
            if excluded.contains(&edge.followee_id) {
                continue;
            }
            *scores.entry(edge.followee_id).or_insert(0) += 1;
            stats.entry(edge.followee_id).or_default().record(edge);
        }

        // Signal B: one point per distinct circle-liked post the candidate
        // liked. Likes are unique per (post, user) upstream.
        for like in &co_likes {
            if excluded.contains(&like.user_id) {
                continue;
            }
            *scores.entry(like.user_id).or_insert(0) += 1;
        }

        // Signal C: one point per distinct circle-liked post the candidate
        // commented on; repeat comments on the same post count once.
        let mut commented: HashSet<(Uuid, Uuid)> = HashSet::new();
        for comment in &co_comments {
            if excluded.contains(&comment.author_id) {
                continue;
            }
            if commented.insert((comment.author_id, comment.post_id)) {
                *scores.entry(comment.author_id).or_insert(0) += 1;
            }
        }

        // rank: combined score desc, candidate id asc
        let mut ranked: Vec<(Uuid, i64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(self.config().suggested_users_cap);

        debug!(
            viewer = %viewer_id,
            candidates = ranked.len(),
            "Computed user suggestions"
        );

        // enrich candidates and their latest followers in one batch
        deadline.check()?;
        let mut wanted: Vec<Uuid> = ranked.iter().map(|(id, _)| *id).collect();
        wanted.extend(
            ranked
                .iter()
                .filter_map(|(id, _)| stats.get(id))
                .filter_map(|s| s.latest.map(|(_, follower)| follower)),
        );
        let users = enrichment::user_map(self.store(), wanted).await?;

        let suggestions = ranked
            .into_iter()
            .filter_map(|(candidate_id, _)| {
                let user = users.get(&candidate_id)?.clone();
                let candidate_stats = stats.get(&candidate_id);
                let latest_follower = candidate_stats
                    .and_then(|s| s.latest)
                    .and_then(|(_, follower_id)| users.get(&follower_id))
                    .cloned();
                Some(SuggestedUser {
                    user,
                    latest_follower,
                    followed_count: candidate_stats.map(|s| s.followed_count).unwrap_or(0),
                })
            })
            .collect();

        Ok(suggestions)
    }
}
