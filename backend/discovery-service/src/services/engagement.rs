//! Per-post engagement reads: enriched comment lists and liker lists.
//!
//! These share the engine's envelope and enrichment rules but are scoped to
//! a single post or comment rather than the viewer's whole graph.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::deadline::Deadline;
use crate::domain::models::Comment;
use crate::domain::views::{CommentWithLikes, EngagingUser};
use crate::error::ServiceResult;
use crate::services::{enrichment, pagination, DiscoveryService, Page};
use crate::store::GraphStore;

/// Comment-thread ordering: oldest first, id ascending on ties.
fn oldest_first(a: &Comment, b: &Comment) -> std::cmp::Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

impl<S: GraphStore + ?Sized> DiscoveryService<S> {
    /// The comment thread of a post, oldest first, each comment enriched
    /// with its author and like aggregates.
    pub async fn get_comments_for_post(
        &self,
        viewer_id: Uuid,
        post_id: Uuid,
        offset: usize,
        limit: usize,
        deadline: &Deadline,
    ) -> ServiceResult<Page<CommentWithLikes>> {
        deadline.check()?;
        self.ensure_viewer(viewer_id).await?;
        self.ensure_post(post_id).await?;

        deadline.check()?;
        let mut comments = self.store().comments_on_posts(&[post_id]).await?;
        comments.sort_by(oldest_first);
        let (total, window) = pagination::slice(comments, offset, limit);
        let window_ids: Vec<Uuid> = window.iter().map(|c| c.id).collect();

        deadline.check()?;
        let comment_likes = self.store().comment_likes_on_comments(&window_ids).await?;
        let mut likes_count: HashMap<Uuid, i64> = HashMap::new();
        let mut liked: HashSet<Uuid> = HashSet::new();
        for like in &comment_likes {
            *likes_count.entry(like.comment_id).or_insert(0) += 1;
            if like.user_id == viewer_id {
                liked.insert(like.comment_id);
            }
        }

        deadline.check()?;
        let users =
            enrichment::user_map(self.store(), window.iter().map(|c| c.author_id)).await?;
        let data = enrichment::attach(
            window,
            &users,
            |comment| comment.author_id,
            |comment, user| CommentWithLikes {
                likes_count: likes_count.get(&comment.id).copied().unwrap_or(0),
                liked: liked.contains(&comment.id),
                comment,
                user,
            },
        );

        Ok(Page { total, data })
    }

    /// Users who liked a post, most recent first, annotated with whether the
    /// viewer follows them.
    pub async fn get_users_who_liked_post(
        &self,
        viewer_id: Uuid,
        post_id: Uuid,
        offset: usize,
        limit: usize,
        deadline: &Deadline,
    ) -> ServiceResult<Page<EngagingUser>> {
        deadline.check()?;
        self.ensure_viewer(viewer_id).await?;
        self.ensure_post(post_id).await?;

        deadline.check()?;
        let post_ids = [post_id];
        let (mut likes, followees) = tokio::try_join!(
            self.store().post_likes_on_posts(&post_ids),
            self.store().followee_ids(viewer_id),
        )?;
        likes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let (total, window) = pagination::slice(likes, offset, limit);

        deadline.check()?;
        let followees: HashSet<Uuid> = followees.into_iter().collect();
        let users = enrichment::user_map(self.store(), window.iter().map(|l| l.user_id)).await?;
        let data = enrichment::attach(
            window,
            &users,
            |like| like.user_id,
            |like, user| EngagingUser {
                following: followees.contains(&like.user_id),
                user,
            },
        );

        Ok(Page { total, data })
    }

    /// Users who liked a comment, most recent first, annotated with whether
    /// the viewer follows them.
    pub async fn get_users_who_liked_comment(
        &self,
        viewer_id: Uuid,
        comment_id: Uuid,
        offset: usize,
        limit: usize,
        deadline: &Deadline,
    ) -> ServiceResult<Page<EngagingUser>> {
        deadline.check()?;
        self.ensure_viewer(viewer_id).await?;
        self.ensure_comment(comment_id).await?;

        deadline.check()?;
        let comment_ids = [comment_id];
        let (mut likes, followees) = tokio::try_join!(
            self.store().comment_likes_on_comments(&comment_ids),
            self.store().followee_ids(viewer_id),
        )?;
        likes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let (total, window) = pagination::slice(likes, offset, limit);

        deadline.check()?;
        let followees: HashSet<Uuid> = followees.into_iter().collect();
        let users = enrichment::user_map(self.store(), window.iter().map(|l| l.user_id)).await?;
        let data = enrichment::attach(
            window,
            &users,
            |like| like.user_id,
            |like, user| EngagingUser {
                following: followees.contains(&like.user_id),
                user,
            },
        );

        Ok(Page { total, data })
    }
}
