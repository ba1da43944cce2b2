//! Notification Feed Builder.
//!
//! Three independent denormalized feeds, each windowed to the trailing
//! configured number of days, newest first, paginated with the standard
//! envelope.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::deadline::Deadline;
use crate::domain::views::{FollowNotification, PostCommentNotification, PostLikeNotification};
use crate::error::ServiceResult;
use crate::services::{enrichment, pagination, DiscoveryService, Page};
use crate::store::GraphStore;

impl<S: GraphStore + ?Sized> DiscoveryService<S> {
    fn window_start(&self) -> DateTime<Utc> {
        Utc::now() - Duration::days(self.config().notification_window_days)
    }

    /// Users who followed the viewer within the window, annotated with
    /// whether the viewer follows them back.
    pub async fn get_follow_notifications(
        &self,
        viewer_id: Uuid,
        offset: usize,
        limit: usize,
        deadline: &Deadline,
    ) -> ServiceResult<Page<FollowNotification>> {
        deadline.check()?;
        self.ensure_viewer(viewer_id).await?;

        deadline.check()?;
        let (mut edges, followees) = tokio::try_join!(
            self.store().follows_to_user_since(viewer_id, self.window_start()),
            self.store().followee_ids(viewer_id),
        )?;
        let followees: HashSet<Uuid> = followees.into_iter().collect();

        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let (total, window) = pagination::slice(edges, offset, limit);

        deadline.check()?;
        let users =
            enrichment::user_map(self.store(), window.iter().map(|e| e.follower_id)).await?;
        let data = enrichment::attach(
            window,
            &users,
            |edge| edge.follower_id,
            |edge, follower| FollowNotification {
                id: edge.id,
                following_back: followees.contains(&edge.follower_id),
                follower,
                created_at: edge.created_at,
            },
        );

        Ok(Page { total, data })
    }

    /// Likes on the viewer's posts within the window, self-likes excluded.
    pub async fn get_post_like_notifications(
        &self,
        viewer_id: Uuid,
        offset: usize,
        limit: usize,
        deadline: &Deadline,
    ) -> ServiceResult<Page<PostLikeNotification>> {
        deadline.check()?;
        self.ensure_viewer(viewer_id).await?;

        deadline.check()?;
        let own_posts = self.store().post_ids_by_owners(&[viewer_id]).await?;

        deadline.check()?;
        let mut likes = self
            .store()
            .post_likes_on_posts_since(&own_posts, self.window_start())
            .await?;
        likes.retain(|like| like.user_id != viewer_id);
        likes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let (total, window) = pagination::slice(likes, offset, limit);

        deadline.check()?;
        let (users, posts) = tokio::try_join!(
            enrichment::user_map(self.store(), window.iter().map(|l| l.user_id)),
            enrichment::post_map(self.store(), window.iter().map(|l| l.post_id)),
        )?;

        let data = window
            .into_iter()
            .filter_map(|like| {
                let user = users.get(&like.user_id)?.clone();
                let post = posts.get(&like.post_id)?.clone();
                Some(PostLikeNotification {
                    id: like.id,
                    user,
                    post,
                    created_at: like.created_at,
                })
            })
            .collect();

        Ok(Page { total, data })
    }

    /// Comments on the viewer's posts within the window, self-comments
    /// excluded.
    pub async fn get_post_comment_notifications(
        &self,
        viewer_id: Uuid,
        offset: usize,
        limit: usize,
        deadline: &Deadline,
    ) -> ServiceResult<Page<PostCommentNotification>> {
        deadline.check()?;
        self.ensure_viewer(viewer_id).await?;

        deadline.check()?;
        let own_posts = self.store().post_ids_by_owners(&[viewer_id]).await?;

        deadline.check()?;
        let mut comments = self
            .store()
            .comments_on_posts_since(&own_posts, self.window_start())
            .await?;
        comments.retain(|comment| comment.author_id != viewer_id);
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let (total, window) = pagination::slice(comments, offset, limit);

        deadline.check()?;
        let (users, posts) = tokio::try_join!(
            enrichment::user_map(self.store(), window.iter().map(|c| c.author_id)),
            enrichment::post_map(self.store(), window.iter().map(|c| c.post_id)),
        )?;

        let data = window
            .into_iter()
            .filter_map(|comment| {
                let user = users.get(&comment.author_id)?.clone();
                let post = posts.get(&comment.post_id)?.clone();
                Some(PostCommentNotification {
                    id: comment.id,
                    user,
                    post,
                    text: comment.text,
                    created_at: comment.created_at,
                })
            })
            .collect();

        Ok(Page { total, data })
    }
}
