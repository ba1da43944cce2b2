//! Denormalized result rows returned by the engine.
//!
//! Each view carries full related entities where the underlying record only
//! held a foreign id, so callers never need a second round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{Comment, Post, User};

/// A ranked user-suggestion row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedUser {
    pub user: User,
    /// The most recently created followee-of-viewer who follows this
    /// candidate, if any.
    pub latest_follower: Option<User>,
    /// Count of distinct followees of the viewer who follow this candidate.
    pub followed_count: i64,
}

/// A home-feed row: the post plus its denormalized aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    #[serde(flatten)]
    pub post: Post,
    pub owner: User,
    pub comments_count: i64,
    pub likes_count: i64,
    /// Whether the viewer has liked this post.
    pub liked: bool,
    /// Whether the viewer has favorited this post.
    pub favorite: bool,
    /// The user behind the most recently created like on this post.
    pub latest_like_user: Option<User>,
}

/// Someone followed the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowNotification {
    pub id: Uuid,
    pub follower: User,
    /// Whether the viewer currently follows this follower back.
    pub following_back: bool,
    pub created_at: DateTime<Utc>,
}

/// Someone liked one of the viewer's posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLikeNotification {
    pub id: Uuid,
    pub user: User,
    pub post: Post,
    pub created_at: DateTime<Utc>,
}

/// Someone commented on one of the viewer's posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentNotification {
    pub id: Uuid,
    pub user: User,
    pub post: Post,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A comment enriched with its author and like aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithLikes {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
    pub likes_count: i64,
    /// Whether the viewer has liked this comment.
    pub liked: bool,
}

/// A user who engaged with a post or comment, annotated with whether the
/// viewer already follows them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagingUser {
    #[serde(flatten)]
    pub user: User,
    pub following: bool,
}
