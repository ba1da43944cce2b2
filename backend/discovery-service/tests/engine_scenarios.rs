//! End-to-end engine scenarios over the in-memory store.

use chrono::{Duration, Utc};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use uuid::Uuid;

use discovery_service::domain::models::{
    Comment, CommentLike, Favorite, Follow, Post, PostLike, User,
};
use discovery_service::{
    Deadline, DiscoveryService, EngineConfig, MemoryGraphStore, ServiceError,
};

fn uid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn service(store: &Arc<MemoryGraphStore>) -> DiscoveryService<MemoryGraphStore> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    DiscoveryService::new(store.clone(), EngineConfig::default())
}

fn add_user(store: &MemoryGraphStore, n: u128) {
    store.add_user(User {
        id: uid(n),
        username: format!("user{n}"),
        first_name: "Test".to_string(),
        last_name: format!("U{n}"),
        avatar_url: None,
    });
}

fn add_follow(store: &MemoryGraphStore, id: u128, follower: u128, followee: u128, hours_ago: i64) {
    store.add_follow(Follow {
        id: uid(id),
        follower_id: uid(follower),
        followee_id: uid(followee),
        created_at: Utc::now() - Duration::hours(hours_ago),
    });
}

fn add_post(store: &MemoryGraphStore, id: u128, owner: u128, hours_ago: i64) {
    store.add_post(Post {
        id: uid(id),
        owner_id: uid(owner),
        title: None,
        photo_url: format!("/storage/posts/{id}.jpg"),
        video_url: None,
        created_at: Utc::now() - Duration::hours(hours_ago),
    });
}

fn add_like(store: &MemoryGraphStore, id: u128, post: u128, user: u128, hours_ago: i64) {
    store.add_post_like(PostLike {
        id: uid(id),
        post_id: uid(post),
        user_id: uid(user),
        created_at: Utc::now() - Duration::hours(hours_ago),
    });
}

fn add_comment(store: &MemoryGraphStore, id: u128, post: u128, author: u128, hours_ago: i64) {
    store.add_comment(Comment {
        id: uid(id),
        post_id: uid(post),
        author_id: uid(author),
        text: format!("comment {id}"),
        created_at: Utc::now() - Duration::hours(hours_ago),
    });
}

fn add_comment_like(store: &MemoryGraphStore, id: u128, comment: u128, user: u128, hours_ago: i64) {
    store.add_comment_like(CommentLike {
        id: uid(id),
        comment_id: uid(comment),
        user_id: uid(user),
        created_at: Utc::now() - Duration::hours(hours_ago),
    });
}

fn add_favorite(store: &MemoryGraphStore, id: u128, post: u128, user: u128, hours_ago: i64) {
    store.add_favorite(Favorite {
        id: uid(id),
        post_id: uid(post),
        user_id: uid(user),
        created_at: Utc::now() - Duration::hours(hours_ago),
    });
}

// ---------------------------------------------------------------------------
// suggested users
// ---------------------------------------------------------------------------

/// V follows A and B; A follows C and D; B follows D and E.
/// Second-degree weights: D=2, C=1, E=1.
fn second_degree_fixture() -> Arc<MemoryGraphStore> {
    let store = Arc::new(MemoryGraphStore::new());
    for n in 1..=6 {
        add_user(&store, n);
    }
    add_follow(&store, 100, 1, 2, 100); // V -> A
    add_follow(&store, 101, 1, 3, 100); // V -> B
    add_follow(&store, 102, 2, 4, 50); // A -> C
    add_follow(&store, 103, 2, 5, 10); // A -> D
    add_follow(&store, 104, 3, 5, 5); // B -> D (most recent edge onto D)
    add_follow(&store, 105, 3, 6, 20); // B -> E
    store
}

#[tokio::test]
async fn second_degree_weights_rank_shared_followee_first() {
    let store = second_degree_fixture();
    let svc = service(&store);

    let suggested = svc
        .get_suggested_users(uid(1), &Deadline::none())
        .await
        .unwrap();

    let ids: Vec<Uuid> = suggested.iter().map(|s| s.user.id).collect();
    // D (weight 2) first; C and E tie at 1 and break by id ascending
    assert_eq!(ids, vec![uid(5), uid(4), uid(6)]);

    let d = &suggested[0];
    assert_eq!(d.followed_count, 2);
    assert_eq!(
        d.latest_follower.as_ref().map(|u| u.id),
        Some(uid(3)),
        "B's edge onto D is the most recent"
    );

    let c = &suggested[1];
    assert_eq!(c.followed_count, 1);
    assert_eq!(c.latest_follower.as_ref().map(|u| u.id), Some(uid(2)));
}

#[tokio::test]
async fn viewer_and_followees_never_suggested() {
    let store = second_degree_fixture();
    let svc = service(&store);

    let suggested = svc
        .get_suggested_users(uid(1), &Deadline::none())
        .await
        .unwrap();

    for row in &suggested {
        assert_ne!(row.user.id, uid(1), "viewer must not be suggested");
        assert_ne!(row.user.id, uid(2), "followee must not be suggested");
        assert_ne!(row.user.id, uid(3), "followee must not be suggested");
    }
}

#[tokio::test]
async fn self_follow_does_not_suggest_viewer() {
    let store = second_degree_fixture();
    add_follow(&store, 106, 1, 1, 1); // self-follow created upstream
    let svc = service(&store);

    let suggested = svc
        .get_suggested_users(uid(1), &Deadline::none())
        .await
        .unwrap();

    assert!(suggested.iter().all(|s| s.user.id != uid(1)));
}

#[tokio::test]
async fn co_like_and_co_comment_signals_combine() {
    let store = Arc::new(MemoryGraphStore::new());
    for n in [1, 2, 7, 8, 9] {
        add_user(&store, n);
    }
    add_follow(&store, 100, 1, 2, 100); // V -> A
    add_follow(&store, 101, 2, 9, 50); // A -> Y: signal A weight 1 for Y
    add_post(&store, 200, 7, 80); // P, owned by a stranger
    add_like(&store, 300, 200, 2, 70); // A likes P, so P enters the circle set
    add_like(&store, 301, 200, 8, 60); // X co-likes P: weight 1
    add_comment(&store, 400, 200, 8, 50); // X comments P: weight 1
    add_comment(&store, 401, 200, 8, 40); // repeat comment on P counts once
    let svc = service(&store);

    let suggested = svc
        .get_suggested_users(uid(1), &Deadline::none())
        .await
        .unwrap();

    let ids: Vec<Uuid> = suggested.iter().map(|s| s.user.id).collect();
    // X scores 2 (co-like + co-comment), Y scores 1 (second-degree)
    assert_eq!(ids, vec![uid(8), uid(9)]);
}

#[tokio::test]
async fn suggestion_cap_is_enforced() {
    let store = second_degree_fixture();
    let config = EngineConfig {
        suggested_users_cap: 2,
        ..EngineConfig::default()
    };
    let svc = DiscoveryService::new(store.clone(), config);

    let suggested = svc
        .get_suggested_users(uid(1), &Deadline::none())
        .await
        .unwrap();

    assert_eq!(suggested.len(), 2);
    assert_eq!(suggested[0].user.id, uid(5), "highest score survives the cap");
}

#[tokio::test]
async fn suggested_users_are_idempotent() {
    let store = second_degree_fixture();
    let svc = service(&store);

    let first = svc
        .get_suggested_users(uid(1), &Deadline::none())
        .await
        .unwrap();
    let second = svc
        .get_suggested_users(uid(1), &Deadline::none())
        .await
        .unwrap();

    let ids = |rows: &[discovery_service::domain::views::SuggestedUser]| {
        rows.iter().map(|r| r.user.id).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
}

// ---------------------------------------------------------------------------
// suggested posts
// ---------------------------------------------------------------------------

/// V follows A. A engages with a stranger Z's posts; U is an unfollowed user
/// with a post of their own.
fn suggested_posts_fixture() -> Arc<MemoryGraphStore> {
    let store = Arc::new(MemoryGraphStore::new());
    for n in [1, 2, 7, 8] {
        add_user(&store, n); // V, A, Z, U
    }
    add_follow(&store, 100, 1, 2, 100); // V -> A
    add_post(&store, 101, 7, 50); // P1, Z's older post
    add_post(&store, 102, 7, 10); // P2, Z's newest post
    add_post(&store, 103, 2, 5); // P3, A's own post (owned by the viewer's graph)
    add_post(&store, 104, 8, 20); // P4, U's post
    add_like(&store, 300, 101, 2, 40); // A likes P1 -> like pool
    add_like(&store, 301, 103, 2, 4); // A likes their own post: excluded as owned
    add_favorite(&store, 500, 101, 2, 30); // A favorites P1 and P2 -> favorite pool
    add_favorite(&store, 501, 102, 2, 30);
    add_comment(&store, 400, 102, 2, 20); // A comments P2 -> comment pool
    store
}

#[tokio::test]
async fn post_pools_union_in_discovery_order() {
    let store = suggested_posts_fixture();
    let svc = service(&store);

    let page = svc
        .get_suggested_posts(uid(1), 0, 10, &Deadline::none())
        .await
        .unwrap();

    let ids: Vec<Uuid> = page.data.iter().map(|p| p.id).collect();
    // P1 holds its like-pool position even though it reappears in the
    // favorite pool; P2 follows from the favorite pool; the popular-user
    // fallback appends U's post (Z's newest is already present).
    assert_eq!(ids, vec![uid(101), uid(102), uid(104)]);
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn owned_posts_are_never_suggested() {
    let store = suggested_posts_fixture();
    let svc = service(&store);

    let page = svc
        .get_suggested_posts(uid(1), 0, 10, &Deadline::none())
        .await
        .unwrap();

    assert!(
        page.data.iter().all(|p| p.id != uid(103)),
        "a followee's own post is already reachable and must not be suggested"
    );
}

#[tokio::test]
async fn popular_fallback_orders_by_follower_count() {
    let store = Arc::new(MemoryGraphStore::new());
    for n in [1, 2, 3, 4, 5] {
        add_user(&store, n);
    }
    // W1 (user 2) has two followers, W2 (user 3) has one; the viewer follows
    // nobody, so every candidate comes from the fallback.
    add_follow(&store, 100, 4, 2, 10);
    add_follow(&store, 101, 5, 2, 20);
    add_follow(&store, 102, 4, 3, 30);
    add_post(&store, 200, 2, 10);
    add_post(&store, 201, 2, 50); // older, must not be picked
    add_post(&store, 202, 3, 10);
    add_post(&store, 203, 4, 10); // zero-follower user's post
    let svc = service(&store);

    let page = svc
        .get_suggested_posts(uid(1), 0, 10, &Deadline::none())
        .await
        .unwrap();

    let ids: Vec<Uuid> = page.data.iter().map(|p| p.id).collect();
    // ranked users first (W1 then W2, by follower count), then zero-follower
    // users in id order (user 4; user 5 has no post)
    assert_eq!(ids, vec![uid(200), uid(202), uid(203)]);
}

#[tokio::test]
async fn suggested_posts_total_is_slice_invariant() {
    let store = suggested_posts_fixture();
    let svc = service(&store);

    let full = svc
        .get_suggested_posts(uid(1), 0, 10, &Deadline::none())
        .await
        .unwrap();
    let window = svc
        .get_suggested_posts(uid(1), 1, 1, &Deadline::none())
        .await
        .unwrap();

    assert_eq!(full.total, window.total);
    assert_eq!(window.data.len(), 1);
    assert_eq!(window.data[0].id, full.data[1].id);
}

// ---------------------------------------------------------------------------
// home feed
// ---------------------------------------------------------------------------

fn feed_fixture() -> Arc<MemoryGraphStore> {
    let store = Arc::new(MemoryGraphStore::new());
    for n in [1, 2, 7] {
        add_user(&store, n); // V, A, stranger Z
    }
    add_follow(&store, 100, 1, 2, 100); // V -> A
    add_post(&store, 101, 1, 50); // V's own post, no engagement at all
    add_post(&store, 102, 2, 10); // A's post
    add_post(&store, 103, 7, 5); // stranger's post, not in the feed
    add_like(&store, 300, 102, 1, 2); // V likes A's post
    add_like(&store, 301, 102, 2, 1); // A likes own post, most recent like
    add_favorite(&store, 500, 102, 1, 2); // V favorites A's post
    add_comment(&store, 400, 102, 2, 3);
    store
}

#[tokio::test]
async fn feed_always_contains_viewers_own_posts() {
    let store = feed_fixture();
    let svc = service(&store);

    let page = svc
        .get_followed_users_feed(uid(1), 0, 10, &Deadline::none())
        .await
        .unwrap();

    let ids: Vec<Uuid> = page.data.iter().map(|p| p.post.id).collect();
    assert_eq!(
        ids,
        vec![uid(102), uid(101)],
        "newest first, and the viewer's engagement-free post is present"
    );
    assert!(!ids.contains(&uid(103)), "stranger posts stay out");
}

#[tokio::test]
async fn feed_aggregates_match_engagement() {
    let store = feed_fixture();
    let svc = service(&store);

    let page = svc
        .get_followed_users_feed(uid(1), 0, 10, &Deadline::none())
        .await
        .unwrap();

    let a_post = page.data.iter().find(|p| p.post.id == uid(102)).unwrap();
    assert_eq!(a_post.likes_count, 2);
    assert!(a_post.liked);
    assert!(a_post.favorite);
    assert_eq!(a_post.comments_count, 1);
    assert_eq!(
        a_post.latest_like_user.as_ref().map(|u| u.id),
        Some(uid(2)),
        "the most recently created like wins"
    );
    assert_eq!(a_post.owner.id, uid(2));

    let own_post = page.data.iter().find(|p| p.post.id == uid(101)).unwrap();
    assert_eq!(own_post.likes_count, 0);
    assert!(!own_post.liked);
    assert!(!own_post.favorite);
    assert!(own_post.latest_like_user.is_none());
}

#[tokio::test]
async fn feed_pagination_law_holds() {
    let store = feed_fixture();
    let svc = service(&store);

    for offset in 0..4 {
        for limit in 0..4 {
            let page = svc
                .get_followed_users_feed(uid(1), offset, limit, &Deadline::none())
                .await
                .unwrap();
            assert_eq!(page.total, 2);
            assert_eq!(
                page.data.len(),
                limit.min(2usize.saturating_sub(offset)),
                "offset={offset} limit={limit}"
            );
        }
    }
}

#[tokio::test]
async fn feed_is_idempotent() {
    let store = feed_fixture();
    let svc = service(&store);

    let first = svc
        .get_followed_users_feed(uid(1), 0, 10, &Deadline::none())
        .await
        .unwrap();
    let second = svc
        .get_followed_users_feed(uid(1), 0, 10, &Deadline::none())
        .await
        .unwrap();

    let ids = |page: &discovery_service::Page<discovery_service::domain::views::FeedPost>| {
        page.data.iter().map(|p| p.post.id).collect::<Vec<_>>()
    };
    assert_eq!(first.total, second.total);
    assert_eq!(ids(&first), ids(&second));
}

// ---------------------------------------------------------------------------
// notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn follow_notifications_respect_window_and_flag_followbacks() {
    let store = Arc::new(MemoryGraphStore::new());
    for n in [1, 3, 4, 5] {
        add_user(&store, n);
    }
    add_follow(&store, 100, 1, 3, 24 * 60); // V follows B back
    add_follow(&store, 101, 3, 1, 24 * 30); // B -> V, one month ago
    add_follow(&store, 102, 4, 1, 24 * 150); // C -> V, five months ago: outside window
    add_follow(&store, 103, 5, 1, 24 * 10); // D -> V, ten days ago
    let svc = service(&store);

    let page = svc
        .get_follow_notifications(uid(1), 0, 10, &Deadline::none())
        .await
        .unwrap();

    assert_eq!(page.total, 2, "the five-month-old edge is outside the window");
    assert_eq!(page.data[0].follower.id, uid(5), "newest first");
    assert!(!page.data[0].following_back);
    assert_eq!(page.data[1].follower.id, uid(3));
    assert!(page.data[1].following_back);
}

#[tokio::test]
async fn post_like_notifications_exclude_self_and_stale_likes() {
    let store = Arc::new(MemoryGraphStore::new());
    for n in [1, 2, 7] {
        add_user(&store, n);
    }
    add_post(&store, 101, 1, 24 * 300);
    add_like(&store, 300, 101, 2, 24 * 20); // included
    add_like(&store, 301, 101, 1, 24 * 5); // self-like, excluded
    add_like(&store, 302, 101, 7, 24 * 200); // outside window
    let svc = service(&store);

    let page = svc
        .get_post_like_notifications(uid(1), 0, 10, &Deadline::none())
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].user.id, uid(2));
    assert_eq!(page.data[0].post.id, uid(101));
}

#[tokio::test]
async fn post_comment_notifications_are_paginated_and_enriched() {
    let store = Arc::new(MemoryGraphStore::new());
    for n in [1, 2, 3] {
        add_user(&store, n);
    }
    add_post(&store, 101, 1, 24 * 90);
    add_comment(&store, 400, 101, 2, 24 * 3);
    add_comment(&store, 401, 101, 3, 24 * 1);
    add_comment(&store, 402, 101, 1, 24 * 2); // self-comment, excluded
    let svc = service(&store);

    let page = svc
        .get_post_comment_notifications(uid(1), 0, 1, &Deadline::none())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].user.id, uid(3), "newest comment first");
    assert_eq!(page.data[0].post.id, uid(101));
    assert!(!page.data[0].text.is_empty());
}

// ---------------------------------------------------------------------------
// per-post engagement reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn comments_for_post_are_oldest_first_with_like_aggregates() {
    let store = Arc::new(MemoryGraphStore::new());
    for n in [1, 2, 3] {
        add_user(&store, n);
    }
    add_post(&store, 101, 2, 50);
    add_comment(&store, 400, 101, 2, 5);
    add_comment(&store, 401, 101, 3, 1);
    add_comment_like(&store, 600, 400, 1, 1); // viewer likes the older comment
    add_comment_like(&store, 601, 400, 2, 1);
    let svc = service(&store);

    let page = svc
        .get_comments_for_post(uid(1), uid(101), 0, 10, &Deadline::none())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.data[0].comment.id, uid(400), "thread reads oldest first");
    assert_eq!(page.data[0].likes_count, 2);
    assert!(page.data[0].liked);
    assert_eq!(page.data[0].user.id, uid(2));
    assert_eq!(page.data[1].likes_count, 0);
    assert!(!page.data[1].liked);
}

#[tokio::test]
async fn users_who_liked_post_carry_following_flag() {
    let store = Arc::new(MemoryGraphStore::new());
    for n in [1, 2, 3] {
        add_user(&store, n);
    }
    add_follow(&store, 100, 1, 2, 100); // V follows A
    add_post(&store, 101, 3, 50);
    add_like(&store, 300, 101, 2, 2);
    add_like(&store, 301, 101, 3, 1);
    let svc = service(&store);

    let page = svc
        .get_users_who_liked_post(uid(1), uid(101), 0, 10, &Deadline::none())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.data[0].user.id, uid(3), "most recent liker first");
    assert!(!page.data[0].following);
    assert_eq!(page.data[1].user.id, uid(2));
    assert!(page.data[1].following);
}

// ---------------------------------------------------------------------------
// errors and deadlines
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_viewer_is_a_validation_error() {
    let store = Arc::new(MemoryGraphStore::new());
    let svc = service(&store);

    let err = svc
        .get_suggested_users(uid(99), &Deadline::none())
        .await
        .unwrap_err();

    match err {
        ServiceError::Validation { field, .. } => assert_eq!(field, "viewer_id"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_post_and_comment_are_validation_errors() {
    let store = Arc::new(MemoryGraphStore::new());
    add_user(&store, 1);
    let svc = service(&store);

    let err = svc
        .get_comments_for_post(uid(1), uid(99), 0, 10, &Deadline::none())
        .await
        .unwrap_err();
    match err {
        ServiceError::Validation { field, .. } => assert_eq!(field, "post_id"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let err = svc
        .get_users_who_liked_comment(uid(1), uid(98), 0, 10, &Deadline::none())
        .await
        .unwrap_err();
    match err {
        ServiceError::Validation { field, .. } => assert_eq!(field, "comment_id"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn expired_deadline_aborts_without_partial_output() {
    let store = second_degree_fixture();
    let svc = service(&store);

    let err = svc
        .get_suggested_users(uid(1), &Deadline::after(StdDuration::ZERO))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::DeadlineExceeded));
}

#[tokio::test]
async fn views_serialize_camel_case() {
    let store = feed_fixture();
    let svc = service(&store);

    let page = svc
        .get_followed_users_feed(uid(1), 0, 1, &Deadline::none())
        .await
        .unwrap();
    let json = serde_json::to_value(&page.data[0]).unwrap();

    assert!(json.get("likesCount").is_some());
    assert!(json.get("photoUrl").is_some(), "post fields are flattened");
    assert!(json.get("latestLikeUser").is_some());
}
