mod common;

#[tokio::test]
async fn test_feed_contains_only_friend_posts() {
    let app = require_app!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let carol = app.register_user("carol").await;

    app.befriend(&alice, &bob).await;
    app.create_post(&alice.token, "hello").await;
    app.create_post(&carol.token, "carol's post").await;

    // Bob follows alice's posts through the friendship; carol is invisible.
    let feed = app.get_json(Some(&bob.token), "/api/feed").await;
    let feed = feed.as_array().expect("array");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["content"], "hello");
    assert_eq!(feed[0]["author_id"].as_i64(), Some(alice.user_id));
    assert_eq!(feed[0]["author_name"], "alice");
    assert_eq!(feed[0]["likes_count"].as_i64(), Some(0));
    assert_eq!(feed[0]["is_liked_by_user"].as_bool(), Some(false));

    // No accepted friends means an empty feed, not global visibility.
    let feed = app.get_json(Some(&carol.token), "/api/feed").await;
    assert!(feed.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn test_like_annotations_are_per_viewer() {
    let app = require_app!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let carol = app.register_user("carol").await;

    app.befriend(&alice, &bob).await;
    app.befriend(&alice, &carol).await;
    let post_id = app.create_post(&alice.token, "hello").await;

    let resp = app.toggle_like(&bob.token, post_id).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await.expect("body");
    assert_eq!(body["message"], "Post liked");

    // Bob sees his own like; carol sees the count but no personal flag set.
    let feed = app.get_json(Some(&bob.token), "/api/feed").await;
    let feed = feed.as_array().expect("array");
    assert_eq!(feed[0]["likes_count"].as_i64(), Some(1));
    assert_eq!(feed[0]["is_liked_by_user"].as_bool(), Some(true));

    let feed = app.get_json(Some(&carol.token), "/api/feed").await;
    let feed = feed.as_array().expect("array");
    assert_eq!(feed[0]["likes_count"].as_i64(), Some(1));
    assert_eq!(feed[0]["is_liked_by_user"].as_bool(), Some(false));

    // Toggling again removes the like.
    let resp = app.toggle_like(&bob.token, post_id).await;
    let body: serde_json::Value = resp.json().await.expect("body");
    assert_eq!(body["message"], "Post unliked");

    let feed = app.get_json(Some(&bob.token), "/api/feed").await;
    let feed = feed.as_array().expect("array");
    assert_eq!(feed[0]["likes_count"].as_i64(), Some(0));
    assert_eq!(feed[0]["is_liked_by_user"].as_bool(), Some(false));
}

#[tokio::test]
async fn test_author_posts_for_anonymous_viewer() {
    let app = require_app!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;

    let post_id = app.create_post(&alice.token, "public view").await;
    let resp = app.toggle_like(&bob.token, post_id).await;
    assert_eq!(resp.status().as_u16(), 200);

    // Anonymous readers get counts but never a personal like flag.
    let posts = app.get_json(None, &format!("/api/users/{}/posts", alice.user_id)).await;
    let posts = posts.as_array().expect("array");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["likes_count"].as_i64(), Some(1));
    assert!(posts[0].get("is_liked_by_user").is_none());

    // An authenticated reader gets their own flag.
    let posts = app.get_json(Some(&bob.token), &format!("/api/users/{}/posts", alice.user_id)).await;
    let posts = posts.as_array().expect("array");
    assert_eq!(posts[0]["is_liked_by_user"].as_bool(), Some(true));
}

#[tokio::test]
async fn test_feed_is_newest_first_with_id_tiebreak() {
    let app = require_app!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    app.befriend(&alice, &bob).await;

    app.create_post(&alice.token, "oldest").await;
    app.create_post(&alice.token, "newest").await;

    // Force an equal-timestamp pair to pin the id tie-break.
    for content in ["tied first", "tied second"] {
        sqlx::query(
            "INSERT INTO posts (author_id, content, created_at)
             VALUES ($1, $2, '2024-01-01T12:00:00Z'::timestamptz)",
        )
        .bind(alice.user_id)
        .bind(content)
        .execute(&app.pool)
        .await
        .expect("seed tied post");
    }

    let feed = app.get_json(Some(&bob.token), "/api/feed").await;
    let contents: Vec<&str> = feed.as_array().expect("array").iter().filter_map(|p| p["content"].as_str()).collect();

    // Sequential posts come newest first; the tied pair orders by id, most
    // recently created first.
    assert_eq!(contents, vec!["newest", "oldest", "tied second", "tied first"]);
}
