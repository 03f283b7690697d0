mod common;

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = require_app!();
    let user = app.register_user("dana").await;

    let resp = app
        .client
        .post(format!("{}/api/users", app.server_url))
        .json(&serde_json::json!({
            "name": "dana again",
            "email": user.email,
            "password": "password12345",
        }))
        .send()
        .await
        .expect("register request");
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = require_app!();
    let user = app.register_user("erin").await;

    let resp = app
        .client
        .post(format!("{}/api/login", app.server_url))
        .json(&serde_json::json!({ "email": user.email, "password": "not-the-password" }))
        .send()
        .await
        .expect("login request");
    assert_eq!(resp.status().as_u16(), 401);

    let resp = app
        .client
        .post(format!("{}/api/login", app.server_url))
        .json(&serde_json::json!({ "email": "nobody@example.com", "password": "password12345" }))
        .send()
        .await
        .expect("login request");
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn test_check_email_probe() {
    let app = require_app!();
    let user = app.register_user("farid").await;

    for (email, expected) in [(user.email.as_str(), true), ("missing@example.com", false)] {
        let resp = app
            .client
            .post(format!("{}/api/check-email", app.server_url))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .expect("check email");
        let body: serde_json::Value = resp.json().await.expect("body");
        assert_eq!(body["exists"].as_bool(), Some(expected));
    }
}

#[tokio::test]
async fn test_profile_updates_are_owner_only() {
    let app = require_app!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;

    let resp = app
        .client
        .put(format!("{}/api/users/{}", app.server_url, alice.user_id))
        .bearer_auth(&bob.token)
        .json(&serde_json::json!({ "description": "hijacked" }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .client
        .put(format!("{}/api/users/{}", app.server_url, alice.user_id))
        .bearer_auth(&alice.token)
        .json(&serde_json::json!({ "name": "alice prime", "description": "it me" }))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await.expect("body");
    assert_eq!(body["name"], "alice prime");
    assert_eq!(body["description"], "it me");

    // Responses never leak credentials.
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = require_app!();

    for path in ["/api/feed", "/api/friends", "/api/friend-requests", "/api/messages/1"] {
        let resp = app.client.get(format!("{}{path}", app.server_url)).send().await.expect("request");
        assert_eq!(resp.status().as_u16(), 401, "{path} must require auth");
    }

    let resp = app
        .client
        .get(format!("{}/api/feed", app.server_url))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status().as_u16(), 401);
}
