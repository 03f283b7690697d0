mod common;

use std::time::Duration;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_live_delivery_to_registered_recipient() {
    let app = require_app!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;

    let mut alice_ws = app.connect_ws(&alice.token).await;
    alice_ws.identify().await;
    alice_ws
        .wait_for_online(EVENT_TIMEOUT, |ids| ids.contains(&alice.user_id))
        .await
        .expect("own presence snapshot");

    let mut bob_ws = app.connect_ws(&bob.token).await;
    bob_ws.identify().await;

    // Wait until both sides observe bob online before sending.
    alice_ws
        .wait_for_online(EVENT_TIMEOUT, |ids| ids.contains(&bob.user_id))
        .await
        .expect("bob in presence snapshot");

    alice_ws.send_message(bob.user_id, "hello bob").await;

    let pushed = bob_ws.wait_for_message(EVENT_TIMEOUT).await.expect("live push");
    assert_eq!(pushed["sender_id"].as_i64(), Some(alice.user_id));
    assert_eq!(pushed["receiver_id"].as_i64(), Some(bob.user_id));
    assert_eq!(pushed["content"], "hello bob");
    let pushed_id = pushed["id"].as_i64().expect("message id");

    // The pushed id and timestamp are those of the persisted row.
    let history = app.message_history(&bob.token, alice.user_id).await;
    let history = history.as_array().expect("array");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"].as_i64(), Some(pushed_id));
    assert_eq!(history[0]["created_at"], pushed["created_at"]);
}

#[tokio::test]
async fn test_offline_send_still_persists() {
    let app = require_app!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;

    let mut alice_ws = app.connect_ws(&alice.token).await;
    alice_ws.identify().await;
    alice_ws
        .wait_for_online(EVENT_TIMEOUT, |ids| ids.contains(&alice.user_id))
        .await
        .expect("own presence snapshot");

    // Bob has no connection; delivery falls back to history.
    alice_ws.send_message(bob.user_id, "see you later").await;

    let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;
    loop {
        let history = app.message_history(&bob.token, alice.user_id).await;
        let history = history.as_array().expect("array").clone();
        if history.len() == 1 {
            assert_eq!(history[0]["content"], "see you later");
            assert_eq!(history[0]["sender_id"].as_i64(), Some(alice.user_id));
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "message never persisted");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn test_unidentified_connection_cannot_send() {
    let app = require_app!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;

    let mut bob_ws = app.connect_ws(&bob.token).await;
    bob_ws.identify().await;

    // Alice connects but never identifies; her sends must be dropped.
    let mut alice_ws = app.connect_ws(&alice.token).await;
    alice_ws.send_message(bob.user_id, "should vanish").await;

    assert!(bob_ws.wait_for_message(Duration::from_millis(750)).await.is_none());

    let history = app.message_history(&bob.token, alice.user_id).await;
    assert!(history.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn test_presence_snapshot_broadcast_on_connect_and_disconnect() {
    let app = require_app!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;

    let mut alice_ws = app.connect_ws(&alice.token).await;
    alice_ws.identify().await;
    let snapshot = alice_ws
        .wait_for_online(EVENT_TIMEOUT, |ids| ids.contains(&alice.user_id))
        .await
        .expect("snapshot after identify");
    assert!(snapshot.contains(&alice.user_id));

    let mut bob_ws = app.connect_ws(&bob.token).await;
    bob_ws.identify().await;

    // Everyone connected receives the updated snapshot.
    alice_ws
        .wait_for_online(EVENT_TIMEOUT, |ids| ids.contains(&bob.user_id))
        .await
        .expect("snapshot after bob identifies");
    bob_ws
        .wait_for_online(EVENT_TIMEOUT, |ids| ids.contains(&alice.user_id) && ids.contains(&bob.user_id))
        .await
        .expect("bob's own snapshot");

    bob_ws.close().await;

    alice_ws
        .wait_for_online(EVENT_TIMEOUT, |ids| !ids.contains(&bob.user_id))
        .await
        .expect("snapshot after bob disconnects");
}

#[tokio::test]
async fn test_last_registered_connection_wins() {
    let app = require_app!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;

    let mut alice_ws = app.connect_ws(&alice.token).await;
    alice_ws.identify().await;

    let mut bob_first = app.connect_ws(&bob.token).await;
    bob_first.identify().await;
    alice_ws
        .wait_for_online(EVENT_TIMEOUT, |ids| ids.contains(&bob.user_id))
        .await
        .expect("bob online");

    // A second registration for the same account supersedes the first.
    let mut bob_second = app.connect_ws(&bob.token).await;
    bob_second.identify().await;
    bob_second
        .wait_for_online(EVENT_TIMEOUT, |ids| ids.contains(&bob.user_id))
        .await
        .expect("second connection snapshot");

    alice_ws.send_message(bob.user_id, "first").await;
    let pushed = bob_second.wait_for_message(EVENT_TIMEOUT).await.expect("push to newest connection");
    assert_eq!(pushed["content"], "first");
    assert!(bob_first.wait_for_message(Duration::from_millis(500)).await.is_none());

    // The stale connection's disconnect must not evict the new registration.
    bob_first.close().await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    alice_ws.send_message(bob.user_id, "second").await;
    let pushed = bob_second.wait_for_message(EVENT_TIMEOUT).await.expect("push after stale disconnect");
    assert_eq!(pushed["content"], "second");
}

#[tokio::test]
async fn test_history_is_ordered_and_bidirectional() {
    let app = require_app!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;

    let mut alice_ws = app.connect_ws(&alice.token).await;
    alice_ws.identify().await;
    let mut bob_ws = app.connect_ws(&bob.token).await;
    bob_ws.identify().await;
    alice_ws
        .wait_for_online(EVENT_TIMEOUT, |ids| ids.contains(&bob.user_id))
        .await
        .expect("bob online");
    bob_ws
        .wait_for_online(EVENT_TIMEOUT, |ids| ids.contains(&alice.user_id))
        .await
        .expect("alice online");

    alice_ws.send_message(bob.user_id, "one").await;
    bob_ws.wait_for_message(EVENT_TIMEOUT).await.expect("first push");
    bob_ws.send_message(alice.user_id, "two").await;
    alice_ws.wait_for_message(EVENT_TIMEOUT).await.expect("second push");
    alice_ws.send_message(bob.user_id, "three").await;
    bob_ws.wait_for_message(EVENT_TIMEOUT).await.expect("third push");

    // Both participants see the same ascending conversation.
    for token in [&alice.token, &bob.token] {
        let history = app.message_history(token, if token == &alice.token { bob.user_id } else { alice.user_id }).await;
        let contents: Vec<&str> =
            history.as_array().expect("array").iter().filter_map(|m| m["content"].as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }
}
