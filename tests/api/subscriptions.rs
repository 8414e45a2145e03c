use sqlx::SqlitePool;

use crate::helpers::spawn_app;

#[sqlx::test]
async fn subscribe_returns_a_200_for_valid_form_data(pool: SqlitePool) {
    let app = spawn_app(pool).await;

    let body = "email=potato%40tomato.com";

    let response = app.post_subscriptions(body.into()).await;

    assert_eq!(200, response.status().as_u16());
}

#[sqlx::test]
async fn subscribe_persists_the_new_subscriber(pool: SqlitePool) {
    let app = spawn_app(pool).await;
    let body = "email=potato%40tomato.com";

    app.post_subscriptions(body.into()).await;

    let saved: (String,) = sqlx::query_as("SELECT email FROM subscriptions")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to fetch saved subscription.");
    assert_eq!(saved.0, "potato@tomato.com");
}

#[sqlx::test]
async fn subscribe_returns_a_400_when_data_is_missing(pool: SqlitePool) {
    let app = spawn_app(pool).await;

    let test_cases = vec![
        ("", "missing the email"),
        ("name=potato", "a field other than the email"),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = app.post_subscriptions(invalid_body.into()).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            error_message
        )
    }
}

#[sqlx::test]
async fn subscribe_returns_a_400_when_the_email_is_present_but_invalid(pool: SqlitePool) {
    let app = spawn_app(pool).await;

    let test_cases = vec![
        ("email=", "empty email"),
        ("email=definitely-not-an-email", "invalid email"),
        ("email=%40tomato.com", "email missing the subject"),
    ];

    for (body, description) in test_cases {
        let response = app.post_subscriptions(body.into()).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        )
    }
}

#[sqlx::test]
async fn subscribing_twice_with_the_same_email_is_a_no_op(pool: SqlitePool) {
    let app = spawn_app(pool).await;
    let body = "email=potato%40tomato.com";

    let first = app.post_subscriptions(body.into()).await;
    let second = app.post_subscriptions(body.into()).await;

    assert_eq!(200, first.status().as_u16());
    assert_eq!(200, second.status().as_u16());

    let saved: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriptions")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count subscriptions.");
    assert_eq!(saved.0, 1);
}

#[sqlx::test]
async fn the_subscriber_list_contains_every_signup(pool: SqlitePool) {
    let app = spawn_app(pool).await;

    app.post_subscriptions("email=potato%40tomato.com".into())
        .await;
    app.post_subscriptions("email=falana%40dekana.com".into())
        .await;

    let response = app.get_subscriptions().await;
    assert_eq!(200, response.status().as_u16());

    let emails: Vec<String> = response.json().await.expect("Failed to parse body.");
    assert_eq!(emails.len(), 2);
    assert!(emails.contains(&"potato@tomato.com".to_string()));
    assert!(emails.contains(&"falana@dekana.com".to_string()));
}

#[sqlx::test]
async fn unsubscribing_deletes_the_subscriber(pool: SqlitePool) {
    let app = spawn_app(pool).await;
    let body = "email=potato%40tomato.com";

    app.post_subscriptions(body.into()).await;
    let response = app.delete_subscriptions(body.into()).await;
    assert_eq!(200, response.status().as_u16());

    let saved: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriptions")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count subscriptions.");
    assert_eq!(saved.0, 0);
}

#[sqlx::test]
async fn unsubscribing_an_unknown_email_returns_a_404(pool: SqlitePool) {
    let app = spawn_app(pool).await;

    let response = app
        .delete_subscriptions("email=never-signed-up%40tomato.com".into())
        .await;

    assert_eq!(404, response.status().as_u16());
}
