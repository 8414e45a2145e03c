use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tsid::create_tsid;

use crate::domain::{NewSubscriber, SubscriberEmail};
use crate::utils::e500;

#[derive(Deserialize)]
pub struct FormData {
    email: String,
}

impl TryFrom<FormData> for NewSubscriber {
    type Error = String;

    fn try_from(value: FormData) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(value.email)?;
        Ok(NewSubscriber { email })
    }
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SubscribeError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(form, pool),
    fields(subscriber_email = %form.email)
)]
pub async fn subscribe(
    form: web::Form<FormData>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, SubscribeError> {
    let new_subscriber = form.0.try_into().map_err(SubscribeError::ValidationError)?;

    insert_subscriber(&pool, &new_subscriber)
        .await
        .context("Failed to insert new subscriber in the database.")?;

    Ok(HttpResponse::Ok().finish())
}

/// Signing up twice with the same address is a no-op, not an error. The
/// unique index on `email` absorbs the duplicate.
#[tracing::instrument(
    name = "Saving new subscriber details in the database",
    skip(new_subscriber, pool)
)]
pub async fn insert_subscriber(
    pool: &SqlitePool,
    new_subscriber: &NewSubscriber,
) -> Result<(), sqlx::Error> {
    let tsid = create_tsid().to_string();
    let creation_time = Utc::now().to_string();
    sqlx::query(
        r#"
        INSERT INTO subscriptions(id, email, subscribed_at)
        VALUES ($1, $2, $3)
        ON CONFLICT(email) DO NOTHING
        "#,
    )
    .bind(tsid)
    .bind(new_subscriber.email.as_ref())
    .bind(creation_time)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        e
    })?;
    Ok(())
}

#[tracing::instrument(name = "Listing all subscribers", skip(pool))]
pub async fn list_subscribers(
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT email
        FROM subscriptions
        ORDER BY subscribed_at
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .context("Failed to fetch the subscriber list.")
    .map_err(e500)?;

    let emails: Vec<String> = rows.into_iter().map(|(email,)| email).collect();
    Ok(HttpResponse::Ok().json(emails))
}

#[tracing::instrument(
    name = "Removing a subscriber",
    skip(form, pool),
    fields(subscriber_email = %form.email)
)]
pub async fn unsubscribe(
    form: web::Form<FormData>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    let outcome = delete_subscriber(&pool, &form.email)
        .await
        .context("Failed to delete subscriber from the database.")
        .map_err(e500)?;

    if outcome == 0 {
        Ok(HttpResponse::NotFound().finish())
    } else {
        Ok(HttpResponse::Ok().finish())
    }
}

#[tracing::instrument(name = "Deleting subscriber details from the database", skip(pool))]
pub async fn delete_subscriber(pool: &SqlitePool, email: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM subscriptions
        WHERE email = $1
        "#,
    )
    .bind(email)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        e
    })?;
    Ok(result.rows_affected())
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
