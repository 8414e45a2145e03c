use actix_web::{web, HttpResponse};
use anyhow::Context;
use sqlx::SqlitePool;

use crate::{session_state::TypedSession, utils::e500};

#[derive(serde::Serialize)]
pub struct SessionInfo {
    user_id: String,
    username: String,
}

/// Describe the caller's session. Clients poll this on boot to rebuild
/// their cached identity; an anonymous caller gets a bare 401 so the
/// cache stays empty.
#[tracing::instrument {
    name = "Fetching the current session",
    skip(session, pool)
}]
pub async fn current_session(
    session: TypedSession,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    match session.get_user_id().map_err(e500)? {
        Some(user_id) => {
            let username = get_username(&user_id, &pool).await.map_err(e500)?;
            Ok(HttpResponse::Ok().json(SessionInfo { user_id, username }))
        }
        None => Ok(HttpResponse::Unauthorized().finish()),
    }
}

#[tracing::instrument {
    name = "Get Username",
    skip(pool)
}]
pub async fn get_username(user_id: &String, pool: &SqlitePool) -> Result<String, anyhow::Error> {
    let row: (String,) = sqlx::query_as(
        r#"
        SELECT username
        FROM users
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("Failed to perform a query to retrieve a username.")?;
    Ok(row.0)
}
