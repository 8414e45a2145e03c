use actix_web::{
    http::header::ContentType,
    web, HttpResponse,
};
use sqlx::SqlitePool;

use crate::routes::session::get_username;
use crate::session_state::TypedSession;
use crate::utils::{e500, see_other};

pub async fn members_area(
    session: TypedSession,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    let user_id = match session.get_user_id().map_err(e500)? {
        Some(user_id) => user_id,
        None => return Ok(see_other("/login")),
    };
    let username = get_username(&user_id, &pool).await.map_err(e500)?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta http-equiv="content-type" content="text/html; charset=utf-8">
    <title>Members area</title>
</head>
<body>
    <p>Welcome {username}!</p>
    <p>The goods are in <a href="/api/members/secret-stash">the secret stash</a>.</p>
    <p><a href="/logout">Logout</a></p>
</body>
</html>"#
        )))
}
