use actix_web::web::ReqData;
use actix_web::HttpResponse;

use crate::authentication::UserId;

/// The members-only payload. The route sits behind the session guard, so
/// reaching the handler implies a live session.
#[tracing::instrument {
    name = "Serving the secret stash",
    skip_all,
    fields(user_id = %&*user_id)
}]
pub async fn secret_stash(user_id: ReqData<UserId>) -> HttpResponse {
    let user_id = user_id.into_inner();
    HttpResponse::Ok().json(serde_json::json!({
        "stash": [
            {
                "title": "Interval training, the lazy way",
                "kind": "exercise-video"
            },
            {
                "title": "Trainer office hours, Thursdays 18:00",
                "kind": "announcement"
            },
            {
                "title": "Members-only discount code: STASH-2024",
                "kind": "perk"
            }
        ],
        "for": &*user_id
    }))
}
