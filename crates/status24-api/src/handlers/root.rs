use axum::{response::IntoResponse, Json};
use status24_core::models::MessageResponse;

#[utoipa::path(
    get,
    path = "/",
    tag = "general",
    responses(
        (status = 200, description = "Welcome message", body = MessageResponse)
    )
)]
pub async fn root() -> impl IntoResponse {
    Json(MessageResponse {
        message: "Welcome to the Status24 API".to_string(),
    })
}
