use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::discounts::{ApplyDiscountRequest, DiscountQuote},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::discount_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/apply", post(apply_discount))
}

#[utoipa::path(
    post,
    path = "/api/discounts/apply",
    request_body = ApplyDiscountRequest,
    responses(
        (status = 200, description = "Discount quote against the current cart", body = ApiResponse<DiscountQuote>),
        (status = 400, description = "Invalid, expired, exhausted, below minimum or already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn apply_discount(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ApplyDiscountRequest>,
) -> AppResult<Json<ApiResponse<DiscountQuote>>> {
    let resp = discount_service::apply_discount(&state, &user, payload).await?;
    Ok(Json(resp))
}
