use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::TransactionTrait;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::review::ReviewService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{review_id}/heart",
    tag = "Hearts",
    operation_id = "heartReview",
    summary = "Heart a review",
    description = "Marks the review as liked by the caller. Repeating the call is a no-op.",
    params(("review_id" = i32, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review hearted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Review not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(member_id = auth_user.member_id, review_id))]
pub async fn heart_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    ReviewService::new(&txn)
        .heart(auth_user.member_id, review_id)
        .await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/{review_id}/heart",
    tag = "Hearts",
    operation_id = "unheartReview",
    summary = "Remove a heart",
    description = "Removes the caller's heart from the review. Succeeds even if the review was not hearted.",
    params(("review_id" = i32, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Heart removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Review not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(member_id = auth_user.member_id, review_id))]
pub async fn unheart_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    ReviewService::new(&txn)
        .unheart(auth_user.member_id, review_id)
        .await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
