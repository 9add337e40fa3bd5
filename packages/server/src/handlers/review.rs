use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::TransactionTrait;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::review::{
    ReviewDetailResponse, ReviewListResponse, ReviewLiveResponse, ReviewRequest,
    validate_review_request,
};
use crate::models::shared::PageQuery;
use crate::review::ReviewService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{musical_id}/reviews",
    tag = "Reviews",
    operation_id = "createReview",
    summary = "Write a review",
    description = "Creates a review for the given musical. The seat is looked up in the musical's theater and its grade must match. Tags are resolved from the comma-separated `tags` string; unseen tags are created.",
    params(("musical_id" = i32, Path, description = "Musical ID")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewDetailResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Musical or seat not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(member_id = auth_user.member_id, musical_id))]
pub async fn create_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(musical_id): Path<i32>,
    AppJson(payload): AppJson<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_review_request(&payload)?;

    let txn = state.db.begin().await?;
    let service = ReviewService::new(&txn);
    let aggregate = service
        .create_review(auth_user.member_id, musical_id, &payload)
        .await?;
    let detail = service
        .describe(aggregate, Some(auth_user.member_id))
        .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(ReviewDetailResponse::from(detail))))
}

#[utoipa::path(
    get,
    path = "/{musical_id}/reviews",
    tag = "Reviews",
    operation_id = "listMusicalReviews",
    summary = "List a musical's reviews",
    description = "Returns a page of the musical's reviews, newest first. When a token is supplied each item reports whether the viewer hearted it; anonymous viewers always see `heartChecked = false`.",
    params(("musical_id" = i32, Path, description = "Musical ID"), PageQuery),
    responses(
        (status = 200, description = "Page of reviews", body = ReviewListResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Musical not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, query), fields(musical_id))]
pub async fn list_reviews(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(musical_id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ReviewListResponse>, AppError> {
    let (page, per_page) = query.resolve();
    let list = ReviewService::new(&state.db)
        .musical_reviews(musical_id, page, per_page, viewer.member_id())
        .await?;
    Ok(Json(list))
}

#[utoipa::path(
    get,
    path = "/{musical_id}/reviews/{review_id}",
    tag = "Reviews",
    operation_id = "getReview",
    summary = "Get a review",
    params(
        ("musical_id" = i32, Path, description = "Musical ID"),
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Review details", body = ReviewDetailResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Review or author not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(musical_id, review_id))]
pub async fn get_review(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path((musical_id, review_id)): Path<(i32, i32)>,
) -> Result<Json<ReviewDetailResponse>, AppError> {
    let detail = ReviewService::new(&state.db)
        .review_detail(musical_id, review_id, viewer.member_id())
        .await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    put,
    path = "/{musical_id}/reviews/{review_id}",
    tag = "Reviews",
    operation_id = "updateReview",
    summary = "Edit a review",
    description = "Replaces the review's fields and tag set. Images in `imgUrls` are appended to those already attached. Only the author may edit.",
    params(
        ("musical_id" = i32, Path, description = "Musical ID"),
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewDetailResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Review, musical or seat not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(member_id = auth_user.member_id, musical_id, review_id))]
pub async fn update_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((musical_id, review_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<ReviewRequest>,
) -> Result<Json<ReviewDetailResponse>, AppError> {
    validate_review_request(&payload)?;

    let txn = state.db.begin().await?;
    let service = ReviewService::new(&txn);
    let aggregate = service
        .update_review(auth_user.member_id, musical_id, review_id, &payload)
        .await?;
    let detail = service
        .describe(aggregate, Some(auth_user.member_id))
        .await?;
    txn.commit().await?;

    Ok(Json(detail.into()))
}

#[utoipa::path(
    delete,
    path = "/{musical_id}/reviews/{review_id}",
    tag = "Reviews",
    operation_id = "deleteReview",
    summary = "Delete a review",
    description = "Deletes the review together with its images, tag links and hearts. Tags remain. Only the author may delete.",
    params(
        ("musical_id" = i32, Path, description = "Musical ID"),
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Review not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(member_id = auth_user.member_id, musical_id, review_id))]
pub async fn delete_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((musical_id, review_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    ReviewService::new(&txn)
        .delete_review(auth_user.member_id, musical_id, review_id)
        .await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/live",
    tag = "Reviews",
    operation_id = "listRecentReviews",
    summary = "Latest reviews across all musicals",
    responses(
        (status = 200, description = "Up to 10 most recent reviews", body = [ReviewLiveResponse]),
    ),
)]
#[instrument(skip(state))]
pub async fn recent_reviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReviewLiveResponse>>, AppError> {
    let feed = ReviewService::new(&state.db).recent_reviews().await?;
    Ok(Json(feed))
}
