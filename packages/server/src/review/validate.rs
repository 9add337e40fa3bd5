use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity::{member, musical, review, theater_seat};
use crate::error::AppError;
use crate::models::review::ReviewRequest;

/// Look up a musical by ID, returning 404 if not found.
pub async fn find_musical<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<musical::Model, AppError> {
    musical::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Musical not found".into()))
}

/// Resolve the seat described by `req` in the theater where `musical` runs.
///
/// Returns 404 if the theater has no such seat and 400 if the seat exists but is
/// registered under a different grade than the one claimed.
pub async fn find_theater_seat<C: ConnectionTrait>(
    db: &C,
    musical: &musical::Model,
    req: &ReviewRequest,
) -> Result<theater_seat::Model, AppError> {
    let seat = theater_seat::Entity::find()
        .filter(theater_seat::Column::TheaterId.eq(musical.theater_id))
        .filter(theater_seat::Column::Floor.eq(req.floor))
        .filter(theater_seat::Column::Section.eq(req.section.trim()))
        .filter(theater_seat::Column::SeatRow.eq(req.row.trim()))
        .filter(theater_seat::Column::Seat.eq(req.seat))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Seat not found".into()))?;

    if seat.grade != req.grade {
        return Err(AppError::Validation(format!(
            "Seat is registered as grade {}, not {}",
            seat.grade, req.grade
        )));
    }
    Ok(seat)
}

/// Look up a review by ID, returning 404 if not found.
pub async fn find_review<C: ConnectionTrait>(db: &C, id: i32) -> Result<review::Model, AppError> {
    review::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".into()))
}

/// Look up a review that belongs to `musical_id`. A review under another musical is a 404.
pub async fn find_musical_review<C: ConnectionTrait>(
    db: &C,
    musical_id: i32,
    review_id: i32,
) -> Result<review::Model, AppError> {
    let review = find_review(db, review_id).await?;
    if review.musical_id != musical_id {
        return Err(AppError::NotFound("Review not found".into()));
    }
    Ok(review)
}

/// Look up a member by ID, returning 404 if not found.
pub async fn find_member<C: ConnectionTrait>(db: &C, id: i32) -> Result<member::Model, AppError> {
    member::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".into()))
}

/// Reject `actor` unless they authored `review`.
pub fn ensure_author(review: &review::Model, actor: i32) -> Result<(), AppError> {
    if review.created_by != actor {
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}
