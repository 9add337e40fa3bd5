use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::Pagination;
use crate::entity::{member, musical, review, review_file, tag, theater_seat};
use crate::error::AppError;
use crate::types::{FloorType, GradeType, ScoreType};

pub const MAX_CONTENT_CHARS: usize = 2000;
pub const MAX_IMAGES: usize = 10;
pub const MAX_TAGS_CHARS: usize = 500;

/// Request body for creating or editing a review.
#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// Ticket grade of the seat. Must match the grade registered for that seat.
    #[schema(example = "R")]
    pub grade: GradeType,
    #[schema(example = "FLOOR1")]
    pub floor: FloorType,
    #[schema(example = "B")]
    pub section: String,
    #[schema(example = "7")]
    pub row: String,
    #[schema(example = 12)]
    pub seat: i32,
    /// Free-text review body (1-2000 characters after trimming).
    pub review_content: String,
    /// Ordered image URLs. Order is preserved and duplicates are kept. Surrounding
    /// whitespace is trimmed before a URL is stored.
    #[serde(default)]
    pub img_urls: Vec<String>,
    pub gap: ScoreType,
    pub sight: ScoreType,
    pub sound: ScoreType,
    pub light: ScoreType,
    #[serde(default)]
    pub opera_glass: bool,
    #[serde(default)]
    pub block: bool,
    /// Comma-separated tags, e.g. `"musical, classic"`. Blank entries are ignored.
    #[serde(default)]
    #[schema(example = "musical, classic")]
    pub tags: String,
}

pub fn validate_review_request(req: &ReviewRequest) -> Result<(), AppError> {
    let content = req.review_content.trim();
    if content.is_empty() || content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::Validation(format!(
            "Content must be 1-{MAX_CONTENT_CHARS} characters"
        )));
    }
    if req.section.trim().is_empty() || req.row.trim().is_empty() {
        return Err(AppError::Validation(
            "Section and row must not be empty".into(),
        ));
    }
    if req.seat < 1 {
        return Err(AppError::Validation("Seat must be >= 1".into()));
    }
    if req.img_urls.len() > MAX_IMAGES {
        return Err(AppError::Validation(format!(
            "Too many images: max {MAX_IMAGES}"
        )));
    }
    if req.img_urls.iter().any(|u| u.trim().is_empty()) {
        return Err(AppError::Validation("Image URL must not be empty".into()));
    }
    if req.tags.chars().count() > MAX_TAGS_CHARS {
        return Err(AppError::Validation(format!(
            "Tags must be at most {MAX_TAGS_CHARS} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Public profile of a review's author.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub member_id: i32,
    pub nickname: String,
    pub profile_img_url: Option<String>,
}

impl From<member::Model> for MemberResponse {
    fn from(m: member::Model) -> Self {
        Self {
            member_id: m.id,
            nickname: m.nickname,
            profile_img_url: m.profile_img_url,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetailResponse {
    pub review_id: i32,
    pub musical_id: i32,
    pub grade: GradeType,
    pub floor: FloorType,
    pub section: String,
    pub row: String,
    pub seat: i32,
    pub review_content: String,
    pub img_urls: Vec<String>,
    pub gap: ScoreType,
    pub sight: ScoreType,
    pub sound: ScoreType,
    pub light: ScoreType,
    pub opera_glass: bool,
    pub block: bool,
    pub tags: Vec<String>,
    pub heart_count: u64,
    /// Whether the requesting member has hearted this review. Always false for anonymous viewers.
    pub heart_checked: bool,
    pub member: MemberResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to render a review detail.
pub struct ReviewDetailParts {
    pub review: review::Model,
    pub seat: theater_seat::Model,
    pub files: Vec<review_file::Model>,
    pub tags: Vec<tag::Model>,
    pub author: member::Model,
    pub heart_count: u64,
    pub heart_checked: bool,
}

impl From<ReviewDetailParts> for ReviewDetailResponse {
    fn from(p: ReviewDetailParts) -> Self {
        Self {
            review_id: p.review.id,
            musical_id: p.review.musical_id,
            grade: p.review.grade,
            floor: p.seat.floor,
            section: p.seat.section,
            row: p.seat.seat_row,
            seat: p.seat.seat,
            review_content: p.review.content,
            img_urls: p.files.into_iter().map(|f| f.file_path).collect(),
            gap: p.review.gap,
            sight: p.review.sight,
            sound: p.review.sound,
            light: p.review.light,
            opera_glass: p.review.opera_glass,
            block: p.review.block,
            tags: p.tags.into_iter().map(|t| t.tag).collect(),
            heart_count: p.heart_count,
            heart_checked: p.heart_checked,
            member: p.author.into(),
            created_at: p.review.created_at,
            updated_at: p.review.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListItem {
    pub review_id: i32,
    pub grade: GradeType,
    pub floor: FloorType,
    pub section: String,
    pub row: String,
    pub seat: i32,
    /// First attached image, if any.
    pub thumbnail: Option<String>,
    pub review_content: String,
    pub tags: Vec<String>,
    pub heart_checked: bool,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewListResponse {
    pub data: Vec<ReviewListItem>,
    pub pagination: Pagination,
}

/// Entry of the live feed of the latest reviews across all musicals.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLiveResponse {
    pub review_id: i32,
    pub musical_id: i32,
    pub musical_title: String,
    pub grade: GradeType,
    pub review_content: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewLiveResponse {
    pub fn new(review: review::Model, musical: &musical::Model) -> Self {
        Self {
            review_id: review.id,
            musical_id: review.musical_id,
            musical_title: musical.title.clone(),
            grade: review.grade,
            review_content: review.content,
            created_at: review.created_at,
        }
    }
}
