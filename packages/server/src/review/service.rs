use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::info;

use super::builder::{ReviewAggregate, ReviewBuilder};
use super::heart::HeartService;
use super::validate::{
    ensure_author, find_member, find_musical, find_musical_review, find_review,
    find_theater_seat,
};
use crate::entity::{musical, review, review_file, review_heart, review_tag, tag, theater_seat};
use crate::error::AppError;
use crate::models::review::{
    ReviewDetailParts, ReviewListItem, ReviewListResponse, ReviewLiveResponse, ReviewRequest,
};
use crate::models::shared::Pagination;

/// Number of entries in the live feed.
pub const LIVE_FEED_SIZE: u64 = 10;

/// Caller-side orchestration around the review core.
///
/// Resolves and checks parents, enforces authorship and composes read models. Pass a
/// transaction as `conn` for write operations and commit it only after success.
pub struct ReviewService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ReviewService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create_review(
        &self,
        author: i32,
        musical_id: i32,
        req: &ReviewRequest,
    ) -> Result<ReviewAggregate, AppError> {
        let musical = find_musical(self.conn, musical_id).await?;
        let seat = find_theater_seat(self.conn, &musical, req).await?;

        Ok(ReviewBuilder::new(self.conn)
            .build(author, &seat, &musical, req)
            .await?)
    }

    /// Edit a review. Only its author may do so; the check runs before any write.
    pub async fn update_review(
        &self,
        actor: i32,
        musical_id: i32,
        review_id: i32,
        req: &ReviewRequest,
    ) -> Result<ReviewAggregate, AppError> {
        let review = find_musical_review(self.conn, musical_id, review_id).await?;
        ensure_author(&review, actor)?;

        let musical = find_musical(self.conn, musical_id).await?;
        let seat = find_theater_seat(self.conn, &musical, req).await?;

        Ok(ReviewBuilder::new(self.conn)
            .update(review, &seat, &musical, req)
            .await?)
    }

    /// Delete a review with its files, tag links and hearts. Tags themselves stay.
    pub async fn delete_review(
        &self,
        actor: i32,
        musical_id: i32,
        review_id: i32,
    ) -> Result<(), AppError> {
        let review = find_musical_review(self.conn, musical_id, review_id).await?;
        ensure_author(&review, actor)?;

        review_heart::Entity::delete_many()
            .filter(review_heart::Column::ReviewId.eq(review_id))
            .exec(self.conn)
            .await?;
        review_tag::Entity::delete_many()
            .filter(review_tag::Column::ReviewId.eq(review_id))
            .exec(self.conn)
            .await?;
        review_file::Entity::delete_many()
            .filter(review_file::Column::ReviewId.eq(review_id))
            .exec(self.conn)
            .await?;
        review::Entity::delete_by_id(review_id)
            .exec(self.conn)
            .await?;

        info!(review_id, "Review deleted");
        Ok(())
    }

    pub async fn review_detail(
        &self,
        musical_id: i32,
        review_id: i32,
        viewer: Option<i32>,
    ) -> Result<ReviewDetailParts, AppError> {
        let review = find_musical_review(self.conn, musical_id, review_id).await?;

        let seat = theater_seat::Entity::find_by_id(review.theater_seat_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Review {review_id} has no seat")))?;
        let files = self
            .load_files(&[review.id])
            .await?
            .remove(&review.id)
            .unwrap_or_default();
        let tags = self
            .load_tags(&[review.id])
            .await?
            .remove(&review.id)
            .unwrap_or_default();

        self.describe(
            ReviewAggregate {
                review,
                seat,
                files,
                tags,
            },
            viewer,
        )
        .await
    }

    /// Attach author, heart count and the viewer's heart flag to an aggregate.
    pub async fn describe(
        &self,
        aggregate: ReviewAggregate,
        viewer: Option<i32>,
    ) -> Result<ReviewDetailParts, AppError> {
        let author = find_member(self.conn, aggregate.review.created_by).await?;
        let hearts = HeartService::new(self.conn);
        let heart_count = hearts.count(aggregate.review.id).await?;
        let heart_checked = hearts.is_hearted(aggregate.review.id, viewer).await?;

        Ok(ReviewDetailParts {
            review: aggregate.review,
            seat: aggregate.seat,
            files: aggregate.files,
            tags: aggregate.tags,
            author,
            heart_count,
            heart_checked,
        })
    }

    /// One page of a musical's reviews, newest first.
    pub async fn musical_reviews(
        &self,
        musical_id: i32,
        page: u64,
        per_page: u64,
        viewer: Option<i32>,
    ) -> Result<ReviewListResponse, AppError> {
        find_musical(self.conn, musical_id).await?;

        let select = review::Entity::find().filter(review::Column::MusicalId.eq(musical_id));
        let total = select.clone().count(self.conn).await?;
        let pagination = Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        };

        // Pages past the end are empty; the offset is only computed for pages in range.
        if page > pagination.total_pages {
            return Ok(ReviewListResponse {
                data: Vec::new(),
                pagination,
            });
        }

        let reviews = select
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .offset(Some(page.saturating_sub(1).saturating_mul(per_page)))
            .limit(Some(per_page))
            .all(self.conn)
            .await?;

        let ids: Vec<i32> = reviews.iter().map(|r| r.id).collect();
        let seat_ids: Vec<i32> = reviews.iter().map(|r| r.theater_seat_id).collect();
        let seats: HashMap<i32, theater_seat::Model> = theater_seat::Entity::find()
            .filter(theater_seat::Column::Id.is_in(seat_ids))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let mut files = self.load_files(&ids).await?;
        let mut tags = self.load_tags(&ids).await?;

        let annotated = HeartService::new(self.conn)
            .annotate(reviews, viewer)
            .await?;

        let mut data = Vec::with_capacity(annotated.len());
        for (review, heart_checked) in annotated {
            let seat = seats.get(&review.theater_seat_id).ok_or_else(|| {
                AppError::Internal(format!("Review {} has no seat", review.id))
            })?;
            let thumbnail = files
                .remove(&review.id)
                .and_then(|f| f.into_iter().next())
                .map(|f| f.file_path);
            let tag_names = tags
                .remove(&review.id)
                .unwrap_or_default()
                .into_iter()
                .map(|t| t.tag)
                .collect();

            data.push(ReviewListItem {
                review_id: review.id,
                grade: review.grade,
                floor: seat.floor,
                section: seat.section.clone(),
                row: seat.seat_row.clone(),
                seat: seat.seat,
                thumbnail,
                review_content: review.content,
                tags: tag_names,
                heart_checked,
                created_by: review.created_by,
                created_at: review.created_at,
            });
        }

        Ok(ReviewListResponse { data, pagination })
    }

    /// The latest reviews across all musicals.
    pub async fn recent_reviews(&self) -> Result<Vec<ReviewLiveResponse>, AppError> {
        let reviews = review::Entity::find()
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .limit(Some(LIVE_FEED_SIZE))
            .all(self.conn)
            .await?;

        let musical_ids: Vec<i32> = reviews.iter().map(|r| r.musical_id).collect();
        let musicals: HashMap<i32, musical::Model> = musical::Entity::find()
            .filter(musical::Column::Id.is_in(musical_ids))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        reviews
            .into_iter()
            .map(|r| {
                let musical = musicals.get(&r.musical_id).ok_or_else(|| {
                    AppError::Internal(format!("Review {} has no musical", r.id))
                })?;
                Ok(ReviewLiveResponse::new(r, musical))
            })
            .collect()
    }

    pub async fn heart(&self, member_id: i32, review_id: i32) -> Result<(), AppError> {
        find_review(self.conn, review_id).await?;
        HeartService::new(self.conn)
            .heart(review_id, member_id)
            .await?;
        Ok(())
    }

    pub async fn unheart(&self, member_id: i32, review_id: i32) -> Result<(), AppError> {
        find_review(self.conn, review_id).await?;
        HeartService::new(self.conn)
            .unheart(review_id, member_id)
            .await?;
        Ok(())
    }

    /// Files per review, each list in insertion order.
    async fn load_files(
        &self,
        review_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<review_file::Model>>, AppError> {
        let mut by_review: HashMap<i32, Vec<review_file::Model>> = HashMap::new();
        if review_ids.is_empty() {
            return Ok(by_review);
        }

        let files = review_file::Entity::find()
            .filter(review_file::Column::ReviewId.is_in(review_ids.to_vec()))
            .order_by_asc(review_file::Column::Id)
            .all(self.conn)
            .await?;
        for file in files {
            by_review.entry(file.review_id).or_default().push(file);
        }
        Ok(by_review)
    }

    /// Linked tags per review, each list sorted by name.
    async fn load_tags(
        &self,
        review_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<tag::Model>>, AppError> {
        let mut by_review: HashMap<i32, Vec<tag::Model>> = HashMap::new();
        if review_ids.is_empty() {
            return Ok(by_review);
        }

        let links = review_tag::Entity::find()
            .filter(review_tag::Column::ReviewId.is_in(review_ids.to_vec()))
            .all(self.conn)
            .await?;
        if links.is_empty() {
            return Ok(by_review);
        }

        let tag_ids: Vec<i32> = links.iter().map(|l| l.tag_id).collect();
        let tags: HashMap<i32, tag::Model> = tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_ids))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        for link in links {
            if let Some(tag) = tags.get(&link.tag_id) {
                by_review
                    .entry(link.review_id)
                    .or_default()
                    .push(tag.clone());
            }
        }
        for list in by_review.values_mut() {
            list.sort_by(|a, b| a.tag.cmp(&b.tag));
        }
        Ok(by_review)
    }
}
