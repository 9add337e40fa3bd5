use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tracing::info;

use super::tag_resolver::TagResolver;
use crate::entity::{musical, review, review_file, review_tag, tag, theater_seat};
use crate::models::review::ReviewRequest;

/// A review together with the rows it owns or links to.
#[derive(Clone, Debug)]
pub struct ReviewAggregate {
    pub review: review::Model,
    pub seat: theater_seat::Model,
    /// Attached images in insertion order.
    pub files: Vec<review_file::Model>,
    /// Linked tags sorted by name.
    pub tags: Vec<tag::Model>,
}

/// Writes review aggregates. The only place that creates review files and tag links.
///
/// Parents passed in are trusted: callers resolve and check them beforehand. Run every
/// call inside a transaction so a failure never leaves a review without its children.
pub struct ReviewBuilder<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ReviewBuilder<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create a new review authored by `author`.
    pub async fn build(
        &self,
        author: i32,
        seat: &theater_seat::Model,
        musical: &musical::Model,
        payload: &ReviewRequest,
    ) -> Result<ReviewAggregate, DbErr> {
        let tags = TagResolver::new(self.conn).resolve(&payload.tags).await?;

        let now = Utc::now();
        let review = review::ActiveModel {
            musical_id: Set(musical.id),
            theater_seat_id: Set(seat.id),
            grade: Set(payload.grade),
            gap: Set(payload.gap),
            sight: Set(payload.sight),
            sound: Set(payload.sound),
            light: Set(payload.light),
            opera_glass: Set(payload.opera_glass),
            block: Set(payload.block),
            content: Set(payload.review_content.trim().to_string()),
            created_by: Set(author),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        let files = self.append_files(review.id, &payload.img_urls).await?;
        self.attach_tags(review.id, &tags, &HashSet::new()).await?;

        info!(
            review_id = review.id,
            musical_id = musical.id,
            files = files.len(),
            tags = tags.len(),
            "Review created"
        );

        Ok(ReviewAggregate {
            review,
            seat: seat.clone(),
            files,
            tags,
        })
    }

    /// Apply `payload` to an existing review, keeping its id and author.
    ///
    /// Images are appended to the ones already attached. The tag set is replaced: links
    /// for new tags are attached first, then links for tags no longer present are deleted.
    /// Links for tags kept across the edit are not touched.
    pub async fn update(
        &self,
        review: review::Model,
        seat: &theater_seat::Model,
        musical: &musical::Model,
        payload: &ReviewRequest,
    ) -> Result<ReviewAggregate, DbErr> {
        let tags = TagResolver::new(self.conn).resolve(&payload.tags).await?;

        let mut active: review::ActiveModel = review.into();
        active.musical_id = Set(musical.id);
        active.theater_seat_id = Set(seat.id);
        active.grade = Set(payload.grade);
        active.gap = Set(payload.gap);
        active.sight = Set(payload.sight);
        active.sound = Set(payload.sound);
        active.light = Set(payload.light);
        active.opera_glass = Set(payload.opera_glass);
        active.block = Set(payload.block);
        active.content = Set(payload.review_content.trim().to_string());
        active.updated_at = Set(Utc::now());
        let review = active.update(self.conn).await?;

        self.append_files(review.id, &payload.img_urls).await?;

        let previous = review_tag::Entity::find()
            .filter(review_tag::Column::ReviewId.eq(review.id))
            .all(self.conn)
            .await?;
        let previous_tag_ids: HashSet<i32> = previous.iter().map(|l| l.tag_id).collect();

        self.attach_tags(review.id, &tags, &previous_tag_ids).await?;

        let kept: HashSet<i32> = tags.iter().map(|t| t.id).collect();
        let stale: Vec<i32> = previous
            .iter()
            .map(|l| l.tag_id)
            .filter(|id| !kept.contains(id))
            .collect();
        if !stale.is_empty() {
            review_tag::Entity::delete_many()
                .filter(review_tag::Column::ReviewId.eq(review.id))
                .filter(review_tag::Column::TagId.is_in(stale))
                .exec(self.conn)
                .await?;
        }

        let files = review_file::Entity::find()
            .filter(review_file::Column::ReviewId.eq(review.id))
            .order_by_asc(review_file::Column::Id)
            .all(self.conn)
            .await?;

        info!(
            review_id = review.id,
            files = files.len(),
            tags = tags.len(),
            "Review updated"
        );

        Ok(ReviewAggregate {
            review,
            seat: seat.clone(),
            files,
            tags,
        })
    }

    /// Insert one file row per URL, in order, so ids follow the input order.
    async fn append_files(
        &self,
        review_id: i32,
        urls: &[String],
    ) -> Result<Vec<review_file::Model>, DbErr> {
        let mut files = Vec::with_capacity(urls.len());
        for url in urls {
            let file = review_file::ActiveModel {
                review_id: Set(review_id),
                file_path: Set(url.trim().to_string()),
                ..Default::default()
            }
            .insert(self.conn)
            .await?;
            files.push(file);
        }
        Ok(files)
    }

    /// Link `tags` to the review, skipping tag ids in `already_linked`.
    async fn attach_tags(
        &self,
        review_id: i32,
        tags: &[tag::Model],
        already_linked: &HashSet<i32>,
    ) -> Result<(), DbErr> {
        let now = Utc::now();
        let links: Vec<review_tag::ActiveModel> = tags
            .iter()
            .filter(|t| !already_linked.contains(&t.id))
            .map(|t| review_tag::ActiveModel {
                review_id: Set(review_id),
                tag_id: Set(t.id),
                created_at: Set(now),
            })
            .collect();

        if links.is_empty() {
            return Ok(());
        }

        review_tag::Entity::insert_many(links)
            .exec_without_returning(self.conn)
            .await?;
        Ok(())
    }
}
