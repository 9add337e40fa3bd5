use std::collections::HashSet;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    Set,
};

use crate::entity::{review, review_heart};

/// Reads and writes per-member hearts on reviews.
pub struct HeartService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> HeartService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Pair each review with whether `viewer` hearted it, preserving input order.
    ///
    /// Anonymous viewers get `false` everywhere without touching the database.
    pub async fn annotate(
        &self,
        reviews: Vec<review::Model>,
        viewer: Option<i32>,
    ) -> Result<Vec<(review::Model, bool)>, DbErr> {
        let Some(member_id) = viewer else {
            return Ok(reviews.into_iter().map(|r| (r, false)).collect());
        };
        if reviews.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = reviews.iter().map(|r| r.id).collect();
        let hearted: HashSet<i32> = review_heart::Entity::find()
            .filter(review_heart::Column::MemberId.eq(member_id))
            .filter(review_heart::Column::ReviewId.is_in(ids))
            .select_only()
            .column(review_heart::Column::ReviewId)
            .into_tuple::<i32>()
            .all(self.conn)
            .await?
            .into_iter()
            .collect();

        Ok(reviews
            .into_iter()
            .map(|r| {
                let liked = hearted.contains(&r.id);
                (r, liked)
            })
            .collect())
    }

    pub async fn is_hearted(&self, review_id: i32, viewer: Option<i32>) -> Result<bool, DbErr> {
        let Some(member_id) = viewer else {
            return Ok(false);
        };
        Ok(review_heart::Entity::find_by_id((review_id, member_id))
            .one(self.conn)
            .await?
            .is_some())
    }

    pub async fn count(&self, review_id: i32) -> Result<u64, DbErr> {
        review_heart::Entity::find()
            .filter(review_heart::Column::ReviewId.eq(review_id))
            .count(self.conn)
            .await
    }

    /// Record a heart. Hearting twice keeps a single row.
    pub async fn heart(&self, review_id: i32, member_id: i32) -> Result<(), DbErr> {
        let model = review_heart::ActiveModel {
            review_id: Set(review_id),
            member_id: Set(member_id),
            created_at: Set(Utc::now()),
        };

        let result = review_heart::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    review_heart::Column::ReviewId,
                    review_heart::Column::MemberId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Remove a heart. Returns whether a row was deleted.
    pub async fn unheart(&self, review_id: i32, member_id: i32) -> Result<bool, DbErr> {
        let res = review_heart::Entity::delete_by_id((review_id, member_id))
            .exec(self.conn)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
