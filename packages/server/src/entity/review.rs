use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::{GradeType, ScoreType};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub musical_id: i32,
    #[sea_orm(belongs_to, from = "musical_id", to = "id")]
    pub musical: HasOne<super::musical::Entity>,

    pub theater_seat_id: i32,
    #[sea_orm(belongs_to, from = "theater_seat_id", to = "id")]
    pub theater_seat: HasOne<super::theater_seat::Entity>,

    pub grade: GradeType,
    pub gap: ScoreType,
    pub sight: ScoreType,
    pub sound: ScoreType,
    pub light: ScoreType,
    pub opera_glass: bool,
    pub block: bool,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Member id of the author. Only the author may edit or delete the review.
    #[sea_orm(indexed)]
    pub created_by: i32,

    #[sea_orm(has_many)]
    pub files: HasMany<super::review_file::Entity>,

    #[sea_orm(has_many, via = "review_tag")]
    pub tags: HasMany<super::tag::Entity>,

    #[sea_orm(has_many)]
    pub hearts: HasMany<super::review_heart::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
