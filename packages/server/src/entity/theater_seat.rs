use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::{FloorType, GradeType};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "theater_seat")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "seat_position")]
    pub theater_id: i32,
    #[sea_orm(belongs_to, from = "theater_id", to = "id")]
    pub theater: HasOne<super::theater::Entity>,

    pub grade: GradeType,

    #[sea_orm(unique_key = "seat_position")]
    pub floor: FloorType,
    #[sea_orm(unique_key = "seat_position")]
    pub section: String,
    #[sea_orm(unique_key = "seat_position")]
    pub seat_row: String,
    #[sea_orm(unique_key = "seat_position")]
    pub seat: i32,

    #[sea_orm(has_many)]
    pub reviews: HasMany<super::review::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
