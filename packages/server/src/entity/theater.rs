use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "theater")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(has_many)]
    pub seats: HasMany<super::theater_seat::Entity>,

    #[sea_orm(has_many)]
    pub musicals: HasMany<super::musical::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
