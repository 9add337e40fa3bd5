use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An image attached to a review. Ordered by `id`, which follows insertion order.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub review_id: i32,
    #[sea_orm(belongs_to, from = "review_id", to = "id")]
    pub review: HasOne<super::review::Entity>,

    #[sea_orm(column_type = "Text")]
    pub file_path: String,
}

impl ActiveModelBehavior for ActiveModel {}
