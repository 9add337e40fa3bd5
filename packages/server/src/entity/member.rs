use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Read-only view of a platform member. Accounts are managed by the identity service.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub nickname: String,
    pub profile_img_url: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
