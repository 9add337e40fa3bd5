use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::entity::{review, review_heart};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    sync_schema(&db).await?;

    Ok(db)
}

/// Create or migrate every table registered under `entity`.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("podor_server::entity::*")
        .sync(db)
        .await
}

/// Ensure composite indexes that schema sync does not derive from the entities.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();

    // Musical review listing: WHERE musical_id = ? ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_review_musical_created")
        .table(review::Entity)
        .col(review::Column::MusicalId)
        .col(review::Column::CreatedAt)
        .to_owned();
    match db.execute_raw(backend.build(&stmt)).await {
        Ok(_) => info!("Ensured index idx_review_musical_created exists"),
        Err(e) => tracing::warn!("Failed to create index idx_review_musical_created: {}", e),
    }

    // Heart annotation: WHERE member_id = ? AND review_id IN (...)
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_review_heart_member")
        .table(review_heart::Entity)
        .col(review_heart::Column::MemberId)
        .col(review_heart::Column::ReviewId)
        .to_owned();
    match db.execute_raw(backend.build(&stmt)).await {
        Ok(_) => info!("Ensured index idx_review_heart_member exists"),
        Err(e) => tracing::warn!("Failed to create index idx_review_heart_member: {}", e),
    }

    Ok(())
}
