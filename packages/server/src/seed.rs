use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use thiserror::Error;
use tracing::info;

use crate::entity::{member, musical, theater, theater_seat};
use crate::models::review::ReviewRequest;
use crate::review::ReviewBuilder;
use crate::types::{FloorType, GradeType, ScoreType};

pub const DEMO_THEATER: &str = "Daehakro Arts Theater";
pub const DEMO_MUSICAL: &str = "Ode to Death";
const DEMO_MEMBERS: usize = 16;

/// Seat layout of the demo theater: (floor, section, rows, seats per row, grade).
const DEMO_LAYOUT: &[(FloorType, &str, &[&str], i32, GradeType)] = &[
    (FloorType::Floor1, "A", &["1", "2"], 6, GradeType::Vip),
    (FloorType::Floor1, "B", &["1", "2", "3"], 8, GradeType::R),
    (FloorType::Floor2, "C", &["1", "2"], 8, GradeType::S),
    (FloorType::Floor2, "D", &["1"], 10, GradeType::A),
];

const DEMO_CONTENT: &[&str] = &[
    "August 4th, 1926, four in the morning.",
    "Two people vanish from the deck of a ferry in the dark.",
    "Forbidden love, forbidden romance.",
    "A story that was never allowed to be told.",
    "The ending is not beautiful, but it is honest.",
    "I was the only witness to all of it.",
    "Sing, so the truth sinks beneath the sea.",
    "Everything is different here, even the sunlight.",
    "The live string trio carried the whole second act.",
    "Sightlines from the side block were better than expected.",
];

const DEMO_IMAGES: &[&str] = &[
    "/static/demo/stage-01.jpg",
    "/static/demo/stage-02.jpg",
    "/static/demo/curtain-call.jpg",
    "/static/demo/seat-view-a.jpg",
    "/static/demo/seat-view-b.jpg",
    "/static/demo/poster.jpg",
];

const DEMO_TAGS: &[&str] = &[
    "1920s",
    "three_person_cast",
    "based_on_true_story",
    "live_piano",
    "violin",
    "cello",
    "string_trio",
    "10th_anniversary",
    "revival",
    "deck_scene",
    "tearjerker",
    "great_view",
    "obstructed_view",
    "opera_glass_needed",
];

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("demo catalog is missing: {0}")]
    MissingCatalog(&'static str),
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Insert the demo theater, its seats, the demo musical and demo members when absent.
pub async fn seed_catalog(db: &DatabaseConnection) -> Result<(), SeedError> {
    let txn = db.begin().await?;

    let theater = match theater::Entity::find()
        .filter(theater::Column::Name.eq(DEMO_THEATER))
        .one(&txn)
        .await?
    {
        Some(t) => t,
        None => {
            theater::ActiveModel {
                name: Set(DEMO_THEATER.to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    let mut seats_inserted = 0u32;
    for &(floor, section, rows, per_row, grade) in DEMO_LAYOUT {
        for &row in rows {
            for seat in 1..=per_row {
                let model = theater_seat::ActiveModel {
                    theater_id: Set(theater.id),
                    grade: Set(grade),
                    floor: Set(floor),
                    section: Set(section.to_string()),
                    seat_row: Set(row.to_string()),
                    seat: Set(seat),
                    ..Default::default()
                };

                let result = theater_seat::Entity::insert(model)
                    .on_conflict(
                        OnConflict::columns([
                            theater_seat::Column::TheaterId,
                            theater_seat::Column::Floor,
                            theater_seat::Column::Section,
                            theater_seat::Column::SeatRow,
                            theater_seat::Column::Seat,
                        ])
                        .do_nothing()
                        .to_owned(),
                    )
                    .exec_without_returning(&txn)
                    .await;

                match result {
                    Ok(_) => seats_inserted += 1,
                    Err(DbErr::RecordNotInserted) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }
    if seats_inserted > 0 {
        info!("Ensured {} theater seats", seats_inserted);
    }

    let has_musical = musical::Entity::find()
        .filter(musical::Column::Title.eq(DEMO_MUSICAL))
        .one(&txn)
        .await?
        .is_some();
    if !has_musical {
        musical::ActiveModel {
            title: Set(DEMO_MUSICAL.to_string()),
            poster_url: Set(Some("/static/demo/poster.jpg".to_string())),
            theater_id: Set(theater.id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        info!("Seeded musical '{}'", DEMO_MUSICAL);
    }

    let members = member::Entity::find().count(&txn).await?;
    let missing = (DEMO_MEMBERS as u64).saturating_sub(members);
    for i in 0..missing {
        member::ActiveModel {
            nickname: Set(format!("demo_member_{}", members + i + 1)),
            profile_img_url: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    if missing > 0 {
        info!("Seeded {} members", missing);
    }

    txn.commit().await?;
    Ok(())
}

/// Generate `count` random reviews for the demo musical. Returns the number inserted.
pub async fn seed_demo_reviews(db: &DatabaseConnection, count: u32) -> Result<u32, SeedError> {
    let mut rng = StdRng::from_rng(&mut rand::rng());
    seed_demo_reviews_with_rng(db, count, &mut rng).await
}

/// Same as [`seed_demo_reviews`] with a caller-supplied generator, for reproducible data.
pub async fn seed_demo_reviews_with_rng(
    db: &DatabaseConnection,
    count: u32,
    rng: &mut StdRng,
) -> Result<u32, SeedError> {
    let musical = musical::Entity::find()
        .filter(musical::Column::Title.eq(DEMO_MUSICAL))
        .one(db)
        .await?
        .ok_or(SeedError::MissingCatalog("musical"))?;
    let seats = theater_seat::Entity::find()
        .filter(theater_seat::Column::TheaterId.eq(musical.theater_id))
        .all(db)
        .await?;
    let members = member::Entity::find()
        .limit(Some(DEMO_MEMBERS as u64))
        .all(db)
        .await?;
    if seats.is_empty() {
        return Err(SeedError::MissingCatalog("theater seats"));
    }
    if members.is_empty() {
        return Err(SeedError::MissingCatalog("members"));
    }

    let scores: Vec<ScoreType> = ScoreType::iter().collect();

    let txn = db.begin().await?;
    let builder = ReviewBuilder::new(&txn);
    for _ in 0..count {
        let author = members.choose(rng).ok_or(SeedError::MissingCatalog("members"))?;
        let seat = seats
            .choose(rng)
            .ok_or(SeedError::MissingCatalog("theater seats"))?;

        let tag_count = rng.random_range(0..10);
        let tags = (0..tag_count)
            .filter_map(|_| DEMO_TAGS.choose(rng).copied())
            .collect::<Vec<_>>()
            .join(", ");

        let payload = ReviewRequest {
            grade: seat.grade,
            floor: seat.floor,
            section: seat.section.clone(),
            row: seat.seat_row.clone(),
            seat: seat.seat,
            review_content: DEMO_CONTENT
                .choose(rng)
                .copied()
                .unwrap_or_default()
                .to_string(),
            img_urls: DEMO_IMAGES
                .choose(rng)
                .map(|u| vec![u.to_string()])
                .unwrap_or_default(),
            gap: *scores.choose(rng).unwrap_or(&ScoreType::Normal),
            sight: *scores.choose(rng).unwrap_or(&ScoreType::Normal),
            sound: *scores.choose(rng).unwrap_or(&ScoreType::Normal),
            light: *scores.choose(rng).unwrap_or(&ScoreType::Normal),
            opera_glass: rng.random_bool(0.5),
            block: rng.random_bool(0.5),
            tags,
        };

        builder.build(author.id, seat, &musical, &payload).await?;
    }
    txn.commit().await?;

    Ok(count)
}
