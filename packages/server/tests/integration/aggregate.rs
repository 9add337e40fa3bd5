use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};

use podor_server::entity::{review, review_file, review_heart, review_tag, tag, theater_seat};
use podor_server::models::review::ReviewRequest;
use podor_server::review::{HeartService, ReviewBuilder, ReviewService, TagResolver};
use podor_server::types::{FloorType, GradeType, ScoreType};

use crate::common::{create_member, demo_musical, test_db};

fn request(tags: &str, img_urls: &[&str]) -> ReviewRequest {
    ReviewRequest {
        grade: GradeType::R,
        floor: FloorType::Floor1,
        section: "B".into(),
        row: "1".into(),
        seat: 1,
        review_content: "  Sat close enough to see every expression.  ".into(),
        img_urls: img_urls.iter().map(|u| u.to_string()).collect(),
        gap: ScoreType::Good,
        sight: ScoreType::Great,
        sound: ScoreType::Normal,
        light: ScoreType::Bad,
        opera_glass: false,
        block: false,
        tags: tags.into(),
    }
}

async fn tag_names(db: &DatabaseConnection) -> Vec<String> {
    let mut names: Vec<String> = tag::Entity::find()
        .all(db)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.tag)
        .collect();
    names.sort();
    names
}

async fn links_of(db: &DatabaseConnection, review_id: i32) -> Vec<review_tag::Model> {
    review_tag::Entity::find()
        .filter(review_tag::Column::ReviewId.eq(review_id))
        .all(db)
        .await
        .unwrap()
}

async fn tag_id(db: &DatabaseConnection, name: &str) -> i32 {
    tag::Entity::find()
        .filter(tag::Column::Tag.eq(name))
        .one(db)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("tag '{name}' should exist"))
        .id
}

#[tokio::test]
async fn resolve_dedups_and_trims_names() {
    let db = test_db().await;

    let tags = TagResolver::new(&db)
        .resolve(" musical , classic,musical,, ")
        .await
        .unwrap();

    let names: Vec<&str> = tags.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(names, vec!["classic", "musical"]);
    assert_eq!(tag_names(&db).await, vec!["classic", "musical"]);
}

#[tokio::test]
async fn resolve_empty_input_writes_nothing() {
    let db = test_db().await;
    let resolver = TagResolver::new(&db);

    assert!(resolver.resolve("").await.unwrap().is_empty());
    assert!(resolver.resolve(" , ,, ").await.unwrap().is_empty());
    assert_eq!(tag::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn resolve_reuses_existing_tags() {
    let db = test_db().await;
    let resolver = TagResolver::new(&db);

    let first = resolver.resolve("revival").await.unwrap();
    let second = resolver.resolve("revival, violin").await.unwrap();

    assert_eq!(tag::Entity::find().count(&db).await.unwrap(), 2);
    let revival = second.iter().find(|t| t.tag == "revival").unwrap();
    assert_eq!(revival.id, first[0].id);
}

#[tokio::test]
async fn insert_names_skips_names_created_since_lookup() {
    let db = test_db().await;
    let resolver = TagResolver::new(&db);
    let names = vec!["deck_scene".to_string()];

    // A second caller inserting the same name after the first one committed.
    resolver.insert_names(&names).await.unwrap();
    resolver.insert_names(&names).await.unwrap();
    assert_eq!(tag::Entity::find().count(&db).await.unwrap(), 1);

    let mixed = vec!["deck_scene".to_string(), "tearjerker".to_string()];
    resolver.insert_names(&mixed).await.unwrap();
    assert_eq!(tag_names(&db).await, vec!["deck_scene", "tearjerker"]);

    let tags = resolver.resolve("tearjerker, deck_scene").await.unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tag::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn build_attaches_files_in_order_and_distinct_tags() {
    let db = test_db().await;
    let musical = demo_musical(&db).await;
    let author = create_member(&db, "builder").await;
    let seat = theater_seat::Entity::find()
        .filter(theater_seat::Column::Section.eq("B"))
        .filter(theater_seat::Column::SeatRow.eq("1"))
        .filter(theater_seat::Column::Seat.eq(1))
        .one(&db)
        .await
        .unwrap()
        .unwrap();

    let txn = db.begin().await.unwrap();
    let aggregate = ReviewBuilder::new(&txn)
        .build(
            author,
            &seat,
            &musical,
            &request("musical, classic, musical", &["u1", " u2 "]),
        )
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let paths: Vec<&str> = aggregate
        .files
        .iter()
        .map(|f| f.file_path.as_str())
        .collect();
    assert_eq!(paths, vec!["u1", "u2"]);
    let tags: Vec<&str> = aggregate.tags.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(tags, vec!["classic", "musical"]);
    assert_eq!(aggregate.review.created_by, author);
    assert_eq!(aggregate.review.theater_seat_id, seat.id);
    assert_eq!(
        aggregate.review.content,
        "Sat close enough to see every expression."
    );

    assert_eq!(links_of(&db, aggregate.review.id).await.len(), 2);
}

#[tokio::test]
async fn rolled_back_transaction_leaves_no_partial_review() {
    let db = test_db().await;
    let musical = demo_musical(&db).await;
    let author = create_member(&db, "quitter").await;

    let txn = db.begin().await.unwrap();
    ReviewService::new(&txn)
        .create_review(author, musical.id, &request("rollback", &["u1"]))
        .await
        .unwrap();
    txn.rollback().await.unwrap();

    assert_eq!(review::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(review_file::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(review_tag::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(tag::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn update_keeps_retained_links_and_replaces_the_rest() {
    let db = test_db().await;
    let musical = demo_musical(&db).await;
    let author = create_member(&db, "editor").await;
    let service = ReviewService::new(&db);

    let created = service
        .create_review(author, musical.id, &request("a, b", &["u1"]))
        .await
        .unwrap();
    let review_id = created.review.id;
    let a_id = tag_id(&db, "a").await;
    let b_id = tag_id(&db, "b").await;
    let b_link_before = links_of(&db, review_id)
        .await
        .into_iter()
        .find(|l| l.tag_id == b_id)
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;

    let updated = service
        .update_review(author, musical.id, review_id, &request("b, c", &["u2"]))
        .await
        .unwrap();

    let tags: Vec<&str> = updated.tags.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(tags, vec!["b", "c"]);

    let links = links_of(&db, review_id).await;
    assert_eq!(links.len(), 2);
    let b_link_after = links.iter().find(|l| l.tag_id == b_id).unwrap();
    assert_eq!(b_link_after.created_at, b_link_before.created_at);
    assert!(links.iter().all(|l| l.tag_id != a_id));

    // The unlinked tag row itself is kept.
    assert_eq!(tag_names(&db).await, vec!["a", "b", "c"]);

    let paths: Vec<&str> = updated
        .files
        .iter()
        .map(|f| f.file_path.as_str())
        .collect();
    assert_eq!(paths, vec!["u1", "u2"]);
    assert!(updated.review.updated_at > created.review.updated_at);
}

#[tokio::test]
async fn update_by_other_member_is_rejected_without_writes() {
    let db = test_db().await;
    let musical = demo_musical(&db).await;
    let author = create_member(&db, "owner").await;
    let intruder = create_member(&db, "intruder").await;
    let service = ReviewService::new(&db);

    let created = service
        .create_review(author, musical.id, &request("a", &["u1"]))
        .await
        .unwrap();

    let err = service
        .update_review(intruder, musical.id, created.review.id, &request("z", &["x"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        podor_server::error::AppError::PermissionDenied
    ));

    let err = service
        .delete_review(intruder, musical.id, created.review.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        podor_server::error::AppError::PermissionDenied
    ));

    let stored = review::Entity::find_by_id(created.review.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, created.review);
    assert_eq!(tag_names(&db).await, vec!["a"]);
    assert_eq!(review_file::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn delete_removes_children_but_keeps_tags() {
    let db = test_db().await;
    let musical = demo_musical(&db).await;
    let author = create_member(&db, "deleter").await;
    let fan = create_member(&db, "fan").await;
    let service = ReviewService::new(&db);

    let created = service
        .create_review(author, musical.id, &request("a, b", &["u1", "u2"]))
        .await
        .unwrap();
    service.heart(fan, created.review.id).await.unwrap();

    service
        .delete_review(author, musical.id, created.review.id)
        .await
        .unwrap();

    assert_eq!(review::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(review_file::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(review_tag::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(review_heart::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(tag_names(&db).await, vec!["a", "b"]);
}

#[tokio::test]
async fn annotate_reports_per_viewer_hearts() {
    let db = test_db().await;
    let musical = demo_musical(&db).await;
    let author = create_member(&db, "writer").await;
    let viewer = create_member(&db, "viewer").await;
    let service = ReviewService::new(&db);

    let x = service
        .create_review(author, musical.id, &request("", &[]))
        .await
        .unwrap()
        .review;
    let y = service
        .create_review(author, musical.id, &request("", &[]))
        .await
        .unwrap()
        .review;

    let hearts = HeartService::new(&db);
    hearts.heart(x.id, viewer).await.unwrap();

    let annotated = hearts
        .annotate(vec![x.clone(), y.clone()], Some(viewer))
        .await
        .unwrap();
    assert_eq!(annotated.len(), 2);
    assert_eq!(annotated[0], (x.clone(), true));
    assert_eq!(annotated[1], (y.clone(), false));

    let anonymous = hearts.annotate(vec![x, y], None).await.unwrap();
    assert!(anonymous.iter().all(|(_, checked)| !checked));
}

#[tokio::test]
async fn heart_is_idempotent_and_unheart_tolerates_absence() {
    let db = test_db().await;
    let musical = demo_musical(&db).await;
    let author = create_member(&db, "poet").await;
    let fan = create_member(&db, "devotee").await;

    let review = ReviewService::new(&db)
        .create_review(author, musical.id, &request("", &[]))
        .await
        .unwrap()
        .review;
    let hearts = HeartService::new(&db);

    assert!(!hearts.unheart(review.id, fan).await.unwrap());

    hearts.heart(review.id, fan).await.unwrap();
    hearts.heart(review.id, fan).await.unwrap();
    assert_eq!(hearts.count(review.id).await.unwrap(), 1);
    assert!(hearts.is_hearted(review.id, Some(fan)).await.unwrap());
    assert!(!hearts.is_hearted(review.id, Some(author)).await.unwrap());
    assert!(!hearts.is_hearted(review.id, None).await.unwrap());

    assert!(hearts.unheart(review.id, fan).await.unwrap());
    assert_eq!(hearts.count(review.id).await.unwrap(), 0);
}

#[tokio::test]
async fn seeded_reviews_use_existing_seats_and_tags() {
    let db = test_db().await;
    let mut rng = StdRng::seed_from_u64(7);

    let inserted = podor_server::seed::seed_demo_reviews_with_rng(&db, 25, &mut rng)
        .await
        .unwrap();

    assert_eq!(inserted, 25);
    assert_eq!(review::Entity::find().count(&db).await.unwrap(), 25);
    assert_eq!(review_file::Entity::find().count(&db).await.unwrap(), 25);

    // Re-seeding the catalog adds no duplicate seats.
    let seats = theater_seat::Entity::find().count(&db).await.unwrap();
    podor_server::seed::seed_catalog(&db).await.unwrap();
    assert_eq!(theater_seat::Entity::find().count(&db).await.unwrap(), seats);

    let names = tag_names(&db).await;
    let mut deduped = names.clone();
    deduped.dedup();
    assert_eq!(names, deduped);
}
