use std::net::SocketAddr;

use reqwest::Client;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use serde_json::{Value, json};

use podor_server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, SeedConfig, ServerConfig,
};
use podor_server::entity::{member, musical, theater};
use podor_server::state::AppState;
use podor_server::utils::jwt;

pub const JWT_SECRET: &str = "test-secret-for-integration-tests";

pub mod routes {
    pub const LIVE: &str = "/api/v1/reviews/live";

    pub fn musical_reviews(musical_id: i32) -> String {
        format!("/api/v1/musicals/{musical_id}/reviews")
    }

    pub fn musical_review(musical_id: i32, review_id: i32) -> String {
        format!("/api/v1/musicals/{musical_id}/reviews/{review_id}")
    }

    pub fn heart(review_id: i32) -> String {
        format!("/api/v1/reviews/{review_id}/heart")
    }
}

/// Fresh in-memory database with the schema and the demo catalog.
///
/// A single pooled connection keeps the in-memory database alive and shared.
pub async fn test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to open in-memory database");
    podor_server::database::sync_schema(&db)
        .await
        .expect("Failed to create schema");
    podor_server::seed::seed_catalog(&db)
        .await
        .expect("Failed to seed catalog");
    db
}

/// ID of the seeded demo musical.
pub async fn demo_musical(db: &DatabaseConnection) -> musical::Model {
    musical::Entity::find()
        .filter(musical::Column::Title.eq(podor_server::seed::DEMO_MUSICAL))
        .one(db)
        .await
        .expect("DB query failed")
        .expect("demo musical should be seeded")
}

/// Create a second musical in a new theater with no seats.
pub async fn seatless_musical(db: &DatabaseConnection) -> i32 {
    let theater = theater::ActiveModel {
        name: Set("Empty Hall".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert theater");
    musical::ActiveModel {
        title: Set("Unstaged".to_string()),
        poster_url: Set(None),
        theater_id: Set(theater.id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert musical")
    .id
}

/// Insert a member and return its id.
pub async fn create_member(db: &DatabaseConnection, nickname: &str) -> i32 {
    member::ActiveModel {
        nickname: Set(nickname.to_string()),
        profile_img_url: Set(Some(format!("/static/profile/{nickname}.png"))),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert member")
    .id
}

/// A valid review payload for seat FLOOR1 / B / 1 / 1, which is seeded as grade R.
pub fn review_body(tags: &str, img_urls: &[&str]) -> Value {
    json!({
        "grade": "R",
        "floor": "FLOOR1",
        "section": "B",
        "row": "1",
        "seat": 1,
        "reviewContent": "The deck scene was breathtaking.",
        "imgUrls": img_urls,
        "gap": "GOOD",
        "sight": "GREAT",
        "sound": "NORMAL",
        "light": "GOOD",
        "operaGlass": false,
        "block": true,
        "tags": tags,
    })
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub musical_id: i32,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db = test_db().await;
        let musical_id = demo_musical(&db).await.id;

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
            },
            seed: SeedConfig::default(),
        };

        let state = AppState {
            db: db.clone(),
            config,
        };
        let app = podor_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            musical_id,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Insert a member and return `(member_id, token)`.
    pub async fn create_member_with_token(&self, nickname: &str) -> (i32, String) {
        let id = create_member(&self.db, nickname).await;
        let token = jwt::sign(id, nickname, JWT_SECRET).expect("Failed to sign token");
        (id, token)
    }

    /// Create a review through the API and return its `reviewId`.
    pub async fn create_review(&self, token: &str, tags: &str, img_urls: &[&str]) -> i32 {
        let res = self
            .post_with_token(
                &routes::musical_reviews(self.musical_id),
                &review_body(tags, img_urls),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_review failed: {}", res.text);
        res.review_id()
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn put_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn review_id(&self) -> i32 {
        self.body["reviewId"]
            .as_i64()
            .expect("response body should contain 'reviewId'") as i32
    }

    /// String array field as a `Vec<String>`.
    pub fn strings(&self, field: &str) -> Vec<String> {
        self.body[field]
            .as_array()
            .unwrap_or_else(|| panic!("response body should contain array '{field}'"))
            .iter()
            .map(|v| v.as_str().expect("array of strings").to_string())
            .collect()
    }
}
