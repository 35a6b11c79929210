//! Shared helpers for integration tests
//!
//! Every test gets its own in-memory database, a signed-in user, and
//! deterministic builders for poll data.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::{DateTime, TimeZone, Utc};
use polls_api::api::{self, AppState};
use polls_api::auth::jwt::create_token;
use polls_api::auth::password::unusable_password;
use polls_api::config::Config;
use polls_api::domain::poll::{ChoiceText, NewChoice, NewQuestion, Question, QuestionText};
use polls_api::domain::repositories::{ChoiceRepository, QuestionRepository, UserRepository};
use polls_api::domain::user::{NewUser, User, Username};
use polls_api::infrastructure::repositories::{
    SqliteChoiceRepository, SqliteQuestionRepository, SqliteUserRepository,
};
use polls_api::infrastructure::Database;
use proptest::prelude::Rng;
use proptest::test_runner::{RngAlgorithm, TestRng};
use serde_json::Value;
use tower::util::ServiceExt; // for oneshot

pub mod statements;

pub const BASE_URL: &str = "http://testserver";
pub const JWT_SECRET: &str = "integration-test-secret";

/// Set up test database with the schema applied
pub async fn setup_test_db() -> Database {
    let db = Database::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        public_url: BASE_URL.to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        page_size: 10,
        ..Config::default()
    }
}

/// Create a user without a usable password
pub async fn create_test_user(db: &Database, username: &str) -> User {
    SqliteUserRepository::new(db.clone())
        .create(&NewUser {
            username: Username::new(username).expect("valid username"),
            email: None,
            password_hash: unusable_password(),
            groups: Vec::new(),
        })
        .await
        .expect("Failed to create test user")
}

/// A running application plus a bearer token for its test user
pub struct TestApp {
    pub state: AppState,
    pub user: User,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "tester").await;
        let token = create_token(user.id, JWT_SECRET).expect("Failed to create token");

        Self {
            state: AppState::new(db, test_config()),
            user,
            token,
        }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    /// Sends a request, optionally authenticated, and decodes the JSON reply
    ///
    /// Empty bodies decode to `Value::Null`, non-JSON bodies to a string.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = api::router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Authenticated request as the test user
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, body, Some(&self.token)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }
}

/// Deterministic generator for test fixtures
pub fn seeded_rng(seed: u64) -> TestRng {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&seed.to_le_bytes());
    TestRng::from_seed(RngAlgorithm::ChaCha, &bytes)
}

pub fn fixed_pub_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

/// Create `count` questions, each with 0 to `max_choices` choices
///
/// The same seed always yields the same texts and choice counts.
pub async fn seed_questions(
    db: &Database,
    count: usize,
    max_choices: u64,
    seed: u64,
) -> Vec<Question> {
    let questions = SqliteQuestionRepository::new(db.clone());
    let choices = SqliteChoiceRepository::new(db.clone());
    let mut rng = seeded_rng(seed);

    let mut created = Vec::with_capacity(count);
    for i in 0..count {
        let question = questions
            .create(&NewQuestion::new(
                QuestionText::new(format!("Question {} (seed {})", i, seed)).unwrap(),
                fixed_pub_date(),
            ))
            .await
            .expect("Failed to create question");

        for c in 0..rng.gen_range(0..=max_choices) {
            choices
                .create(&NewChoice {
                    question_id: question.id(),
                    choice_text: ChoiceText::new(format!("Choice {}", c)).unwrap(),
                    votes: rng.gen_range(0..50),
                })
                .await
                .expect("Failed to create choice");
        }

        created.push(
            questions
                .find_by_id(question.id())
                .await
                .unwrap()
                .expect("question just created"),
        );
    }
    created
}

pub fn question_url(id: i64) -> String {
    format!("{}/api/questions/{}/", BASE_URL, id)
}
