#![allow(dead_code)]

use std::time::Duration;

use actix_web::http::header::{self, HeaderName};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vulnapi::app::AppState;
use vulnapi::auth_token::{now_secs, TokenService};
use vulnapi::config::BootstrapConfig;
use vulnapi::db::{seed, Database};
use vulnapi::mode::{Mode, ModeController};

pub const NAME2_BOOK: &str = "bookTitle42";
pub const NAME2_SECRET: &str = "secret for bookTitle42";
pub const TOKEN_TTL: Duration = Duration::from_secs(60);

/// Size used by `/createdb` in tests.
pub fn bootstrap() -> BootstrapConfig {
    BootstrapConfig {
        users: 2,
        books_per_user: 1,
        populate_on_start: false,
    }
}

/// In-memory state holding `admin`, `name1`, `name2` and one book of `name2`.
pub async fn seeded_state(mode: Mode) -> AppState {
    let db = Database::in_memory().await.expect("in-memory db");
    db.init_schema().await.expect("schema");

    let defaults_only = BootstrapConfig {
        users: 0,
        books_per_user: 0,
        populate_on_start: false,
    };
    seed::populate(&db, &defaults_only, &mut StdRng::seed_from_u64(5))
        .await
        .expect("seed");

    let name2 = db
        .users()
        .list()
        .await
        .expect("users")
        .into_iter()
        .find(|user| user.username == "name2")
        .expect("name2 seeded");
    db.books()
        .insert(NAME2_BOOK, NAME2_SECRET, name2.id)
        .await
        .expect("book");

    AppState::new(db, ModeController::new(mode, TOKEN_TTL), bootstrap())
}

pub fn token_issued_at(subject: &str, issued_at: i64) -> String {
    TokenService::new(TOKEN_TTL)
        .issue(subject, issued_at)
        .expect("token")
}

/// `Authorization` header for a token minted with the public signing secret.
pub fn bearer(subject: &str) -> (HeaderName, String) {
    bearer_token(&token_issued_at(subject, now_secs()))
}

pub fn bearer_token(token: &str) -> (HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

pub const BOTH_MODES: [Mode; 2] = [Mode::Vulnerable, Mode::Secure];
