use actix_web::{get, web, HttpResponse};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use vulnapi_protocol::ServiceInfo;

use crate::{
    config::BootstrapConfig,
    db::{seed, Database},
    error::Result,
    mode::ModeController,
};

#[get("/")]
pub async fn index(mode: web::Data<ModeController>) -> HttpResponse {
    let response = ServiceInfo {
        message: "VulnAPI: a deliberately vulnerable REST API".to_string(),
        help: "Register with POST /users/v1/register, log in with POST /users/v1/login, \
               then send the auth_token as 'Authorization: Bearer <token>'."
            .to_string(),
        vulnerable: mode.is_vulnerable(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    HttpResponse::Ok().json(response)
}

#[derive(Debug, Serialize)]
pub struct CreateDbResponse {
    pub message: String,
}

/// Drops both tables and writes a fresh sample population.
#[get("/createdb")]
pub async fn create_db(
    db: web::Data<Database>,
    bootstrap: web::Data<BootstrapConfig>,
) -> Result<HttpResponse> {
    db.reset().await?;
    let report = seed::populate(&db, &bootstrap, &mut StdRng::from_entropy()).await?;

    log::info!(
        "Database repopulated with {} users and {} books",
        report.users,
        report.books
    );

    let response = CreateDbResponse {
        message: "Database populated.".to_string(),
    };

    Ok(HttpResponse::Ok().json(response))
}
