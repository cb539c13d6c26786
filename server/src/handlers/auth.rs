use actix_web::{get, post, web, HttpResponse};
use vulnapi_protocol::{
    LoginRequest, LoginResponse, MeResponse, RegisterRequest, StatusMessage, STATUS_SUCCESS,
};

use crate::{
    error::Result,
    extractors::BearerSubject,
    service::{AuthService, UserService},
};

#[post("/users/v1/register")]
pub async fn register(
    req: web::Json<RegisterRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse> {
    auth.register(&req).await?;

    Ok(HttpResponse::Ok().json(StatusMessage::success(
        "Successfully registered. Login to receive an auth token.",
    )))
}

#[post("/users/v1/login")]
pub async fn login(
    req: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse> {
    let auth_token = auth.login(&req).await?;

    let response = LoginResponse {
        status: STATUS_SUCCESS.to_string(),
        message: "Successfully logged in.".to_string(),
        auth_token,
    };

    Ok(HttpResponse::Ok().json(response))
}

#[get("/me")]
pub async fn me(subject: BearerSubject, users: web::Data<UserService>) -> Result<HttpResponse> {
    let data = users.me(subject.username()).await?;

    Ok(HttpResponse::Ok().json(MeResponse {
        status: STATUS_SUCCESS.to_string(),
        data,
    }))
}
