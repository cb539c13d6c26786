use actix_web::{delete, get, put, web, HttpResponse};
use vulnapi_protocol::{StatusMessage, UpdateEmailRequest, UpdatePasswordRequest, UsersResponse};

use crate::{error::Result, extractors::BearerSubject, service::UserService};

#[get("/users/v1")]
pub async fn list_users(users: web::Data<UserService>) -> Result<HttpResponse> {
    let users = users.list_users().await?;
    Ok(HttpResponse::Ok().json(UsersResponse { users }))
}

/// Unauthenticated and served in both modes.
#[get("/users/v1/_debug")]
pub async fn debug_users(users: web::Data<UserService>) -> Result<HttpResponse> {
    let users = users.debug_list_users().await?;
    Ok(HttpResponse::Ok().json(UsersResponse { users }))
}

#[get("/users/v1/{username}")]
pub async fn get_user(
    path: web::Path<String>,
    users: web::Data<UserService>,
) -> Result<HttpResponse> {
    let user = users.get_user(&path).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[delete("/users/v1/{username}")]
pub async fn delete_user(
    path: web::Path<String>,
    subject: BearerSubject,
    users: web::Data<UserService>,
) -> Result<HttpResponse> {
    users.delete_user(subject.username(), &path).await?;
    Ok(HttpResponse::Ok().json(StatusMessage::success("User deleted.")))
}

#[put("/users/v1/{username}/email")]
pub async fn update_email(
    path: web::Path<String>,
    req: web::Json<UpdateEmailRequest>,
    subject: BearerSubject,
    users: web::Data<UserService>,
) -> Result<HttpResponse> {
    users
        .update_email(subject.username(), &path, &req.email)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[put("/users/v1/{username}/password")]
pub async fn update_password(
    path: web::Path<String>,
    req: web::Json<UpdatePasswordRequest>,
    subject: BearerSubject,
    users: web::Data<UserService>,
) -> Result<HttpResponse> {
    users
        .update_password(subject.username(), &path, &req.password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
