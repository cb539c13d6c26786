use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};

use crate::error::{ApiError, Result};
use crate::service::AuthService;

/// Token subject of an `Authorization: Bearer <token>` request.
///
/// Taking this as a handler argument is what makes a route authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerSubject(pub String);

impl BearerSubject {
    pub fn username(&self) -> &str {
        &self.0
    }
}

impl FromRequest for BearerSubject {
    type Error = ApiError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<BearerSubject> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let token = value
        .to_str()
        .ok()
        .and_then(|raw| raw.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Invalid token. Please log in again."))?;

    let auth = req
        .app_data::<web::Data<AuthService>>()
        .ok_or_else(|| ApiError::Internal("auth service not registered".to_string()))?;

    auth.validate_token(token).map(BearerSubject)
}
