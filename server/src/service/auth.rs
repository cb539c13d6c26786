use std::sync::Arc;

use vulnapi_protocol::{LoginRequest, RegisterRequest};

use super::{find_user, require_non_empty};
use crate::auth_token::{now_secs, TokenService};
use crate::db::{NewUser, Predicate, QueryLayer, User, UserRepository};
use crate::error::Result;
use crate::policy::{LoginFailure, SecurityPolicy};

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    lookup: QueryLayer,
    policy: Arc<dyn SecurityPolicy>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(
        users: UserRepository,
        lookup: QueryLayer,
        policy: Arc<dyn SecurityPolicy>,
        tokens: TokenService,
    ) -> Self {
        Self {
            users,
            lookup,
            policy,
            tokens,
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        require_non_empty("username", &request.username)?;
        require_non_empty("password", &request.password)?;
        self.policy.validate_email(&request.email)?;

        let admin = self.policy.grant_admin(request.admin);
        if request.admin.unwrap_or(false) && !admin {
            log::warn!(
                "Ignoring admin flag supplied in registration of {}",
                request.username
            );
        }

        let user = self
            .users
            .insert(&NewUser {
                username: request.username.clone(),
                password: request.password.clone(),
                email: request.email.clone(),
                admin,
            })
            .await?;

        log::info!("Registered user {} (admin: {})", user.username, user.admin);
        Ok(user)
    }

    /// Resolves the credentials and issues a token for the resolved row.
    pub async fn login(&self, request: &LoginRequest) -> Result<String> {
        require_non_empty("username", &request.username)?;
        require_non_empty("password", &request.password)?;
        log::info!("Login attempt for user: {}", request.username);

        let credentials =
            Predicate::eq("username", &request.username).and("password", &request.password);

        match self.lookup.find::<User>(&credentials).await? {
            Some(user) => {
                let token = self.tokens.issue(&user.username, now_secs())?;
                log::info!("Successful login for user: {}", user.username);
                Ok(token)
            }
            None => {
                let failure = match find_user(&self.lookup, &request.username).await? {
                    Some(_) => LoginFailure::WrongPassword,
                    None => LoginFailure::UnknownUser,
                };
                log::warn!(
                    "Failed login attempt for user: {} ({:?})",
                    request.username,
                    failure
                );
                Err(self.policy.login_failure(failure))
            }
        }
    }

    /// Subject of a valid token. Signature and expiry are the only checks.
    pub fn validate_token(&self, token: &str) -> Result<String> {
        let claims = self.tokens.verify(token, now_secs())?;
        Ok(claims.sub)
    }
}
