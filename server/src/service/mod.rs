//! Request-independent operations behind the HTTP handlers.
//!
//! Every service is wired once from the [`ModeController`]: lookups go through
//! the mode's [`QueryLayer`] strategy and authorization questions go to the
//! mode's [`SecurityPolicy`]. Nothing below branches on the mode directly.

pub mod auth;
pub mod books;
pub mod users;

pub use auth::AuthService;
pub use books::BookService;
pub use users::UserService;

use crate::auth_token::TokenService;
use crate::db::{Database, Predicate, QueryLayer, User};
use crate::error::{ApiError, Result};
use crate::mode::ModeController;

#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub users: UserService,
    pub books: BookService,
}

impl Services {
    pub fn new(db: &Database, controller: &ModeController) -> Self {
        let lookup = db.query_layer(controller.query_strategy());
        let policy = controller.policy();
        let tokens = TokenService::new(controller.token_ttl());

        log::info!(
            "Services wired in {} mode (lookups: {}, token ttl: {}s)",
            controller.mode(),
            lookup.strategy_name(),
            controller.token_ttl().as_secs()
        );

        Self {
            auth: AuthService::new(db.users(), lookup.clone(), policy.clone(), tokens),
            users: UserService::new(db.users(), lookup.clone(), policy.clone()),
            books: BookService::new(db.books(), lookup, policy),
        }
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) async fn find_user(lookup: &QueryLayer, username: &str) -> Result<Option<User>> {
    lookup.find(&Predicate::eq("username", username)).await
}
