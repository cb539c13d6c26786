//! Authorization and exposure rules that differ between the two modes.
//!
//! Only the behaviours listed on [`SecurityPolicy`] branch by mode. The debug
//! listing, the signing secret and the absence of rate limiting are shared by
//! both policies and deliberately have no hook here.

pub mod email;

use crate::db::Book;
use crate::error::{ApiError, Result};
use crate::mode::Mode;

pub use email::{BacktrackingEmailValidator, EmailValidator, LinearEmailValidator};

pub const INVALID_EMAIL_MESSAGE: &str = "Please Provide a valid email address.";

/// Why a credential lookup found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    UnknownUser,
    WrongPassword,
}

pub trait SecurityPolicy: Send + Sync {
    fn mode(&self) -> Mode;

    /// Admin flag stored for a new registration.
    fn grant_admin(&self, requested: Option<bool>) -> bool;

    fn login_failure(&self, failure: LoginFailure) -> ApiError;

    /// `acting` comes from the token, `target` from the request path.
    fn authorize_password_change(&self, acting: &str, target: &str) -> Result<()>;

    fn authorize_book_read(&self, acting: &str, book: &Book) -> Result<()>;

    fn email_validator(&self) -> &dyn EmailValidator;

    fn validate_email(&self, email: &str) -> Result<()> {
        if self.email_validator().is_valid(email) {
            Ok(())
        } else {
            Err(ApiError::validation(INVALID_EMAIL_MESSAGE))
        }
    }
}

#[derive(Debug, Default)]
pub struct VulnerablePolicy {
    validator: BacktrackingEmailValidator,
}

impl VulnerablePolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecurityPolicy for VulnerablePolicy {
    fn mode(&self) -> Mode {
        Mode::Vulnerable
    }

    fn grant_admin(&self, requested: Option<bool>) -> bool {
        requested.unwrap_or(false)
    }

    fn login_failure(&self, failure: LoginFailure) -> ApiError {
        match failure {
            LoginFailure::UnknownUser => ApiError::unauthorized("Username does not exist"),
            LoginFailure::WrongPassword => {
                ApiError::unauthorized("Password is not correct for the given username.")
            }
        }
    }

    // Authorises against the path segment, so any caller may target anyone.
    fn authorize_password_change(&self, _acting: &str, target: &str) -> Result<()> {
        log::debug!("Password change authorised for path user {}", target);
        Ok(())
    }

    fn authorize_book_read(&self, _acting: &str, _book: &Book) -> Result<()> {
        Ok(())
    }

    fn email_validator(&self) -> &dyn EmailValidator {
        &self.validator
    }
}

#[derive(Debug, Default)]
pub struct SecurePolicy {
    validator: LinearEmailValidator,
}

impl SecurePolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecurityPolicy for SecurePolicy {
    fn mode(&self) -> Mode {
        Mode::Secure
    }

    fn grant_admin(&self, _requested: Option<bool>) -> bool {
        false
    }

    fn login_failure(&self, _failure: LoginFailure) -> ApiError {
        ApiError::unauthorized("Username or Password Incorrect!")
    }

    fn authorize_password_change(&self, acting: &str, target: &str) -> Result<()> {
        if acting == target {
            Ok(())
        } else {
            log::warn!(
                "Denied password change of {} requested by {}",
                target,
                acting
            );
            Err(ApiError::forbidden("You can only change your own password."))
        }
    }

    fn authorize_book_read(&self, acting: &str, book: &Book) -> Result<()> {
        if book.owner == acting {
            Ok(())
        } else {
            log::warn!(
                "Denied read of book '{}' owned by {} to {}",
                book.book_title,
                book.owner,
                acting
            );
            Err(ApiError::forbidden("You are not the owner of this book."))
        }
    }

    fn email_validator(&self) -> &dyn EmailValidator {
        &self.validator
    }
}
