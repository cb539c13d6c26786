use vulnapi_protocol::{BookDetail, BookSummary, DebugUser, UserDetail, UserSummary};

use super::query::Record;

/// Stored user row. The password is kept in clear text.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
    pub admin: bool,
}

impl Record for User {
    const SOURCE: &'static str = "users";
    const COLUMNS: &'static str = "id, username, password, email, admin";
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
            email: self.email.clone(),
            admin: self.admin,
        }
    }

    pub fn detail(&self) -> UserDetail {
        UserDetail {
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }

    pub fn debug_view(&self) -> DebugUser {
        DebugUser {
            username: self.username.clone(),
            password: self.password.clone(),
            email: self.email.clone(),
            admin: self.admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub admin: bool,
}

/// Book row joined with its owner's username.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub book_title: String,
    pub secret: String,
    pub owner: String,
}

impl Record for Book {
    const SOURCE: &'static str = "books INNER JOIN users ON users.id = books.user_id";
    const COLUMNS: &'static str =
        "books.id AS id, books.book_title AS book_title, books.secret AS secret, users.username AS owner";
}

impl Book {
    pub const TITLE_COLUMN: &'static str = "books.book_title";

    pub fn detail(&self) -> BookDetail {
        BookDetail {
            book_title: self.book_title.clone(),
            owner: self.owner.clone(),
            secret: self.secret.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookListing {
    pub book_title: String,
    pub owner: String,
}

impl BookListing {
    pub fn summary(&self) -> BookSummary {
        BookSummary {
            book_title: self.book_title.clone(),
            user: self.owner.clone(),
        }
    }
}
