pub mod auth;
pub mod books;
pub mod health;
pub mod users;

pub use auth::{login, me, register};
pub use books::{add_book, get_book, list_books};
pub use health::{create_db, index};
pub use users::{debug_users, delete_user, get_user, list_users, update_email, update_password};
