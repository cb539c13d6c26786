//! JSON wire types shared by the vulnapi server and its probe client.
//!
//! Field names follow the documented action table exactly, including the
//! capitalised `Books` key of the book listing.

pub mod books;
pub mod status;
pub mod users;

pub use books::{BookDetail, BookSummary, BooksResponse, NewBookRequest};
pub use status::{ServiceInfo, StatusMessage, STATUS_FAIL, STATUS_SUCCESS};
pub use users::{
    DebugUser, LoginRequest, LoginResponse, MeResponse, RegisterRequest, UpdateEmailRequest,
    UpdatePasswordRequest, UserDetail, UserSummary, UsersResponse,
};

/// Returns the protocol crate version string.
pub fn protocol_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
