use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewBookRequest {
    pub book_title: String,
    pub secret: String,
}

/// Listing entry: title and owner, never the secret.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookSummary {
    pub book_title: String,
    pub user: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BooksResponse {
    #[serde(rename = "Books")]
    pub books: Vec<BookSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookDetail {
    pub book_title: String,
    pub owner: String,
    pub secret: String,
}
