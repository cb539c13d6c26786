use std::sync::Arc;

use vulnapi_protocol::{BookDetail, BookSummary, NewBookRequest};

use super::{find_user, require_non_empty};
use crate::db::{Book, BookListing, BookRepository, Predicate, QueryLayer};
use crate::error::{ApiError, Result};
use crate::policy::SecurityPolicy;

#[derive(Clone)]
pub struct BookService {
    books: BookRepository,
    lookup: QueryLayer,
    policy: Arc<dyn SecurityPolicy>,
}

impl BookService {
    pub fn new(books: BookRepository, lookup: QueryLayer, policy: Arc<dyn SecurityPolicy>) -> Self {
        Self {
            books,
            lookup,
            policy,
        }
    }

    /// Titles and owners. Secrets never leave through the listing.
    pub async fn list_books(&self) -> Result<Vec<BookSummary>> {
        let books = self.books.list().await?;
        Ok(books.iter().map(BookListing::summary).collect())
    }

    pub async fn create_book(&self, acting: &str, request: &NewBookRequest) -> Result<()> {
        require_non_empty("book_title", &request.book_title)?;
        require_non_empty("secret", &request.secret)?;

        let owner = find_user(&self.lookup, acting)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User not found. Please log in again."))?;

        self.books
            .insert(&request.book_title, &request.secret, owner.id)
            .await?;

        log::info!("Book '{}' added by {}", request.book_title, owner.username);
        Ok(())
    }

    pub async fn get_book(&self, acting: &str, title: &str) -> Result<BookDetail> {
        let book: Book = self
            .lookup
            .find(&Predicate::eq(Book::TITLE_COLUMN, title))
            .await?
            .ok_or_else(|| ApiError::not_found("Book not found!"))?;

        self.policy.authorize_book_read(acting, &book)?;
        Ok(book.detail())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture::{self, TITLE_OWNED_BY_NAME2};
    use super::*;
    use crate::mode::Mode;

    fn new_book(title: &str) -> NewBookRequest {
        NewBookRequest {
            book_title: title.to_string(),
            secret: format!("secret of {title}"),
        }
    }

    #[actix_web::test]
    async fn foreign_secret_readable_only_when_vulnerable() {
        let (_db, vulnerable) = fixture::services(Mode::Vulnerable).await;
        let book = vulnerable
            .books
            .get_book("name1", TITLE_OWNED_BY_NAME2)
            .await
            .expect("cross-owner read");
        assert_eq!(book.owner, "name2");
        assert_eq!(book.secret, "name2 secret");

        let (_db, secure) = fixture::services(Mode::Secure).await;
        let err = secure
            .books
            .get_book("name1", TITLE_OWNED_BY_NAME2)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(secure
            .books
            .get_book("name2", TITLE_OWNED_BY_NAME2)
            .await
            .is_ok());
    }

    #[actix_web::test]
    async fn unknown_title_is_not_found_in_both_modes() {
        for mode in [Mode::Vulnerable, Mode::Secure] {
            let (_db, services) = fixture::services(mode).await;
            let err = services.books.get_book("name1", "missing").await.unwrap_err();
            assert!(matches!(err, ApiError::NotFound(_)));
        }
    }

    #[actix_web::test]
    async fn created_book_is_owned_by_caller() {
        let (_db, services) = fixture::services(Mode::Secure).await;
        services
            .books
            .create_book("name1", &new_book("my diary"))
            .await
            .unwrap();

        let listing = services.books.list_books().await.unwrap();
        let entry = listing.iter().find(|b| b.book_title == "my diary").unwrap();
        assert_eq!(entry.user, "name1");

        let err = services
            .books
            .create_book("name2", &new_book("my diary"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[actix_web::test]
    async fn create_rejects_unknown_caller_and_empty_fields() {
        let (_db, services) = fixture::services(Mode::Secure).await;
        let err = services
            .books
            .create_book("ghost", &new_book("orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err = services
            .books
            .create_book("name1", &new_book(""))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
