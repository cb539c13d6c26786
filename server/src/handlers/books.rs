use actix_web::{get, post, web, HttpResponse};
use vulnapi_protocol::{BooksResponse, NewBookRequest, StatusMessage};

use crate::{error::Result, extractors::BearerSubject, service::BookService};

#[get("/books/v1")]
pub async fn list_books(
    _subject: BearerSubject,
    books: web::Data<BookService>,
) -> Result<HttpResponse> {
    let books = books.list_books().await?;
    Ok(HttpResponse::Ok().json(BooksResponse { books }))
}

#[post("/books/v1")]
pub async fn add_book(
    req: web::Json<NewBookRequest>,
    subject: BearerSubject,
    books: web::Data<BookService>,
) -> Result<HttpResponse> {
    books.create_book(subject.username(), &req).await?;
    Ok(HttpResponse::Ok().json(StatusMessage::success("Book has been added.")))
}

#[get("/books/v1/{book}")]
pub async fn get_book(
    path: web::Path<String>,
    subject: BearerSubject,
    books: web::Data<BookService>,
) -> Result<HttpResponse> {
    let book = books.get_book(subject.username(), &path).await?;
    Ok(HttpResponse::Ok().json(book))
}
