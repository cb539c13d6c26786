//! Shared state and route table of the HTTP application.

use actix_web::web;

use crate::{
    config::BootstrapConfig, db::Database, error::ApiError, handlers, mode::ModeController,
    service::{AuthService, BookService, Services, UserService},
};

/// Everything handlers read from app data. Built once, cloned per worker.
#[derive(Clone)]
pub struct AppState {
    db: web::Data<Database>,
    bootstrap: web::Data<BootstrapConfig>,
    mode: web::Data<ModeController>,
    auth: web::Data<AuthService>,
    users: web::Data<UserService>,
    books: web::Data<BookService>,
}

impl AppState {
    pub fn new(db: Database, controller: ModeController, bootstrap: BootstrapConfig) -> Self {
        let Services { auth, users, books } = Services::new(&db, &controller);

        Self {
            db: web::Data::new(db),
            bootstrap: web::Data::new(bootstrap),
            mode: web::Data::new(controller),
            auth: web::Data::new(auth),
            users: web::Data::new(users),
            books: web::Data::new(books),
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(state.db.clone())
        .app_data(state.bootstrap.clone())
        .app_data(state.mode.clone())
        .app_data(state.auth.clone())
        .app_data(state.users.clone())
        .app_data(state.books.clone())
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            ApiError::validation(format!("Invalid request body: {err}")).into()
        }))
        .app_data(web::PathConfig::default().error_handler(|err, _req| {
            ApiError::validation(format!("Invalid path: {err}")).into()
        }));

    // Static paths go ahead of the `{username}` and `{book}` captures.
    cfg.service(handlers::index)
        .service(handlers::create_db)
        .service(handlers::me)
        .service(handlers::list_users)
        .service(handlers::debug_users)
        .service(handlers::register)
        .service(handlers::login)
        .service(handlers::get_user)
        .service(handlers::delete_user)
        .service(handlers::update_email)
        .service(handlers::update_password)
        .service(handlers::list_books)
        .service(handlers::add_book)
        .service(handlers::get_book);
}
