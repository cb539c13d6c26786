use sqlx::SqlitePool;

use super::models::{BookListing, NewUser, User};
use crate::error::{ApiError, Result};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password, email, admin FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Uniqueness of `username` is enforced by the storage engine.
    pub async fn insert(&self, user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, password, email, admin) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.email)
        .bind(user.admin)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::Conflict("User already exists. Please Log in.".to_string())
            } else {
                ApiError::Database(err)
            }
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: user.username.clone(),
            password: user.password.clone(),
            email: user.email.clone(),
            admin: user.admin,
        })
    }

    pub async fn update_email(&self, id: i64, email: &str) -> Result<()> {
        sqlx::query("UPDATE users SET email = ? WHERE id = ?")
            .bind(email)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_password(&self, id: i64, password: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password = ? WHERE id = ?")
            .bind(password)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Deletes the user; owned books go with it through the foreign key.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<BookListing>> {
        let books = sqlx::query_as::<_, BookListing>(
            "SELECT books.book_title AS book_title, users.username AS owner \
             FROM books INNER JOIN users ON users.id = books.user_id \
             ORDER BY books.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    #[cfg(test)]
    pub(crate) async fn count_owned_by(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Titles are unique across all owners, not per owner.
    pub async fn insert(&self, title: &str, secret: &str, owner_id: i64) -> Result<i64> {
        let result = sqlx::query("INSERT INTO books (book_title, secret, user_id) VALUES (?, ?, ?)")
            .bind(title)
            .bind(secret)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    ApiError::Conflict("Book Already exists!".to_string())
                } else {
                    ApiError::Database(err)
                }
            })?;
        Ok(result.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn empty_db() -> Database {
        let db = Database::in_memory().await.expect("in-memory db");
        db.init_schema().await.expect("schema");
        db
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "pass1".to_string(),
            email: format!("{username}@mail.com"),
            admin: false,
        }
    }

    #[actix_web::test]
    async fn duplicate_username_is_conflict() {
        let db = empty_db().await;
        db.users().insert(&new_user("name1")).await.expect("first insert");

        let err = db.users().insert(&new_user("name1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn book_titles_are_globally_unique() {
        let db = empty_db().await;
        let first = db.users().insert(&new_user("name1")).await.unwrap();
        let second = db.users().insert(&new_user("name2")).await.unwrap();

        db.books()
            .insert("shared title", "one", first.id)
            .await
            .expect("first book");
        let err = db
            .books()
            .insert("shared title", "two", second.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[actix_web::test]
    async fn delete_cascades_to_books() {
        let db = empty_db().await;
        let owner = db.users().insert(&new_user("name1")).await.unwrap();
        let other = db.users().insert(&new_user("name2")).await.unwrap();
        db.books().insert("a", "s", owner.id).await.unwrap();
        db.books().insert("b", "s", owner.id).await.unwrap();
        db.books().insert("c", "s", other.id).await.unwrap();

        assert!(db.users().delete(owner.id).await.unwrap());
        assert_eq!(db.books().count_owned_by(owner.id).await.unwrap(), 0);

        let remaining = db.books().list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].owner, "name2");
    }

    #[actix_web::test]
    async fn updates_apply_to_row() {
        let db = empty_db().await;
        let user = db.users().insert(&new_user("name1")).await.unwrap();
        db.users().update_email(user.id, "new@mail.com").await.unwrap();
        db.users().update_password(user.id, "changed").await.unwrap();

        let stored = db.users().list().await.unwrap().remove(0);
        assert_eq!(stored.email, "new@mail.com");
        assert_eq!(stored.password, "changed");
    }
}
