use std::sync::Arc;

use vulnapi_protocol::{DebugUser, UserDetail, UserSummary};

use super::{find_user, require_non_empty};
use crate::db::{QueryLayer, User, UserRepository};
use crate::error::{ApiError, Result};
use crate::policy::SecurityPolicy;

const USER_NOT_FOUND: &str = "User not found";

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    lookup: QueryLayer,
    policy: Arc<dyn SecurityPolicy>,
}

impl UserService {
    pub fn new(users: UserRepository, lookup: QueryLayer, policy: Arc<dyn SecurityPolicy>) -> Self {
        Self {
            users,
            lookup,
            policy,
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let users = self.users.list().await?;
        Ok(users.iter().map(User::summary).collect())
    }

    /// Every column including the stored password. Served in both modes.
    pub async fn debug_list_users(&self) -> Result<Vec<DebugUser>> {
        let users = self.users.list().await?;
        Ok(users.iter().map(User::debug_view).collect())
    }

    pub async fn get_user(&self, username: &str) -> Result<UserDetail> {
        let user = self.require_user(username).await?;
        Ok(user.detail())
    }

    pub async fn me(&self, subject: &str) -> Result<UserSummary> {
        let user = self.require_user(subject).await?;
        Ok(user.summary())
    }

    pub async fn delete_user(&self, acting: &str, target: &str) -> Result<()> {
        let is_admin = find_user(&self.lookup, acting)
            .await?
            .is_some_and(|user| user.admin);
        if !is_admin {
            log::warn!("Non-admin {} tried to delete {}", acting, target);
            return Err(ApiError::forbidden("Only Admins may delete users!"));
        }

        let user = self.require_user(target).await?;
        self.users.delete(user.id).await?;

        log::info!("User {} deleted by {}", user.username, acting);
        Ok(())
    }

    pub async fn update_email(&self, acting: &str, target: &str, email: &str) -> Result<()> {
        if acting != target {
            log::warn!("Denied email change of {} requested by {}", target, acting);
            return Err(ApiError::forbidden("You can only change your own email."));
        }
        self.policy.validate_email(email)?;

        let user = self.require_user(target).await?;
        self.users.update_email(user.id, email).await?;

        log::info!("Email updated for {}", user.username);
        Ok(())
    }

    pub async fn update_password(&self, acting: &str, target: &str, password: &str) -> Result<()> {
        self.policy.authorize_password_change(acting, target)?;
        require_non_empty("password", password)?;

        let user = self.require_user(target).await?;
        self.users.update_password(user.id, password).await?;

        log::info!("Password updated for {} by {}", user.username, acting);
        Ok(())
    }

    async fn require_user(&self, username: &str) -> Result<User> {
        find_user(&self.lookup, username)
            .await?
            .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture;
    use super::*;
    use crate::mode::Mode;

    #[actix_web::test]
    async fn listings_differ_only_in_password_exposure() {
        let (_db, services) = fixture::services(Mode::Secure).await;
        let public = services.users.list_users().await.unwrap();
        let debug = services.users.debug_list_users().await.unwrap();

        assert_eq!(public.len(), debug.len());
        assert_eq!(debug[1].username, "name1");
        assert_eq!(debug[1].password, "pass1");
    }

    #[actix_web::test]
    async fn lookup_injection_only_when_vulnerable() {
        let payload = "nobody' OR username = 'name2";

        let (_db, vulnerable) = fixture::services(Mode::Vulnerable).await;
        let user = vulnerable.users.get_user(payload).await.expect("injected lookup");
        assert_eq!(user.username, "name2");

        let (_db, secure) = fixture::services(Mode::Secure).await;
        let err = secure.users.get_user(payload).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn delete_requires_admin_and_existing_target() {
        let (db, services) = fixture::services(Mode::Secure).await;

        let err = services.users.delete_user("name1", "name2").await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = services.users.delete_user("admin", "ghost").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        services.users.delete_user("admin", "name2").await.unwrap();
        assert_eq!(db.users().count().await.unwrap(), 2);
        assert!(db.books().list().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn email_change_is_self_only_in_both_modes() {
        for mode in [Mode::Vulnerable, Mode::Secure] {
            let (_db, services) = fixture::services(mode).await;
            let err = services
                .users
                .update_email("name1", "name2", "x@mail.com")
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Forbidden(_)));

            let err = services
                .users
                .update_email("name1", "name1", "nope")
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));

            services
                .users
                .update_email("name1", "name1", "fresh@mail.com")
                .await
                .unwrap();
            assert_eq!(services.users.me("name1").await.unwrap().email, "fresh@mail.com");
        }
    }

    #[actix_web::test]
    async fn password_change_trusts_path_only_when_vulnerable() {
        let (_db, vulnerable) = fixture::services(Mode::Vulnerable).await;
        vulnerable
            .users
            .update_password("name1", "name2", "pwned")
            .await
            .expect("cross-user change");
        let debug = vulnerable.users.debug_list_users().await.unwrap();
        let name2 = debug.iter().find(|u| u.username == "name2").unwrap();
        assert_eq!(name2.password, "pwned");

        let (_db, secure) = fixture::services(Mode::Secure).await;
        let err = secure
            .users
            .update_password("name1", "name2", "pwned")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn me_reports_missing_subject() {
        let (_db, services) = fixture::services(Mode::Secure).await;
        assert!(services.users.me("admin").await.unwrap().admin);
        let err = services.users.me("ghost").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
