use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    auth::{JwtKeys, check_token, hash_password, new_access_token, verify_password},
    db::dao::{DaoBase, DaoLayerError, UserDao},
    db::entities::user,
    error::AppError,
};

pub const USER_NOT_FOUND: &str = "user not found";
pub const EMAIL_IN_USE: &str = "email already in use";
pub const PHONE_IN_USE: &str = "phone number already in use";

/// What a login attempt ended in: either the account was provisioned on the
/// spot, or an existing account was authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Created { name: String, email: String },
    Session { email: String, access_token: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub name: String,
    pub email: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

fn user_not_found(err: DaoLayerError) -> AppError {
    match err {
        DaoLayerError::NotFound { .. } => AppError::not_found(USER_NOT_FOUND),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct UserService {
    users: UserDao,
    jwt: JwtKeys,
}

impl UserService {
    pub fn new(users: UserDao, jwt: JwtKeys) -> Self {
        Self { users, jwt }
    }

    /// Authenticates by email, creating the account when none exists. A stored
    /// token that no longer verifies is replaced and written back.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let Some(existing) = self.users.find_by_email(email).await? else {
            let password_hash = hash_password(password)?;
            let access_token = new_access_token(&self.jwt, email)?;
            let created = self
                .users
                .create_user("", email, None, &password_hash, &access_token)
                .await?;
            info!(email, "user provisioned on login");
            return Ok(LoginOutcome::Created {
                name: created.name,
                email: created.email,
            });
        };

        verify_password(&existing.password_hash, password)
            .map_err(|_| AppError::password_mismatch("InvalidPassword"))?;

        if check_token(&self.jwt, &existing.token).is_ok() {
            return Ok(LoginOutcome::Session {
                email: existing.email,
                access_token: existing.token,
            });
        }

        let access_token = new_access_token(&self.jwt, email)?;
        self.users.set_token(existing.id, &access_token).await?;
        debug!(email, "login token refreshed");
        Ok(LoginOutcome::Session {
            email: existing.email,
            access_token,
        })
    }

    pub async fn sign_up(&self, input: NewUser) -> Result<UserSession, AppError> {
        self.ensure_unique(&input.email, &input.phone).await?;

        let password_hash = hash_password(&input.password)?;
        let access_token = new_access_token(&self.jwt, &input.email)?;
        let created = self
            .users
            .create_user(
                &input.name,
                &input.email,
                Some(input.phone.as_str()).filter(|phone| !phone.is_empty()),
                &password_hash,
                &access_token,
            )
            .await?;
        info!(email = %created.email, "user signed up");

        Ok(UserSession {
            name: created.name,
            email: created.email,
            access_token,
        })
    }

    /// Returns the token stored at sign-up or last login; no new token is issued.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserSession, AppError> {
        let mismatch = || AppError::password_mismatch("password does not match");
        let existing = self.users.find_by_email(email).await?.ok_or_else(mismatch)?;
        verify_password(&existing.password_hash, password).map_err(|_| mismatch())?;

        Ok(UserSession {
            name: existing.name,
            email: existing.email,
            access_token: existing.token,
        })
    }

    pub async fn create(&self, input: NewUser) -> Result<user::Model, AppError> {
        self.ensure_unique(&input.email, &input.phone).await?;

        let password_hash = hash_password(&input.password)?;
        let created = self
            .users
            .create_user(
                &input.name,
                &input.email,
                Some(input.phone.as_str()).filter(|phone| !phone.is_empty()),
                &password_hash,
                "",
            )
            .await?;
        info!(id = %created.id, "user created");
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        email: &str,
        name: Option<String>,
    ) -> Result<user::Model, AppError> {
        if self.users.email_taken(email, Some(id)).await? {
            return Err(AppError::already_in_use(EMAIL_IN_USE));
        }
        self.users
            .update_profile(id, email, name.filter(|name| !name.trim().is_empty()))
            .await
            .map_err(user_not_found)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.users.delete(id).await.map_err(user_not_found)?;
        info!(%id, "user deleted");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<user::Model>, AppError> {
        Ok(self.users.list_all().await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<user::Model, AppError> {
        self.users.find_by_id(id).await.map_err(user_not_found)
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<user::Model, AppError> {
        self.users
            .find_by_phone(phone)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
    }

    async fn ensure_unique(&self, email: &str, phone: &str) -> Result<(), AppError> {
        if self.users.email_taken(email, None).await? {
            return Err(AppError::already_in_use(EMAIL_IN_USE));
        }
        if !phone.is_empty() && self.users.phone_taken(phone).await? {
            return Err(AppError::already_in_use(PHONE_IN_USE));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::{LoginOutcome, NewUser, UserService};
    use crate::{
        auth::{hash_password, jwt::new_access_token_at, new_access_token},
        db::entities::user,
        error::AppError,
        storage::LocalImageStore,
        test_helpers::{count_row, test_keys, test_services, user_model},
    };

    fn service(db: &DatabaseConnection) -> UserService {
        test_services(db, Arc::new(LocalImageStore::new("unused"))).user()
    }

    fn new_user() -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: "0123456789".to_string(),
            password: "pw".to_string(),
        }
    }

    #[tokio::test]
    async fn login_provisions_unknown_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([[user_model("new@example.com", "hash", "token")]])
            .into_connection();

        let outcome = service(&db)
            .login("new@example.com", "pw")
            .await
            .expect("login should succeed");

        assert!(matches!(outcome, LoginOutcome::Created { ref email, .. } if email == "new@example.com"));
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("INSERT"), "{log}");
        assert!(log.contains("$argon2id$"), "{log}");
    }

    #[tokio::test]
    async fn login_reuses_valid_stored_token() {
        let keys = test_keys();
        let token = new_access_token(&keys, "alice@example.com").expect("token should encode");
        let hash = hash_password("pw").expect("hash should succeed");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model("alice@example.com", &hash, &token)]])
            .into_connection();

        let outcome = service(&db)
            .login("alice@example.com", "pw")
            .await
            .expect("login should succeed");

        assert_eq!(
            outcome,
            LoginOutcome::Session {
                email: "alice@example.com".to_string(),
                access_token: token,
            }
        );
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn login_replaces_and_persists_expired_token() {
        let keys = test_keys();
        let stale = new_access_token_at(&keys, "alice@example.com", 1_000)
            .expect("token should encode");
        let hash = hash_password("pw").expect("hash should succeed");
        let stored = user_model("alice@example.com", &hash, &stale);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored.clone()]])
            .append_query_results([[stored.clone()]])
            .append_query_results([[stored]])
            .into_connection();

        let outcome = service(&db)
            .login("alice@example.com", "pw")
            .await
            .expect("login should succeed");

        let LoginOutcome::Session { access_token, .. } = outcome else {
            panic!("expected a session");
        };
        assert_ne!(access_token, stale);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("UPDATE"), "{log}");
        assert!(log.contains(&access_token), "{log}");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_rejected() {
        let hash = hash_password("pw").expect("hash should succeed");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model("alice@example.com", &hash, "")]])
            .into_connection();

        let err = service(&db)
            .login("alice@example.com", "nope")
            .await
            .expect_err("login should fail");

        assert!(matches!(err, AppError::PasswordMismatch(ref message) if message == "InvalidPassword"));
    }

    #[tokio::test]
    async fn sign_up_rejects_taken_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)]])
            .into_connection();

        let err = service(&db)
            .sign_up(new_user())
            .await
            .expect_err("sign up should fail");

        assert!(matches!(err, AppError::AlreadyInUse(ref message) if message == "email already in use"));
    }

    #[tokio::test]
    async fn sign_up_returns_fresh_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results([[count_row(0)]])
            .append_query_results([[user_model("alice@example.com", "hash", "")]])
            .into_connection();

        let session = service(&db)
            .sign_up(new_user())
            .await
            .expect("sign up should succeed");

        assert!(!session.access_token.is_empty());
        assert_eq!(session.email, "alice@example.com");
    }

    #[tokio::test]
    async fn sign_in_returns_stored_token() {
        let hash = hash_password("pw").expect("hash should succeed");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model("alice@example.com", &hash, "stored-token")]])
            .into_connection();

        let session = service(&db)
            .sign_in("alice@example.com", "pw")
            .await
            .expect("sign in should succeed");

        assert_eq!(session.access_token, "stored-token");
    }

    #[tokio::test]
    async fn sign_in_for_unknown_email_matches_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let err = service(&db)
            .sign_in("ghost@example.com", "pw")
            .await
            .expect_err("sign in should fail");

        assert!(matches!(err, AppError::PasswordMismatch(ref message) if message == "password does not match"));
    }

    #[tokio::test]
    async fn create_stores_hash_without_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results([[count_row(0)]])
            .append_query_results([[user_model("alice@example.com", "hash", "")]])
            .into_connection();

        service(&db)
            .create(new_user())
            .await
            .expect("create should succeed");

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("$argon2id$"), "{log}");
    }

    #[tokio::test]
    async fn update_rejects_email_of_other_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)]])
            .into_connection();

        let err = service(&db)
            .update(Uuid::new_v4(), "taken@example.com", None)
            .await
            .expect_err("update should fail");

        assert!(matches!(err, AppError::AlreadyInUse(_)));
    }

    #[tokio::test]
    async fn update_of_missing_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let err = service(&db)
            .update(Uuid::new_v4(), "alice@example.com", Some("Alice".to_string()))
            .await
            .expect_err("update should fail");

        assert!(matches!(err, AppError::NotFound(ref message) if message == "user not found"));
    }

    #[tokio::test]
    async fn delete_of_missing_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = service(&db)
            .delete(Uuid::new_v4())
            .await
            .expect_err("delete should fail");

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn find_by_phone_reports_missing_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let err = service(&db)
            .find_by_phone("0999999999")
            .await
            .expect_err("lookup should fail");

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
