use sea_orm::{ColumnTrait, DatabaseConnection, Order, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::{prelude::User, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl UserDao {
    pub async fn list_all(&self) -> DaoResult<Vec<user::Model>> {
        self.find_iter(None, Some((user::Column::CreatedAt, Order::Asc)), |query| query)
            .collect_all()
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.to_string();
        self.find_one(move |query| query.filter(user::Column::Email.eq(email)))
            .await
    }

    pub async fn find_by_phone(&self, phone: &str) -> DaoResult<Option<user::Model>> {
        let phone = phone.to_string();
        self.find_one(move |query| query.filter(user::Column::Phone.eq(phone)))
            .await
    }

    /// `except` skips the user being updated.
    pub async fn email_taken(&self, email: &str, except: Option<Uuid>) -> DaoResult<bool> {
        let email = email.to_string();
        self.exists(move |query| {
            let query = query.filter(user::Column::Email.eq(email));
            match except {
                Some(id) => query.filter(user::Column::Id.ne(id)),
                None => query,
            }
        })
        .await
    }

    pub async fn phone_taken(&self, phone: &str) -> DaoResult<bool> {
        let phone = phone.to_string();
        self.exists(move |query| query.filter(user::Column::Phone.eq(phone)))
            .await
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        password_hash: &str,
        token: &str,
    ) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            phone: Set(phone.map(str::to_string)),
            password_hash: Set(password_hash.to_string()),
            token: Set(token.to_string()),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn set_token(&self, id: Uuid, token: &str) -> DaoResult<user::Model> {
        let token = token.to_string();
        self.update(id, move |active| {
            active.token = Set(token);
        })
        .await
    }

    /// `name` is left untouched when absent.
    pub async fn update_profile(
        &self,
        id: Uuid,
        email: &str,
        name: Option<String>,
    ) -> DaoResult<user::Model> {
        let email = email.to_string();
        self.update(id, move |active| {
            active.email = Set(email);
            if let Some(name) = name {
                active.name = Set(name);
            }
        })
        .await
    }
}
