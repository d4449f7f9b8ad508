use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};

use super::{DaoBase, DaoResult};
use crate::db::entities::{prelude::Teacher, teacher};

#[derive(Clone)]
pub struct TeacherDao {
    db: DatabaseConnection,
}

impl DaoBase for TeacherDao {
    type Entity = Teacher;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl TeacherDao {
    pub async fn find_by_phone(&self, phone: &str) -> DaoResult<Option<teacher::Model>> {
        let phone = phone.to_string();
        self.find_one(move |query| query.filter(teacher::Column::Phone.eq(phone)))
            .await
    }

    pub async fn phone_taken(&self, phone: &str) -> DaoResult<bool> {
        let phone = phone.to_string();
        self.exists(move |query| query.filter(teacher::Column::Phone.eq(phone)))
            .await
    }

    pub async fn create_account(
        &self,
        phone: &str,
        password_hash: &str,
        token: &str,
    ) -> DaoResult<teacher::Model> {
        let model = teacher::ActiveModel {
            phone: Set(phone.to_string()),
            firstname: Set(String::new()),
            lastname: Set(String::new()),
            password_hash: Set(password_hash.to_string()),
            token: Set(token.to_string()),
            ..Default::default()
        };
        self.create(model).await
    }
}
