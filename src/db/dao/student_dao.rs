use sea_orm::{
    ColumnTrait, DatabaseConnection, Order, QueryFilter, Set,
    prelude::Date,
    sea_query::{Expr, ExprTrait, Func},
};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::{prelude::Student, student};

/// Profile columns written by create and full-record update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentProfile {
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    pub email: String,
    pub birthday: Option<Date>,
    pub gender: String,
    pub status: i32,
}

#[derive(Clone)]
pub struct StudentDao {
    db: DatabaseConnection,
}

impl DaoBase for StudentDao {
    type Entity = Student;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl StudentDao {
    pub async fn list_all(&self) -> DaoResult<Vec<student::Model>> {
        self.find_iter(None, Some((student::Column::CreatedAt, Order::Asc)), |query| query)
            .collect_all()
            .await
    }

    pub async fn find_by_ids(&self, ids: Vec<Uuid>) -> DaoResult<Vec<student::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_iter(
            None,
            Some((student::Column::StudentId, Order::Asc)),
            move |query| query.filter(student::Column::Id.is_in(ids.clone())),
        )
        .collect_all()
        .await
    }

    pub async fn find_by_student_id(&self, student_id: &str) -> DaoResult<Option<student::Model>> {
        let student_id = student_id.to_string();
        self.find_one(move |query| query.filter(student::Column::StudentId.eq(student_id)))
            .await
    }

    pub async fn find_by_phone(&self, phone: &str) -> DaoResult<Option<student::Model>> {
        let phone = phone.to_string();
        self.find_one(move |query| query.filter(student::Column::Phone.eq(phone)))
            .await
    }

    /// Case-insensitive: compares `UPPER(student_id)` with the upper-cased input.
    pub async fn student_id_taken(&self, student_id: &str) -> DaoResult<bool> {
        let student_id = student_id.to_uppercase();
        self.exists(move |query| {
            let column = Expr::col((Student, student::Column::StudentId));
            query.filter(Expr::expr(Func::upper(column)).eq(student_id))
        })
        .await
    }

    /// `except` skips the student being updated.
    pub async fn phone_taken(&self, phone: &str, except: Option<Uuid>) -> DaoResult<bool> {
        let phone = phone.to_string();
        self.exists(move |query| {
            let query = query.filter(student::Column::Phone.eq(phone));
            match except {
                Some(id) => query.filter(student::Column::Id.ne(id)),
                None => query,
            }
        })
        .await
    }

    pub async fn count_by_student_id(&self, student_id: &str) -> DaoResult<u64> {
        let student_id = student_id.to_string();
        self.count(move |query| query.filter(student::Column::StudentId.eq(student_id)))
            .await
    }

    /// Phone sign-up row: everything but the credentials is left blank.
    pub async fn create_account(
        &self,
        phone: &str,
        password_hash: &str,
        token: &str,
    ) -> DaoResult<student::Model> {
        let model = student::ActiveModel {
            student_id: Set(None),
            phone: Set(phone.to_string()),
            firstname: Set(String::new()),
            lastname: Set(String::new()),
            email: Set(String::new()),
            password_hash: Set(password_hash.to_string()),
            birthday: Set(None),
            gender: Set(String::new()),
            status: Set(0),
            image: Set(None),
            token: Set(token.to_string()),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn create_student(
        &self,
        student_id: &str,
        profile: StudentProfile,
        password_hash: &str,
    ) -> DaoResult<student::Model> {
        let model = student::ActiveModel {
            student_id: Set(Some(student_id.to_string())),
            password_hash: Set(password_hash.to_string()),
            image: Set(None),
            token: Set(String::new()),
            ..profile_active_model(profile)
        };
        self.create(model).await
    }

    /// Full-record update keyed by `student_id`. The password hash is only
    /// replaced when one is given. Returns the number of matched rows.
    pub async fn update_by_student_id(
        &self,
        student_id: &str,
        profile: StudentProfile,
        password_hash: Option<String>,
    ) -> DaoResult<u64> {
        let mut active = profile_active_model(profile);
        if let Some(hash) = password_hash {
            active.password_hash = Set(hash);
        }
        self.update_where(active, student::Column::StudentId.eq(student_id))
            .await
    }

    pub async fn delete_by_student_id(&self, student_id: &str) -> DaoResult<u64> {
        self.delete_where(student::Column::StudentId.eq(student_id))
            .await
    }

    pub async fn set_image(&self, id: Uuid, image: Option<String>) -> DaoResult<student::Model> {
        self.update(id, move |active| {
            active.image = Set(image);
        })
        .await
    }
}

fn profile_active_model(profile: StudentProfile) -> student::ActiveModel {
    student::ActiveModel {
        firstname: Set(profile.firstname),
        lastname: Set(profile.lastname),
        phone: Set(profile.phone),
        email: Set(profile.email),
        birthday: Set(profile.birthday),
        gender: Set(profile.gender),
        status: Set(profile.status),
        ..Default::default()
    }
}
