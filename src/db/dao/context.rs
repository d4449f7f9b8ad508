use sea_orm::DatabaseConnection;

use super::{ClassroomDao, DaoBase, StudentDao, TeacherDao, UserDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn student(&self) -> StudentDao {
        DaoBase::new(&self.db)
    }

    pub fn teacher(&self) -> TeacherDao {
        DaoBase::new(&self.db)
    }

    pub fn classroom(&self) -> ClassroomDao {
        ClassroomDao::new(&self.db)
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }
}
