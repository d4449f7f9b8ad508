use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::{DaoLayerError, DaoResult};
use crate::db::entities::{
    classroom,
    prelude::{Classroom, StudentClassroom},
    student_classroom,
};

/// Read-only access to classrooms and their student links. Neither table
/// carries timestamps, so this does not go through `DaoBase`.
#[derive(Clone)]
pub struct ClassroomDao {
    db: DatabaseConnection,
}

impl ClassroomDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn find_by_id(&self, id: Uuid) -> DaoResult<Option<classroom::Model>> {
        Classroom::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn memberships(
        &self,
        classroom_id: Uuid,
    ) -> DaoResult<Vec<student_classroom::Model>> {
        StudentClassroom::find()
            .filter(student_classroom::Column::ClassroomId.eq(classroom_id))
            .order_by_asc(student_classroom::Column::Id)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }
}
