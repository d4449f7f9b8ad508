use sea_orm::entity::prelude::*;

/// Reference data; rows are managed outside this service.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "classrooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub class_name: String,
    pub class_year: i32,
    pub subject_name: String,
    #[sea_orm(has_many)]
    pub students: HasMany<super::student_classroom::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
