use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "student_classrooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub student_id: Uuid,
    #[sea_orm(indexed)]
    pub classroom_id: Uuid,
    #[sea_orm(belongs_to, from = "student_id", to = "id", on_delete = "Cascade")]
    pub student: HasOne<super::student::Entity>,
    #[sea_orm(belongs_to, from = "classroom_id", to = "id", on_delete = "Cascade")]
    pub classroom: HasOne<super::classroom::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
