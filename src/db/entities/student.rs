use sea_orm::entity::prelude::*;

/// `student_id` is stored upper-cased; `phone` and `student_id` are unique.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(unique)]
    pub student_id: Option<String>,
    #[sea_orm(unique)]
    pub phone: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub birthday: Option<Date>,
    pub gender: String,
    #[sea_orm(default_value = 0)]
    pub status: i32,
    pub image: Option<String>,
    pub token: String,
    #[sea_orm(has_many)]
    pub classrooms: HasMany<super::student_classroom::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

crate::db::dao::base_traits::base_entity_traits!();
