pub mod base;
pub mod base_traits;
pub mod classroom_dao;
mod context;
pub mod error;
pub mod student_dao;
pub mod teacher_dao;
pub mod user_dao;

pub use base::{DaoBase, DaoPager, PaginatedResponse};
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, TimestampedActiveModel};
pub use classroom_dao::ClassroomDao;
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use student_dao::{StudentDao, StudentProfile};
pub use teacher_dao::TeacherDao;
pub use user_dao::UserDao;
