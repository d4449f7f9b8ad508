pub mod context;
pub mod format;
pub mod student_service;
pub mod user_service;

pub use context::ServiceContext;
