#[allow(unused_imports)]
pub mod prelude {
    pub use super::classroom::Entity as Classroom;
    pub use super::student::Entity as Student;
    pub use super::student_classroom::Entity as StudentClassroom;
    pub use super::teacher::Entity as Teacher;
    pub use super::user::Entity as User;
}

pub mod classroom;
pub mod student;
pub mod student_classroom;
pub mod teacher;
pub mod user;
