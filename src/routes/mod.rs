mod entry;
pub mod public;
pub mod student;
pub mod user;

pub use entry::{API_PREFIX, app, router};
