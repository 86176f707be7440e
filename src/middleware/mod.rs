pub mod auth;

pub use auth::{authorize, AdminUser, InstructorUser};
