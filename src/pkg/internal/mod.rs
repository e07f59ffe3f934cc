pub mod adaptors;
pub mod auth;
pub mod guard;
pub mod lifecycle;
