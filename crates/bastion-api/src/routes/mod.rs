//! Route modules of the auth service.

pub mod actuator;
pub mod auth;
