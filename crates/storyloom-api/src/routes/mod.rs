//! Route modules organized by bounded context.

pub mod admin;
pub mod chapter;
pub mod character;
pub mod health;
pub mod request;
