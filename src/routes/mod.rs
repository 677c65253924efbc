//! HTTP route handlers for the demo application.

pub mod health;
pub mod identity;
pub mod index;
