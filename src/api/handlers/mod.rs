//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod bookings;
pub mod health;
pub mod me;
pub mod reviews;
pub mod vendors;
