//! API handlers for Booklend REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod stats;
