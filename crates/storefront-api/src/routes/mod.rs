//! API Routes

pub mod countries;
pub mod health;
pub mod reviews;
