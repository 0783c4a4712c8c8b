//! API Routes
//!
//! Route handlers organized by functionality.

pub mod admin;
pub mod content;
pub mod health;
pub mod reviews;
