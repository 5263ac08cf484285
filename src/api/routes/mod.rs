//! API Routes
//!
//! Route handlers organized by functionality.

pub mod countries;
pub mod dashboard;
pub mod health;
pub mod reference;
