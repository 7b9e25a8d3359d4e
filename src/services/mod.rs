//! Business logic services.

pub mod catalog;
pub mod classification;
pub mod dashboard;
pub mod field_inventory;
pub mod listing;
pub mod session;
