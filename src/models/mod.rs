//! Domain models and DTOs.

pub mod catalog;
pub mod field;
pub mod pagination;
pub mod traffic;
