//! The core module.
//!
//! Contains the business rules and persistence of each feature.

pub mod item;
pub mod list;
