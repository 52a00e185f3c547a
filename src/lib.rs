//! A backend for to-do lists and their items.

pub mod api;
pub mod app;
pub mod core;
pub mod infra;
