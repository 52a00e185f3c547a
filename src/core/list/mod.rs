pub mod list_repository;
pub mod list_service;
