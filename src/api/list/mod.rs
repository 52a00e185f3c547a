pub mod list_api;
