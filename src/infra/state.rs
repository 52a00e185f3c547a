//! Global application state.
//!
//! Holds the services the handlers delegate to, composed once at startup.

use super::config::Config;
use crate::core::{
    item::{item_repository::ItemRepository, item_service::ItemService},
    list::{list_repository::ListRepository, list_service::ListService},
};
use axum::extract::FromRef;
use std::sync::Arc;

/// Global application state.
#[derive(Clone, FromRef)]
pub struct AppState {
    items: ItemService,
    lists: ListService,
    config: Arc<Config>,
}

impl AppState {
    /// Constructs a new [`AppState`] on top of a store holding both lists and items.
    pub fn new<R>(repository: R, config: Config) -> Self
    where
        R: ItemRepository + ListRepository + 'static,
    {
        let repository = Arc::new(repository);
        Self {
            items: ItemService::new(repository.clone()),
            lists: ListService::new(repository),
            config: Arc::new(config),
        }
    }

    /// Returns the item service.
    pub fn items(&self) -> &ItemService {
        &self.items
    }

    /// Returns the list service.
    pub fn lists(&self) -> &ListService {
        &self.lists
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
