//! A process-local store, for development and tests.

use crate::core::{item::item_repository::Item, list::list_repository::List};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Lists and items kept in memory, in creation order.
///
/// The repository traits are implemented next to their features,
/// see [`crate::core::item::item_repository`] and [`crate::core::list::list_repository`].
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    pub(crate) store: Arc<RwLock<MemoryStore>>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    pub(crate) lists: Vec<List>,
    pub(crate) items: Vec<Item>,
}

impl MemoryRepository {
    /// Constructs an empty [`MemoryRepository`].
    pub fn new() -> Self {
        Self::default()
    }
}
