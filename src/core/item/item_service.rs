//! A service for interacting with items.

use super::item_repository::{Item, ItemRepository, NewItem};
use crate::infra::{
    context::Context,
    error::{ApiResult, ClientError},
    pagination::PaginationParams,
    validation::Valid,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Business rules for items, on top of an [`ItemRepository`].
#[derive(Clone)]
pub struct ItemService {
    repository: Arc<dyn ItemRepository>,
}

impl ItemService {
    /// Constructs a new [`ItemService`].
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self { repository }
    }

    /// Creates a new item in an existing list.
    #[instrument(skip(self, ctx))]
    pub async fn create_item(
        &self,
        ctx: &Context,
        list_id: Uuid,
        new_item: Valid<NewItem>,
    ) -> ApiResult<Item> {
        let item = self
            .repository
            .create_item(ctx, list_id, new_item.into_inner())
            .await?
            .ok_or(ClientError::NotFound)?;
        Ok(item)
    }

    /// Reads an item.
    #[instrument(skip(self, ctx))]
    pub async fn get_item(&self, ctx: &Context, id: Uuid) -> ApiResult<Item> {
        let item = self
            .repository
            .fetch_item(ctx, id)
            .await?
            .ok_or(ClientError::NotFound)?;
        Ok(item)
    }

    /// Lists the items of a list. A list without items, or no such list, gives an empty result.
    #[instrument(skip(self, ctx))]
    pub async fn get_all_items(
        &self,
        ctx: &Context,
        list_id: Uuid,
        params: PaginationParams,
    ) -> ApiResult<Vec<Item>> {
        self.repository.list_items(ctx, list_id, params).await
    }

    /// Replaces the title and description of an item.
    #[instrument(skip(self, ctx))]
    pub async fn update_item(
        &self,
        ctx: &Context,
        id: Uuid,
        new_item: Valid<NewItem>,
    ) -> ApiResult<Item> {
        let item = self
            .repository
            .update_item(ctx, id, new_item.into_inner())
            .await?
            .ok_or(ClientError::NotFound)?;
        Ok(item)
    }

    /// Deletes an item permanently.
    #[instrument(skip(self, ctx))]
    pub async fn delete_item(&self, ctx: &Context, id: Uuid) -> ApiResult<()> {
        if !self.repository.delete_item(ctx, id).await? {
            return Err(ClientError::NotFound.into());
        }
        Ok(())
    }

    /// Flips an item between complete and incomplete.
    #[instrument(skip(self, ctx))]
    pub async fn update_status(&self, ctx: &Context, id: Uuid) -> ApiResult<Item> {
        let item = self
            .repository
            .toggle_item_status(ctx, id)
            .await?
            .ok_or(ClientError::NotFound)?;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::item::item_repository::MockItemRepository,
        infra::{error::ApiError, memory::MemoryRepository},
    };
    use chrono::Utc;
    use mockall::predicate::eq;

    fn milk(list_id: Uuid) -> Item {
        let now = Utc::now();
        Item {
            id: Uuid::new_v4(),
            list_id,
            title: "Buy milk".to_string(),
            description: None,
            status: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn new_milk() -> Valid<NewItem> {
        Valid::new(NewItem {
            title: "Buy milk".to_string(),
            description: None,
            status: false,
        })
        .unwrap()
    }

    fn is_not_found<T>(result: ApiResult<T>) -> bool {
        matches!(result, Err(ApiError::ClientError(ClientError::NotFound)))
    }

    #[tokio::test]
    async fn create_item_in_list() {
        let list_id = Uuid::new_v4();
        let expected_item = milk(list_id);
        let returned_item = expected_item.clone();
        let mut repo = MockItemRepository::new();
        repo.expect_create_item()
            .withf(move |_, id, new_item| *id == list_id && new_item.title == "Buy milk")
            .return_once(move |_, _, _| Ok(Some(returned_item)));

        let service = ItemService::new(Arc::new(repo));
        let item = service
            .create_item(&Context::background(), list_id, new_milk())
            .await
            .unwrap();
        assert_eq!(expected_item, item);
    }

    #[tokio::test]
    async fn create_item_in_unknown_list_is_not_found() {
        let mut repo = MockItemRepository::new();
        repo.expect_create_item().return_once(|_, _, _| Ok(None));

        let service = ItemService::new(Arc::new(repo));
        let result = service
            .create_item(&Context::background(), Uuid::new_v4(), new_milk())
            .await;
        assert!(is_not_found(result));
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let id = Uuid::new_v4();
        let mut repo = MockItemRepository::new();
        repo.expect_fetch_item()
            .with(mockall::predicate::always(), eq(id))
            .return_once(|_, _| Ok(None));
        repo.expect_update_item().return_once(|_, _, _| Ok(None));
        repo.expect_toggle_item_status()
            .return_once(|_, _| Ok(None));
        repo.expect_delete_item().return_once(|_, _| Ok(false));

        let service = ItemService::new(Arc::new(repo));
        let ctx = Context::background();
        assert!(is_not_found(service.get_item(&ctx, id).await));
        assert!(is_not_found(service.update_item(&ctx, id, new_milk()).await));
        assert!(is_not_found(service.update_status(&ctx, id).await));
        assert!(is_not_found(service.delete_item(&ctx, id).await));
    }

    #[tokio::test]
    async fn cancellation_is_not_a_business_error() {
        let mut repo = MockItemRepository::new();
        repo.expect_fetch_item()
            .return_once(|_, _| Err(ApiError::Cancelled));

        let service = ItemService::new(Arc::new(repo));
        let result = service
            .get_item(&Context::background(), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn toggling_twice_restores_status() {
        let repo = MemoryRepository::new();
        let ctx = Context::background();
        let list = crate::core::list::list_service::ListService::new(Arc::new(repo.clone()))
            .create_list(
                &ctx,
                Valid::new(crate::core::list::list_repository::NewList {
                    name: "Groceries".to_string(),
                })
                .unwrap(),
            )
            .await
            .unwrap();
        let service = ItemService::new(Arc::new(repo));

        let item = service.create_item(&ctx, list.id, new_milk()).await.unwrap();
        let once = service.update_status(&ctx, item.id).await.unwrap();
        let twice = service.update_status(&ctx, item.id).await.unwrap();
        assert!(once.status);
        assert_eq!(item.status, twice.status);
    }

    #[tokio::test]
    async fn empty_list_has_no_items() {
        let service = ItemService::new(Arc::new(MemoryRepository::new()));
        let items = service
            .get_all_items(
                &Context::background(),
                Uuid::new_v4(),
                PaginationParams::default(),
            )
            .await
            .unwrap();
        assert!(items.is_empty());
    }
}
