//! Types and functions for storing and loading items.

use crate::infra::{
    context::Context,
    database::PgRepository,
    error::{ApiError, ApiResult},
    memory::MemoryRepository,
    pagination::PaginationParams,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{instrument, Instrument};
use uuid::Uuid;
use validator::Validate;

/// The content of an item, as submitted by a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewItem {
    /// The item's title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// The item's description.
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the item is complete. Only honored on creation.
    #[serde(default)]
    pub status: bool,
}

/// An existing item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// The item's public id.
    pub id: Uuid,
    /// The public id of the list the item belongs to.
    pub list_id: Uuid,
    /// The item's title.
    pub title: String,
    /// The item's description.
    pub description: Option<String>,
    /// Whether the item is complete.
    pub status: bool,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last changed.
    pub updated_at: DateTime<Utc>,
}

/// Anything that can store items.
///
/// Lookups by id return `None` when the item, or for creation the list, does not exist.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Creates a new item in a list.
    async fn create_item(
        &self,
        ctx: &Context,
        list_id: Uuid,
        new_item: NewItem,
    ) -> ApiResult<Option<Item>>;

    /// Fetches an item.
    async fn fetch_item(&self, ctx: &Context, id: Uuid) -> ApiResult<Option<Item>>;

    /// Lists the items of a list, oldest first.
    async fn list_items(
        &self,
        ctx: &Context,
        list_id: Uuid,
        params: PaginationParams,
    ) -> ApiResult<Vec<Item>>;

    /// Replaces the title and description of an item.
    async fn update_item(
        &self,
        ctx: &Context,
        id: Uuid,
        new_item: NewItem,
    ) -> ApiResult<Option<Item>>;

    /// Flips the status of an item.
    async fn toggle_item_status(&self, ctx: &Context, id: Uuid) -> ApiResult<Option<Item>>;

    /// Deletes an item, returning whether it existed.
    async fn delete_item(&self, ctx: &Context, id: Uuid) -> ApiResult<bool>;
}

/// Joins a set of item rows with their lists to produce [`Item`]s.
macro_rules! select_items {
    ($from:literal) => {
        concat!(
            "SELECT i.public_id AS id, l.public_id AS list_id, i.title, i.description, ",
            "i.status, i.created_at, i.updated_at FROM ",
            $from,
            " i JOIN lists l ON l.id = i.list_id"
        )
    };
}

#[async_trait]
impl ItemRepository for PgRepository {
    #[instrument(skip(self, ctx))]
    async fn create_item(
        &self,
        ctx: &Context,
        list_id: Uuid,
        new_item: NewItem,
    ) -> ApiResult<Option<Item>> {
        ctx.run(async move {
            let mut tx = self.begin().await?;
            let item = sqlx::query_as::<_, Item>(concat!(
                r#"
                WITH inserted AS (
                    INSERT INTO items (public_id, list_id, title, description, status)
                    SELECT $1, lists.id, $3, $4, $5 FROM lists
                    WHERE lists.public_id = $2
                    RETURNING *
                )
                "#,
                select_items!("inserted")
            ))
            .bind(Uuid::new_v4())
            .bind(list_id)
            .bind(new_item.title)
            .bind(new_item.description)
            .bind(new_item.status)
            .fetch_optional(&mut *tx)
            .await?;
            tx.commit().await?;
            tracing::info!("Created item {:?}", item);
            Ok::<_, ApiError>(item)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn fetch_item(&self, ctx: &Context, id: Uuid) -> ApiResult<Option<Item>> {
        ctx.run(async move {
            let mut tx = self.begin().await?;
            let item = sqlx::query_as::<_, Item>(concat!(
                select_items!("items"),
                " WHERE i.public_id = $1"
            ))
            .bind(id)
            .fetch_optional(&mut *tx)
            .instrument(tracing::info_span!("fetch_optional"))
            .await?;
            tx.commit().await?;
            tracing::info!("Found item: {:?}", item);
            Ok::<_, ApiError>(item)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn list_items(
        &self,
        ctx: &Context,
        list_id: Uuid,
        params: PaginationParams,
    ) -> ApiResult<Vec<Item>> {
        ctx.run(async move {
            let mut tx = self.begin().await?;
            let items = sqlx::query_as::<_, Item>(concat!(
                select_items!("items"),
                " WHERE l.public_id = $1 ORDER BY i.id LIMIT $2 OFFSET $3"
            ))
            .bind(list_id)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&mut *tx)
            .instrument(tracing::info_span!("fetch_all"))
            .await?;
            tx.commit().await?;
            tracing::info!("Listed {} items", items.len());
            Ok::<_, ApiError>(items)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn update_item(
        &self,
        ctx: &Context,
        id: Uuid,
        new_item: NewItem,
    ) -> ApiResult<Option<Item>> {
        ctx.run(async move {
            let mut tx = self.begin().await?;
            let item = sqlx::query_as::<_, Item>(concat!(
                r#"
                WITH updated AS (
                    UPDATE items
                    SET title = $2, description = $3, updated_at = now()
                    WHERE public_id = $1
                    RETURNING *
                )
                "#,
                select_items!("updated")
            ))
            .bind(id)
            .bind(new_item.title)
            .bind(new_item.description)
            .fetch_optional(&mut *tx)
            .await?;
            tx.commit().await?;
            tracing::info!("Updated item {:?}", item);
            Ok::<_, ApiError>(item)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn toggle_item_status(&self, ctx: &Context, id: Uuid) -> ApiResult<Option<Item>> {
        ctx.run(async move {
            let mut tx = self.begin().await?;
            let item = sqlx::query_as::<_, Item>(concat!(
                r#"
                WITH updated AS (
                    UPDATE items
                    SET status = NOT status, updated_at = now()
                    WHERE public_id = $1
                    RETURNING *
                )
                "#,
                select_items!("updated")
            ))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
            tx.commit().await?;
            tracing::info!("Toggled item {:?}", item);
            Ok::<_, ApiError>(item)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn delete_item(&self, ctx: &Context, id: Uuid) -> ApiResult<bool> {
        ctx.run(async move {
            let mut tx = self.begin().await?;
            let rows = sqlx::query("DELETE FROM items WHERE public_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            if rows.rows_affected() == 0 {
                tracing::warn!("Item not found");
                return Ok(false);
            }
            tracing::info!("Deleted item");
            Ok::<_, ApiError>(true)
        })
        .await
    }
}

#[async_trait]
impl ItemRepository for MemoryRepository {
    #[instrument(skip(self, ctx))]
    async fn create_item(
        &self,
        ctx: &Context,
        list_id: Uuid,
        new_item: NewItem,
    ) -> ApiResult<Option<Item>> {
        ctx.run(async move {
            let mut store = self.store.write().await;
            if !store.lists.iter().any(|l| l.id == list_id) {
                tracing::warn!("List not found");
                return Ok(None);
            }
            let now = Utc::now();
            let item = Item {
                id: Uuid::new_v4(),
                list_id,
                title: new_item.title,
                description: new_item.description,
                status: new_item.status,
                created_at: now,
                updated_at: now,
            };
            store.items.push(item.clone());
            tracing::info!("Created item {:?}", item);
            Ok::<_, ApiError>(Some(item))
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn fetch_item(&self, ctx: &Context, id: Uuid) -> ApiResult<Option<Item>> {
        ctx.run(async move {
            let store = self.store.read().await;
            Ok::<_, ApiError>(store.items.iter().find(|i| i.id == id).cloned())
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn list_items(
        &self,
        ctx: &Context,
        list_id: Uuid,
        params: PaginationParams,
    ) -> ApiResult<Vec<Item>> {
        ctx.run(async move {
            let store = self.store.read().await;
            let items = store.items.iter().filter(|i| i.list_id == list_id).cloned();
            Ok::<_, ApiError>(params.apply(items))
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn update_item(
        &self,
        ctx: &Context,
        id: Uuid,
        new_item: NewItem,
    ) -> ApiResult<Option<Item>> {
        ctx.run(async move {
            let mut store = self.store.write().await;
            let item = store.items.iter_mut().find(|i| i.id == id).map(|item| {
                item.title = new_item.title;
                item.description = new_item.description;
                item.updated_at = Utc::now();
                item.clone()
            });
            Ok::<_, ApiError>(item)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn toggle_item_status(&self, ctx: &Context, id: Uuid) -> ApiResult<Option<Item>> {
        ctx.run(async move {
            let mut store = self.store.write().await;
            let item = store.items.iter_mut().find(|i| i.id == id).map(|item| {
                item.status = !item.status;
                item.updated_at = Utc::now();
                item.clone()
            });
            Ok::<_, ApiError>(item)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn delete_item(&self, ctx: &Context, id: Uuid) -> ApiResult<bool> {
        ctx.run(async move {
            let mut store = self.store.write().await;
            let before = store.items.len();
            store.items.retain(|i| i.id != id);
            Ok::<_, ApiError>(store.items.len() < before)
        })
        .await
    }
}
