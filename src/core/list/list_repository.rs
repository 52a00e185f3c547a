//! Types and functions for storing and loading lists.

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

/// A new list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewList {
    /// The list's name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// An existing list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct List {
    /// The list's public id.
    pub id: Uuid,
    /// The list's name.
    pub name: String,
    /// When the list was created.
    pub created_at: DateTime<Utc>,
}

/// Anything that can store lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Creates a new list.
    async fn create_list(&self, ctx: &Context, new_list: NewList) -> ApiResult<List>;

    /// Fetches a list.
    async fn fetch_list(&self, ctx: &Context, id: Uuid) -> ApiResult<Option<List>>;

    /// Lists lists, oldest first.
    async fn list_lists(&self, ctx: &Context, params: PaginationParams) -> ApiResult<Vec<List>>;

    /// Deletes a list and its items, returning whether it existed.
    async fn delete_list(&self, ctx: &Context, id: Uuid) -> ApiResult<bool>;
}

#[async_trait]
impl ListRepository for PgRepository {
    #[instrument(skip(self, ctx))]
    async fn create_list(&self, ctx: &Context, new_list: NewList) -> ApiResult<List> {
        ctx.run(async move {
            let mut tx = self.begin().await?;
            let list = sqlx::query_as::<_, List>(
                r#"
                INSERT INTO lists (public_id, name)
                VALUES ($1, $2)
                RETURNING public_id AS id, name, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(new_list.name)
            .fetch_one(&mut *tx)
            .await?;
            tx.commit().await?;
            tracing::info!("Created list {:?}", list);
            Ok::<_, ApiError>(list)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn fetch_list(&self, ctx: &Context, id: Uuid) -> ApiResult<Option<List>> {
        ctx.run(async move {
            let mut tx = self.begin().await?;
            let list = sqlx::query_as::<_, List>(
                r#"
                SELECT public_id AS id, name, created_at FROM lists
                WHERE public_id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .instrument(tracing::info_span!("fetch_optional"))
            .await?;
            tx.commit().await?;
            Ok::<_, ApiError>(list)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn list_lists(&self, ctx: &Context, params: PaginationParams) -> ApiResult<Vec<List>> {
        ctx.run(async move {
            let mut tx = self.begin().await?;
            let lists = sqlx::query_as::<_, List>(
                r#"
                SELECT public_id AS id, name, created_at FROM lists
                ORDER BY lists.id
                LIMIT $1
                OFFSET $2
                "#,
            )
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&mut *tx)
            .instrument(tracing::info_span!("fetch_all"))
            .await?;
            tx.commit().await?;
            tracing::info!("Listed {} lists", lists.len());
            Ok::<_, ApiError>(lists)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn delete_list(&self, ctx: &Context, id: Uuid) -> ApiResult<bool> {
        ctx.run(async move {
            let mut tx = self.begin().await?;
            let rows = sqlx::query("DELETE FROM lists WHERE public_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok::<_, ApiError>(rows.rows_affected() > 0)
        })
        .await
    }
}

#[async_trait]
impl ListRepository for MemoryRepository {
    #[instrument(skip(self, ctx))]
    async fn create_list(&self, ctx: &Context, new_list: NewList) -> ApiResult<List> {
        ctx.run(async move {
            let mut store = self.store.write().await;
            let list = List {
                id: Uuid::new_v4(),
                name: new_list.name,
                created_at: Utc::now(),
            };
            store.lists.push(list.clone());
            tracing::info!("Created list {:?}", list);
            Ok::<_, ApiError>(list)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn fetch_list(&self, ctx: &Context, id: Uuid) -> ApiResult<Option<List>> {
        ctx.run(async move {
            let store = self.store.read().await;
            Ok::<_, ApiError>(store.lists.iter().find(|l| l.id == id).cloned())
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn list_lists(&self, ctx: &Context, params: PaginationParams) -> ApiResult<Vec<List>> {
        ctx.run(async move {
            let store = self.store.read().await;
            Ok::<_, ApiError>(params.apply(store.lists.iter().cloned()))
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn delete_list(&self, ctx: &Context, id: Uuid) -> ApiResult<bool> {
        ctx.run(async move {
            let mut store = self.store.write().await;
            let before = store.lists.len();
            store.lists.retain(|l| l.id != id);
            if store.lists.len() == before {
                return Ok(false);
            }
            store.items.retain(|i| i.list_id != id);
            Ok::<_, ApiError>(true)
        })
        .await
    }
}
