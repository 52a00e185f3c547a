//! A service for interacting with lists.

use super::list_repository::{List, ListRepository, NewList};
use crate::infra::{
    context::Context,
    error::{ApiResult, ClientError},
    pagination::PaginationParams,
    validation::Valid,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Business rules for lists, on top of a [`ListRepository`].
#[derive(Clone)]
pub struct ListService {
    repository: Arc<dyn ListRepository>,
}

impl ListService {
    /// Constructs a new [`ListService`].
    pub fn new(repository: Arc<dyn ListRepository>) -> Self {
        Self { repository }
    }

    /// Creates a new list.
    #[instrument(skip(self, ctx))]
    pub async fn create_list(&self, ctx: &Context, new_list: Valid<NewList>) -> ApiResult<List> {
        self.repository
            .create_list(ctx, new_list.into_inner())
            .await
    }

    /// Reads a list.
    #[instrument(skip(self, ctx))]
    pub async fn get_list(&self, ctx: &Context, id: Uuid) -> ApiResult<List> {
        let list = self
            .repository
            .fetch_list(ctx, id)
            .await?
            .ok_or(ClientError::NotFound)?;
        Ok(list)
    }

    /// Lists all lists.
    #[instrument(skip(self, ctx))]
    pub async fn get_all_lists(
        &self,
        ctx: &Context,
        params: PaginationParams,
    ) -> ApiResult<Vec<List>> {
        self.repository.list_lists(ctx, params).await
    }

    /// Deletes a list together with its items.
    #[instrument(skip(self, ctx))]
    pub async fn delete_list(&self, ctx: &Context, id: Uuid) -> ApiResult<()> {
        if !self.repository.delete_list(ctx, id).await? {
            return Err(ClientError::NotFound.into());
        }
        Ok(())
    }
}
