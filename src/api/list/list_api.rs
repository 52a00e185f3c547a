//! The list API implementation.

use crate::{
    app::API_ROOT,
    core::list::{
        list_repository::{List, NewList},
        list_service::ListService,
    },
    infra::{
        context::Context,
        error::{ApiResult, ClientError},
        extract::{Json, Query},
        pagination::PaginationParams,
        state::AppState,
        validation::Valid,
    },
};
use axum::{extract::State, Router};
use axum_extra::routing::{RouterExt, TypedPath};
use http::{header::LOCATION, HeaderName, StatusCode};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

/// The list API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .typed_post(create_list)
        .typed_get(get_list)
        .typed_get(get_all_lists)
        .typed_delete(delete_list)
}

#[derive(Deserialize, TypedPath)]
#[typed_path("/lists", rejection(ClientError))]
pub struct Lists;

#[derive(Deserialize, TypedPath)]
#[typed_path("/lists/:list_id", rejection(ClientError))]
pub struct ListsId {
    pub list_id: Uuid,
}

/// Creates a new list.
#[instrument(skip_all)]
async fn create_list(
    Lists: Lists,
    State(lists): State<ListService>,
    ctx: Context,
    Json(new_list): Json<NewList>,
) -> ApiResult<(StatusCode, [(HeaderName, String); 1], Json<List>)> {
    let new_list = Valid::new(new_list)?;
    let list = lists.create_list(&ctx, new_list).await?;
    let location = format!("{API_ROOT}{}", ListsId { list_id: list.id }.to_uri());
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(list)))
}

/// Gets a list.
#[instrument(skip_all, fields(list_id = %path.list_id))]
async fn get_list(
    path: ListsId,
    State(lists): State<ListService>,
    ctx: Context,
) -> ApiResult<Json<List>> {
    let list = lists.get_list(&ctx, path.list_id).await?;
    Ok(Json(list))
}

/// Lists all lists.
#[instrument(skip_all)]
async fn get_all_lists(
    Lists: Lists,
    State(lists): State<ListService>,
    ctx: Context,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<Vec<List>>> {
    let lists = lists.get_all_lists(&ctx, params).await?;
    Ok(Json(lists))
}

/// Deletes a list and its items.
#[instrument(skip_all, fields(list_id = %path.list_id))]
async fn delete_list(
    path: ListsId,
    State(lists): State<ListService>,
    ctx: Context,
) -> ApiResult<StatusCode> {
    lists.delete_list(&ctx, path.list_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
