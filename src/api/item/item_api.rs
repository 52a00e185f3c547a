//! The item API implementation.

use crate::{
    app::API_ROOT,
    core::item::{
        item_repository::{Item, NewItem},
        item_service::ItemService,
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

/// The item API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .typed_post(create_item)
        .typed_get(get_item)
        .typed_get(get_all_items)
        .typed_put(update_item)
        .typed_put(update_status)
        .typed_delete(delete_item)
}

#[derive(Deserialize, TypedPath)]
#[typed_path("/items", rejection(ClientError))]
pub struct Items;

#[derive(Deserialize, TypedPath)]
#[typed_path("/items/:item_id", rejection(ClientError))]
pub struct ItemsId {
    pub item_id: Uuid,
}

#[derive(Deserialize, TypedPath)]
#[typed_path("/items/status/:item_id", rejection(ClientError))]
pub struct ItemsStatus {
    pub item_id: Uuid,
}

#[derive(Deserialize, TypedPath)]
#[typed_path("/items/list/:list_id", rejection(ClientError))]
pub struct ItemsInList {
    pub list_id: Uuid,
}

/// Which items to list.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsParams {
    /// The list to list items from.
    list_id: Uuid,
    /// The 0-indexed page to fetch.
    page: Option<i64>,
    /// The number of items per page, all items if not set.
    page_size: Option<i64>,
}

/// Creates a new item in a list.
#[instrument(skip_all, fields(list_id = %path.list_id))]
async fn create_item(
    path: ItemsInList,
    State(items): State<ItemService>,
    ctx: Context,
    Json(new_item): Json<NewItem>,
) -> ApiResult<(StatusCode, [(HeaderName, String); 1], Json<Item>)> {
    let new_item = Valid::new(new_item)?;
    let item = items.create_item(&ctx, path.list_id, new_item).await?;
    let location = format!("{API_ROOT}{}", ItemsId { item_id: item.id }.to_uri());
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(item)))
}

/// Gets an item.
#[instrument(skip_all, fields(item_id = %path.item_id))]
async fn get_item(
    path: ItemsId,
    State(items): State<ItemService>,
    ctx: Context,
) -> ApiResult<Json<Item>> {
    let item = items.get_item(&ctx, path.item_id).await?;
    Ok(Json(item))
}

/// Lists the items of a list.
#[instrument(skip_all)]
async fn get_all_items(
    Items: Items,
    State(items): State<ItemService>,
    ctx: Context,
    Query(params): Query<ListItemsParams>,
) -> ApiResult<Json<Vec<Item>>> {
    let page = PaginationParams::new(params.page, params.page_size);
    let items = items.get_all_items(&ctx, params.list_id, page).await?;
    Ok(Json(items))
}

/// Replaces the content of an item.
#[instrument(skip_all, fields(item_id = %path.item_id))]
async fn update_item(
    path: ItemsId,
    State(items): State<ItemService>,
    ctx: Context,
    Json(new_item): Json<NewItem>,
) -> ApiResult<Json<Item>> {
    let new_item = Valid::new(new_item)?;
    let item = items.update_item(&ctx, path.item_id, new_item).await?;
    Ok(Json(item))
}

/// Flips the status of an item.
#[instrument(skip_all, fields(item_id = %path.item_id))]
async fn update_status(
    path: ItemsStatus,
    State(items): State<ItemService>,
    ctx: Context,
) -> ApiResult<Json<Item>> {
    let item = items.update_status(&ctx, path.item_id).await?;
    Ok(Json(item))
}

/// Deletes an item.
#[instrument(skip_all, fields(item_id = %path.item_id))]
async fn delete_item(
    path: ItemsId,
    State(items): State<ItemService>,
    ctx: Context,
) -> ApiResult<StatusCode> {
    items.delete_item(&ctx, path.item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::app::testing::{create_list, send, test_app};
    use crate::core::item::item_repository::Item;
    use crate::infra::error::ErrorBody;
    use http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn buy_milk_lifecycle() {
        let app = test_app();
        let list_id = create_list(&app, "Groceries").await;

        let (status, headers, body) = send(
            &app,
            "POST",
            &format!("/api/v1/items/list/{list_id}"),
            Some(json!({ "title": "Buy milk", "status": false })),
        )
        .await;
        assert_eq!(StatusCode::CREATED, status);
        let created: Item = serde_json::from_slice(&body).unwrap();
        assert_eq!(list_id, created.list_id);
        assert_eq!("Buy milk", created.title);
        assert!(!created.status);
        let item_id = created.id;
        assert_eq!(format!("/api/v1/items/{item_id}"), headers["location"]);

        let (status, _, body) = send(&app, "GET", &format!("/api/v1/items/{item_id}"), None).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(created, serde_json::from_slice::<Item>(&body).unwrap());

        let status_url = format!("/api/v1/items/status/{item_id}");
        let (status, _, body) = send(&app, "PUT", &status_url, None).await;
        assert_eq!(StatusCode::OK, status);
        assert!(serde_json::from_slice::<Item>(&body).unwrap().status);

        let (status, _, body) = send(&app, "PUT", &status_url, None).await;
        assert_eq!(StatusCode::OK, status);
        assert!(!serde_json::from_slice::<Item>(&body).unwrap().status);

        let (status, _, body) =
            send(&app, "DELETE", &format!("/api/v1/items/{item_id}"), None).await;
        assert_eq!(StatusCode::NO_CONTENT, status);
        assert!(body.is_empty());

        let (status, _, body) = send(&app, "GET", &format!("/api/v1/items/{item_id}"), None).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!("not found", error.message());

        let after_delete = [
            (
                "PUT",
                format!("/api/v1/items/{item_id}"),
                Some(json!({ "title": "Buy oat milk" })),
            ),
            ("PUT", status_url.clone(), None),
            ("DELETE", format!("/api/v1/items/{item_id}"), None),
        ];
        for (method, uri, body) in after_delete {
            let (status, _, _) = send(&app, method, &uri, body).await;
            assert_eq!(StatusCode::NOT_FOUND, status, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn update_replaces_content() {
        let app = test_app();
        let list_id = create_list(&app, "Groceries").await;
        let (_, _, body) = send(
            &app,
            "POST",
            &format!("/api/v1/items/list/{list_id}"),
            Some(json!({ "title": "Buy milk" })),
        )
        .await;
        let created: Item = serde_json::from_slice(&body).unwrap();

        let (status, _, body) = send(
            &app,
            "PUT",
            &format!("/api/v1/items/{}", created.id),
            Some(json!({ "title": "Buy oat milk", "description": "Two cartons" })),
        )
        .await;
        assert_eq!(StatusCode::OK, status);
        let updated: Item = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.id, updated.id);
        assert_eq!(list_id, updated.list_id);
        assert_eq!("Buy oat milk", updated.title);
        assert_eq!(Some("Two cartons".to_string()), updated.description);
    }

    #[tokio::test]
    async fn unknown_items_are_not_found() {
        let app = test_app();
        let id = Uuid::new_v4();
        let requests = [
            ("GET", format!("/api/v1/items/{id}"), None),
            (
                "PUT",
                format!("/api/v1/items/{id}"),
                Some(json!({ "title": "Buy milk" })),
            ),
            ("PUT", format!("/api/v1/items/status/{id}"), None),
            ("DELETE", format!("/api/v1/items/{id}"), None),
        ];
        for (method, uri, body) in requests {
            let (status, _, _) = send(&app, method, &uri, body).await;
            assert_eq!(StatusCode::NOT_FOUND, status, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn create_in_unknown_list_is_not_found() {
        let app = test_app();
        let (status, _, _) = send(
            &app,
            "POST",
            &format!("/api/v1/items/list/{}", Uuid::new_v4()),
            Some(json!({ "title": "Buy milk" })),
        )
        .await;
        assert_eq!(StatusCode::NOT_FOUND, status);
    }

    #[tokio::test]
    async fn malformed_ids_are_bad_requests() {
        let app = test_app();
        let (status, _, body) = send(&app, "GET", "/api/v1/items/not-a-uuid", None).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert!(serde_json::from_slice::<ErrorBody>(&body).is_ok());

        let (status, _, _) = send(&app, "GET", "/api/v1/items?listId=nope", None).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
    }

    #[tokio::test]
    async fn list_id_is_required() {
        let app = test_app();
        let (status, _, _) = send(&app, "GET", "/api/v1/items", None).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
    }

    #[tokio::test]
    async fn empty_title_is_unprocessable() {
        let app = test_app();
        let list_id = create_list(&app, "Groceries").await;
        let (status, _, _) = send(
            &app,
            "POST",
            &format!("/api/v1/items/list/{list_id}"),
            Some(json!({ "title": "" })),
        )
        .await;
        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, status);
    }

    #[tokio::test]
    async fn get_all_is_ordered_and_paged() {
        let app = test_app();
        let list_id = create_list(&app, "Groceries").await;

        let (status, _, body) =
            send(&app, "GET", &format!("/api/v1/items?listId={list_id}"), None).await;
        assert_eq!(StatusCode::OK, status);
        assert!(serde_json::from_slice::<Vec<Item>>(&body).unwrap().is_empty());

        for title in ["Buy milk", "Buy bread", "Buy eggs"] {
            send(
                &app,
                "POST",
                &format!("/api/v1/items/list/{list_id}"),
                Some(json!({ "title": title })),
            )
            .await;
        }

        let (_, _, body) =
            send(&app, "GET", &format!("/api/v1/items?listId={list_id}"), None).await;
        let titles: Vec<String> = serde_json::from_slice::<Vec<Item>>(&body)
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(vec!["Buy milk", "Buy bread", "Buy eggs"], titles);

        let (_, _, body) = send(
            &app,
            "GET",
            &format!("/api/v1/items?listId={list_id}&page=1&pageSize=2"),
            None,
        )
        .await;
        let page: Vec<Item> = serde_json::from_slice(&body).unwrap();
        assert_eq!(1, page.len());
        assert_eq!("Buy eggs", page[0].title);
    }
}
