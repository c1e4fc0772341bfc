//! Category, material and color endpoints. The three tables share one generic
//! implementation; the macro only stamps out concretely typed, documented handlers.

use super::common::{
    created_response, map_service_error, no_content_response, ordered_ids_from, success_response,
    validate_input,
};
use crate::{
    auth::{AuthRouterExt, ADMIN_ROLE},
    entities::{category, color, material, ReferenceEntity, ReferenceInput},
    errors::ApiError,
    AppState,
};
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

async fn list_table<E>(state: &AppState) -> Result<Response, ApiError>
where
    E: ReferenceEntity,
    E::Model: Serialize + Send + Sync + sea_orm::IntoActiveModel<E::ActiveModel>,
{
    let rows = state
        .services
        .reference
        .list::<E>()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(rows))
}

async fn reset_table<E>(state: &AppState) -> Result<Response, ApiError>
where
    E: ReferenceEntity,
    E::Model: Serialize + Send + Sync + sea_orm::IntoActiveModel<E::ActiveModel>,
{
    let rows = state
        .services
        .reference
        .reset::<E>()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(rows))
}

async fn reorder_table<E>(state: &AppState, body: &Value) -> Result<Response, ApiError>
where
    E: ReferenceEntity,
    E::Model: Serialize + Send + Sync + sea_orm::IntoActiveModel<E::ActiveModel>,
{
    let ids = ordered_ids_from(body)?;
    let rows = state
        .services
        .reference
        .reorder::<E>(ids)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(rows))
}

async fn create_row<E>(state: &AppState, input: ReferenceInput) -> Result<Response, ApiError>
where
    E: ReferenceEntity,
    E::Model: Serialize + Send + Sync + sea_orm::IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: Send,
{
    validate_input(&input)?;
    let row = state
        .services
        .reference
        .create::<E>(input)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(row))
}

async fn delete_row<E>(state: &AppState, id: &str) -> Result<Response, ApiError>
where
    E: ReferenceEntity,
{
    state
        .services
        .reference
        .delete::<E>(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

macro_rules! reference_handlers {
    (
        entity: $entity:ident,
        tag: $tag:tt,
        list: $list:ident => $list_path:tt,
        create: $create:ident => $create_path:tt,
        reset: $reset:ident => $reset_path:tt,
        reorder: $reorder:ident => $reorder_path:tt,
        delete: $delete:ident => $delete_path:tt $(,)?
    ) => {
        #[utoipa::path(
            get,
            path = $list_path,
            description = "Rows by rank. An empty table is filled with the defaults first.",
            responses(
                (status = 200, description = "Rows by rank", body = [$entity::Model])
            ),
            tag = $tag
        )]
        pub async fn $list(State(state): State<AppState>) -> Result<Response, ApiError> {
            list_table::<$entity::Entity>(&state).await
        }

        #[utoipa::path(
            post,
            path = $create_path,
            request_body = ReferenceInput,
            responses(
                (status = 201, description = "Row created", body = $entity::Model),
                (status = 400, description = "Invalid row", body = crate::errors::ErrorResponse),
                (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
                (status = 409, description = "Id already taken", body = crate::errors::ErrorResponse)
            ),
            security(("Bearer" = [])),
            tag = $tag
        )]
        pub async fn $create(
            State(state): State<AppState>,
            Json(payload): Json<ReferenceInput>,
        ) -> Result<Response, ApiError> {
            create_row::<$entity::Entity>(&state, payload).await
        }

        #[utoipa::path(
            post,
            path = $reset_path,
            description = "Deletes every row and restores the defaults.",
            responses(
                (status = 200, description = "Default rows", body = [$entity::Model]),
                (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
            ),
            security(("Bearer" = [])),
            tag = $tag
        )]
        pub async fn $reset(State(state): State<AppState>) -> Result<Response, ApiError> {
            reset_table::<$entity::Entity>(&state).await
        }

        #[utoipa::path(
            put,
            path = $reorder_path,
            request_body = super::common::ReorderRequest,
            responses(
                (status = 200, description = "Rows in their new order", body = [$entity::Model]),
                (status = 400, description = "ordered_ids missing or not an array", body = crate::errors::ErrorResponse),
                (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
            ),
            security(("Bearer" = [])),
            tag = $tag
        )]
        pub async fn $reorder(
            State(state): State<AppState>,
            Json(body): Json<Value>,
        ) -> Result<Response, ApiError> {
            reorder_table::<$entity::Entity>(&state, &body).await
        }

        #[utoipa::path(
            delete,
            path = $delete_path,
            params(("id" = String, Path, description = "Row id")),
            responses(
                (status = 204, description = "Row deleted"),
                (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
                (status = 404, description = "Row not found", body = crate::errors::ErrorResponse)
            ),
            security(("Bearer" = [])),
            tag = $tag
        )]
        pub async fn $delete(
            State(state): State<AppState>,
            Path(id): Path<String>,
        ) -> Result<Response, ApiError> {
            delete_row::<$entity::Entity>(&state, &id).await
        }
    };
}

reference_handlers! {
    entity: category,
    tag: "categories",
    list: list_categories => "/api/v1/categories",
    create: create_category => "/api/v1/categories",
    reset: reset_categories => "/api/v1/categories/reset",
    reorder: reorder_categories => "/api/v1/categories/reorder/bulk",
    delete: delete_category => "/api/v1/categories/{id}",
}

reference_handlers! {
    entity: material,
    tag: "materials",
    list: list_materials => "/api/v1/materials",
    create: create_material => "/api/v1/materials",
    reset: reset_materials => "/api/v1/materials/reset",
    reorder: reorder_materials => "/api/v1/materials/reorder/bulk",
    delete: delete_material => "/api/v1/materials/{id}",
}

reference_handlers! {
    entity: color,
    tag: "colors",
    list: list_colors => "/api/v1/colors",
    create: create_color => "/api/v1/colors",
    reset: reset_colors => "/api/v1/colors/reset",
    reorder: reorder_colors => "/api/v1/colors/reorder/bulk",
    delete: delete_color => "/api/v1/colors/{id}",
}

pub fn reference_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/categories", get(list_categories))
        .route("/materials", get(list_materials))
        .route("/colors", get(list_colors));

    let admin = Router::new()
        .route("/categories", post(create_category))
        .route("/categories/reset", post(reset_categories))
        .route("/categories/reorder/bulk", put(reorder_categories))
        .route("/categories/:id", delete(delete_category))
        .route("/materials", post(create_material))
        .route("/materials/reset", post(reset_materials))
        .route("/materials/reorder/bulk", put(reorder_materials))
        .route("/materials/:id", delete(delete_material))
        .route("/colors", post(create_color))
        .route("/colors/reset", post(reset_colors))
        .route("/colors/reorder/bulk", put(reorder_colors))
        .route("/colors/:id", delete(delete_color))
        .with_role(ADMIN_ROLE);

    public.merge(admin)
}
