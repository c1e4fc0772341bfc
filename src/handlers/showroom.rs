use super::common::{
    created_response, map_service_error, no_content_response, ordered_uuids_from, success_response,
    validate_input, ReorderRequest,
};
use crate::{
    auth::{AuthRouterExt, ADMIN_ROLE},
    entities::showroom_node,
    errors::ApiError,
    services::showroom::ShowroomNodeInput,
    AppState,
};
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::Value;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/showroom/nodes",
    summary = "List showroom tour stops",
    responses(
        (status = 200, description = "Nodes in tour order", body = [showroom_node::Model])
    ),
    tag = "showroom"
)]
pub async fn list_nodes(State(state): State<AppState>) -> Result<Response, ApiError> {
    let nodes = state
        .services
        .showroom
        .list_nodes()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(nodes))
}

#[utoipa::path(
    post,
    path = "/api/v1/showroom/nodes",
    summary = "Add a showroom tour stop",
    request_body = ShowroomNodeInput,
    responses(
        (status = 201, description = "Node created", body = showroom_node::Model),
        (status = 400, description = "Invalid node", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "showroom"
)]
pub async fn create_node(
    State(state): State<AppState>,
    Json(payload): Json<ShowroomNodeInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let node = state
        .services
        .showroom
        .create_node(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(node))
}

#[utoipa::path(
    delete,
    path = "/api/v1/showroom/nodes/{id}",
    summary = "Remove a showroom tour stop",
    params(("id" = Uuid, Path, description = "Node id")),
    responses(
        (status = 204, description = "Node deleted"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Node not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "showroom"
)]
pub async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .showroom
        .delete_node(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[utoipa::path(
    put,
    path = "/api/v1/showroom/nodes/reorder/bulk",
    summary = "Reorder showroom tour stops",
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Nodes in their new order", body = [showroom_node::Model]),
        (status = 400, description = "ordered_ids missing or not an array", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "showroom"
)]
pub async fn reorder_nodes(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let ids = ordered_uuids_from(&body)?;
    let nodes = state
        .services
        .showroom
        .reorder_nodes(ids)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(nodes))
}

pub fn showroom_routes() -> Router<AppState> {
    let public = Router::new().route("/showroom/nodes", get(list_nodes));

    let admin = Router::new()
        .route("/showroom/nodes", post(create_node))
        .route("/showroom/nodes/reorder/bulk", put(reorder_nodes))
        .route("/showroom/nodes/:id", delete(delete_node))
        .with_role(ADMIN_ROLE);

    public.merge(admin)
}
