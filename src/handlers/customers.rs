use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    auth::{AuthRouterExt, ADMIN_ROLE},
    entities::customer,
    errors::ApiError,
    services::customers::CustomerInput,
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerSearchQuery {
    /// Case-insensitive match on name, company, email or country
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/customers",
    summary = "List customers",
    params(CustomerSearchQuery),
    responses(
        (status = 200, description = "Customers, newest first", body = [customer::Model]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerSearchQuery>,
) -> Result<Response, ApiError> {
    let customers = state
        .services
        .customers
        .list_customers(query.search)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(customers))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    summary = "Get customer",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer", body = customer::Model),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let customer = state
        .services
        .customers
        .get_customer(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(customer))
}

#[utoipa::path(
    post,
    path = "/api/v1/customers",
    summary = "Create customer",
    request_body = CustomerInput,
    responses(
        (status = 201, description = "Customer created", body = customer::Model),
        (status = 400, description = "Invalid customer", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CustomerInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let customer = state
        .services
        .customers
        .create_customer(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(customer))
}

#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    summary = "Delete customer",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .customers
        .delete_customer(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

/// Customer records are admin-only, reads included.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/:id", get(get_customer).delete(delete_customer))
        .with_role(ADMIN_ROLE)
}
