use super::common::{
    created_response, map_service_error, no_content_response, ordered_uuids_from, success_response,
    validate_input, ReorderRequest,
};
use crate::{
    auth::{AuthRouterExt, ADMIN_ROLE},
    entities::product,
    errors::ApiError,
    models::catalog::{ColorVariant, Dimensions, Locale, PrimaryColor, SizeVariant},
    services::{
        catalog::{ProductFilter, ProductInput, ProductUpdate},
        group_sync::SyncFields,
        variants::ColorVariantInput,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Product create payload. camelCase field names are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ProductRequest {
    /// Generated as `PRD-<millis>-<hex>` when omitted
    #[serde(default)]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    #[schema(example = "Garden Chair")]
    pub name: String,
    #[serde(default, alias = "nameTr")]
    pub name_tr: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "descriptionTr")]
    pub description_tr: Option<String>,
    #[serde(default)]
    #[schema(example = "garden")]
    pub category: Option<String>,
    #[serde(default)]
    #[schema(example = "pp")]
    pub material: Option<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    #[serde(default, alias = "sizeVariants")]
    pub size_variants: Vec<SizeVariant>,
    #[serde(default, alias = "defaultSize")]
    pub default_size: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "imageScale")]
    #[validate(range(min = 50, max = 200))]
    pub image_scale: Option<i32>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default, alias = "colorVariants")]
    pub color_variants: Vec<ColorVariant>,
    #[serde(default, alias = "defaultColor")]
    pub default_color: Option<String>,
    #[serde(default, alias = "inStock")]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub order: Option<i32>,
}

impl From<ProductRequest> for ProductInput {
    fn from(req: ProductRequest) -> Self {
        let defaults = ProductInput::default();
        ProductInput {
            sku: req.sku,
            name: req.name,
            name_tr: req.name_tr,
            description: req.description,
            description_tr: req.description_tr,
            category: req.category,
            material: req.material,
            dimensions: req.dimensions.unwrap_or_default(),
            weight: req.weight.unwrap_or(defaults.weight),
            size_variants: req.size_variants,
            default_size: req.default_size,
            image: req.image,
            image_scale: req.image_scale.unwrap_or(defaults.image_scale),
            colors: req.colors,
            color_variants: req.color_variants,
            default_color: req.default_color,
            in_stock: req.in_stock.unwrap_or(defaults.in_stock),
            featured: req.featured.unwrap_or(defaults.featured),
            order: req.order.unwrap_or(defaults.order),
        }
    }
}

/// Base product plus the colors to expand it into.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateWithVariantsRequest {
    #[serde(flatten)]
    pub product: ProductRequest,
    /// One product is created per entry; an empty list creates the base product alone.
    /// Read before the flattened product fields, so the base never keeps the full list.
    #[serde(default, alias = "colorVariants", alias = "variants")]
    pub color_variants: Vec<ColorVariantInput>,
}

/// Partial update. Omitted fields are left alone; an empty string clears optional text.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(alias = "nameTr")]
    pub name_tr: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "descriptionTr")]
    pub description_tr: Option<String>,
    pub category: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<Dimensions>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    #[serde(alias = "sizeVariants")]
    pub size_variants: Option<Vec<SizeVariant>>,
    #[serde(alias = "defaultSize")]
    pub default_size: Option<String>,
    pub image: Option<String>,
    #[serde(alias = "imageScale")]
    #[validate(range(min = 50, max = 200))]
    pub image_scale: Option<i32>,
    pub colors: Option<Vec<String>>,
    #[serde(alias = "colorVariants")]
    pub color_variants: Option<Vec<ColorVariant>>,
    #[serde(alias = "defaultColor")]
    pub default_color: Option<String>,
    #[serde(alias = "inStock")]
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub order: Option<i32>,
}

impl From<UpdateProductRequest> for ProductUpdate {
    fn from(req: UpdateProductRequest) -> Self {
        ProductUpdate {
            sku: req.sku,
            name: req.name,
            name_tr: req.name_tr,
            description: req.description,
            description_tr: req.description_tr,
            category: req.category,
            material: req.material,
            dimensions: req.dimensions,
            weight: req.weight,
            size_variants: req.size_variants,
            default_size: req.default_size,
            image: req.image,
            image_scale: req.image_scale,
            colors: req.colors,
            color_variants: req.color_variants,
            default_color: req.default_color,
            in_stock: req.in_stock,
            featured: req.featured,
            order: req.order,
        }
    }
}

/// Shared attributes to push to every member of a group.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SyncGroupRequest {
    /// Allowed keys: dimensions, weight, material, category, description,
    /// description_tr, image, image_scale, size_variants, default_size, in_stock
    #[schema(value_type = Object, example = json!({ "weight": 5.0, "in_stock": false }))]
    #[serde(alias = "syncFields")]
    pub sync_fields: Value,
}

/// Product response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub name_tr: Option<String>,
    /// `name` or `name_tr`, depending on the requested language
    pub display_name: String,
    pub description: Option<String>,
    pub description_tr: Option<String>,
    pub category: Option<String>,
    pub material: Option<String>,
    pub dimensions: Dimensions,
    pub weight: f64,
    pub size_variants: Vec<SizeVariant>,
    pub default_size: Option<String>,
    pub image: Option<String>,
    pub image_scale: i32,
    pub colors: Vec<String>,
    pub color_variants: Vec<ColorVariant>,
    pub primary_color: Option<PrimaryColor>,
    pub default_color: Option<String>,
    pub group_id: Option<String>,
    pub in_stock: bool,
    pub featured: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn from_model(model: product::Model, locale: Locale) -> Self {
        Self {
            display_name: model.display_name(locale).to_string(),
            dimensions: model.dimensions(),
            size_variants: model.size_variants(),
            colors: model.colors(),
            color_variants: model.color_variants(),
            primary_color: model.primary_color(),
            id: model.id,
            sku: model.sku,
            name: model.name,
            name_tr: model.name_tr,
            description: model.description,
            description_tr: model.description_tr,
            category: model.category,
            material: model.material,
            weight: model.weight,
            default_size: model.default_size,
            image: model.image,
            image_scale: model.image_scale,
            default_color: model.default_color,
            group_id: model.group_id,
            in_stock: model.in_stock,
            featured: model.featured,
            order: model.sort_order,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn respond_list(models: Vec<product::Model>, locale: Locale) -> Vec<ProductResponse> {
    models
        .into_iter()
        .map(|model| ProductResponse::from_model(model, locale))
        .collect()
}

/// Catalog listing filters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Category id
    pub category: Option<String>,
    /// Case-insensitive match on name, Turkish name or sku
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub in_stock: Option<bool>,
    /// Only members of this color group
    pub group_id: Option<String>,
    /// `en` (default) or `tr`
    pub lang: Option<Locale>,
}

/// Language selector for single-product reads
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LangQuery {
    pub lang: Option<Locale>,
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    summary = "List products",
    description = "Products sorted by manual rank, newest first within a rank",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Products", body = [ProductResponse]),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Response, ApiError> {
    let locale = query.lang.unwrap_or_default();
    let filter = ProductFilter {
        category: query.category,
        search: query.search,
        featured: query.featured,
        in_stock: query.in_stock,
        group_id: query.group_id,
    };

    let products = state
        .services
        .catalog
        .list_products(filter)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(respond_list(products, locale)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    summary = "Get product",
    params(("id" = Uuid, Path, description = "Product id"), LangQuery),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LangQuery>,
) -> Result<Response, ApiError> {
    let product = state
        .services
        .catalog
        .get_product(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(ProductResponse::from_model(
        product,
        query.lang.unwrap_or_default(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/group/{group_id}",
    summary = "List a variant group",
    params(("group_id" = String, Path, description = "Variant group id"), LangQuery),
    responses(
        (status = 200, description = "Group members in creation order; empty when the group is unknown", body = [ProductResponse])
    ),
    tag = "products"
)]
pub async fn list_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<LangQuery>,
) -> Result<Response, ApiError> {
    let products = state
        .services
        .catalog
        .list_group(&group_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(respond_list(
        products,
        query.lang.unwrap_or_default(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    summary = "Create product",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product or unknown reference id", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let product = state
        .services
        .catalog
        .create_product(payload.into())
        .await
        .map_err(map_service_error)?;
    Ok(created_response(ProductResponse::from_model(
        product,
        Locale::default(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/with-variants",
    summary = "Create a product in several colors",
    description = "Creates one product per color variant, all sharing a new group id. Nothing is written if any variant is invalid.",
    request_body = CreateWithVariantsRequest,
    responses(
        (status = 201, description = "Products created", body = [ProductResponse]),
        (status = 400, description = "Invalid variant or unknown reference id", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn create_with_variants(
    State(state): State<AppState>,
    Json(payload): Json<CreateWithVariantsRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload.product)?;
    let products = state
        .services
        .variants
        .create_with_variants(payload.product.into(), payload.color_variants)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(respond_list(products, Locale::default())))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    summary = "Update product",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid update", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let product = state
        .services
        .catalog
        .update_product(id, payload.into())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(ProductResponse::from_model(
        product,
        Locale::default(),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    summary = "Delete product",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .catalog
        .delete_product(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[utoipa::path(
    put,
    path = "/api/v1/products/sync-group/{group_id}",
    summary = "Synchronize a variant group",
    description = "Writes the given shared fields to every member of the group. Per-variant fields are rejected.",
    params(("group_id" = String, Path, description = "Variant group id")),
    request_body = SyncGroupRequest,
    responses(
        (status = 200, description = "Refreshed group", body = [ProductResponse]),
        (status = 400, description = "Field not allowed or malformed", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Group not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn sync_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let raw = body
        .get("sync_fields")
        .or_else(|| body.get("syncFields"))
        .ok_or_else(|| ApiError::bad_request("sync_fields is required"))?;
    let fields = SyncFields::from_json(raw).map_err(map_service_error)?;

    let products = state
        .services
        .group_sync
        .sync_group(&group_id, fields)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(respond_list(products, Locale::default())))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/reorder/bulk",
    summary = "Reorder products",
    description = "Assigns rank 1..N in the given order and returns the re-sorted catalog. Products not listed keep their rank.",
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Re-sorted catalog", body = [ProductResponse]),
        (status = 400, description = "ordered_ids missing or not an array", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn reorder_products(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let ids = ordered_uuids_from(&body)?;
    let products = state
        .services
        .catalog
        .reorder_products(ids)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(respond_list(products, Locale::default())))
}

pub fn product_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/products", get(list_products))
        .route("/products/group/:group_id", get(list_group))
        .route("/products/:id", get(get_product));

    let admin = Router::new()
        .route("/products", post(create_product))
        .route("/products/with-variants", post(create_with_variants))
        .route("/products/sync-group/:group_id", put(sync_group))
        .route("/products/reorder/bulk", put(reorder_products))
        .route("/products/:id", put(update_product).delete(delete_product))
        .with_role(ADMIN_ROLE);

    public.merge(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("colorVariants")]
    #[case("color_variants")]
    #[case("variants")]
    fn expansion_list_is_taken_from_the_product_payload(#[case] key: &str) {
        let mut body = json!({
            "name": "Crate",
            "nameTr": "Kasa",
            "imageScale": 120
        });
        body[key] = json!([
            { "colorId": "red", "colorName": "Red", "hex": "#D32F2F" },
            { "colorId": "blue", "colorName": "Blue" }
        ]);

        let parsed: CreateWithVariantsRequest = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.product.name_tr.as_deref(), Some("Kasa"));
        assert_eq!(parsed.product.image_scale, Some(120));
        assert_eq!(parsed.color_variants.len(), 2);
        assert_eq!(parsed.color_variants[0].hex.as_deref(), Some("#D32F2F"));
        assert!(parsed.product.color_variants.is_empty());
    }

    #[test]
    fn request_defaults_fill_product_input() {
        let input: ProductInput = ProductRequest {
            name: "Stool".into(),
            ..Default::default()
        }
        .into();
        assert_eq!(input.image_scale, 100);
        assert!(input.in_stock);
        assert!(!input.featured);
        assert_eq!(input.dimensions, Dimensions::default());
    }
}
