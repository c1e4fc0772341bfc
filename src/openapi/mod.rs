use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "1.0.0",
        description = r#"
# Plastics Product Catalog API

Bilingual (English / Turkish) catalog of plastic products.

## Features

- **Products**: CRUD, filtering, search and manual ordering
- **Color variants**: one submission becomes one product per color, grouped
- **Group sync**: push shared attributes to every color of a product
- **Reference data**: categories, materials and colors with default seeds
- **Showroom**: ordered 360° tour stops
- **Customers**: back-office contact book

## Authentication

Reads of the public catalog are open. Every write needs an admin token from
`POST /api/v1/auth/login`:

```
Authorization: Bearer <your-jwt-token>
```

## Languages

Pass `lang=tr` on product reads to get Turkish names in `display_name`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "products", description = "Products, variant groups and ordering"),
        (name = "categories", description = "Category reference data"),
        (name = "materials", description = "Material reference data"),
        (name = "colors", description = "Color palette reference data"),
        (name = "showroom", description = "Showroom tour"),
        (name = "customers", description = "Customer contact book"),
        (name = "auth", description = "Admin login"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::list_group,
        crate::handlers::products::create_product,
        crate::handlers::products::create_with_variants,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::sync_group,
        crate::handlers::products::reorder_products,

        // Reference data
        crate::handlers::reference::list_categories,
        crate::handlers::reference::create_category,
        crate::handlers::reference::reset_categories,
        crate::handlers::reference::reorder_categories,
        crate::handlers::reference::delete_category,
        crate::handlers::reference::list_materials,
        crate::handlers::reference::create_material,
        crate::handlers::reference::reset_materials,
        crate::handlers::reference::reorder_materials,
        crate::handlers::reference::delete_material,
        crate::handlers::reference::list_colors,
        crate::handlers::reference::create_color,
        crate::handlers::reference::reset_colors,
        crate::handlers::reference::reorder_colors,
        crate::handlers::reference::delete_color,

        // Showroom
        crate::handlers::showroom::list_nodes,
        crate::handlers::showroom::create_node,
        crate::handlers::showroom::delete_node,
        crate::handlers::showroom::reorder_nodes,

        // Customers
        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::delete_customer,

        // Auth & health
        crate::handlers::auth::login,
        crate::health::health_check,
        crate::health::status,
    ),
    components(
        schemas(
            // Product types
            crate::handlers::products::ProductRequest,
            crate::handlers::products::CreateWithVariantsRequest,
            crate::handlers::products::UpdateProductRequest,
            crate::handlers::products::SyncGroupRequest,
            crate::handlers::products::ProductResponse,
            crate::services::variants::ColorVariantInput,
            crate::models::catalog::Dimensions,
            crate::models::catalog::SizeVariant,
            crate::models::catalog::ColorVariant,
            crate::models::catalog::PrimaryColor,
            crate::models::catalog::Locale,

            // Reference and back-office types
            crate::entities::ReferenceInput,
            crate::entities::category::Model,
            crate::entities::material::Model,
            crate::entities::color::Model,
            crate::entities::showroom_node::Model,
            crate::entities::customer::Model,
            crate::services::showroom::ShowroomNodeInput,
            crate::services::customers::CustomerInput,
            crate::handlers::common::ReorderRequest,

            // Auth
            crate::auth::LoginCredentials,
            crate::auth::TokenResponse,

            // Error types
            crate::errors::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

/// Registers the `Bearer` scheme referenced by every protected route.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Catalog API"));
        assert!(json.contains("/api/v1/products/with-variants"));
        assert!(json.contains("/api/v1/colors/reorder/bulk"));
        assert!(json.contains("\"Bearer\""));
    }
}
