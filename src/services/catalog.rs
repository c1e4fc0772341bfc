use crate::{
    db::DbPool,
    entities::product,
    errors::ServiceError,
    models::catalog::{
        normalize_colors, ColorVariant, Dimensions, PrimaryColor, SizeVariant, DEFAULT_IMAGE_SCALE,
        MAX_IMAGE_SCALE, MIN_IMAGE_SCALE,
    },
    services::{
        reference::{ProductRefs, ReferenceDataService},
        reorder,
    },
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Everything needed to persist a product. Shared by single create and variant expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    /// Generated when absent
    pub sku: Option<String>,
    pub name: String,
    pub name_tr: Option<String>,
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
    pub default_color: Option<String>,
    pub in_stock: bool,
    pub featured: bool,
    pub order: i32,
}

impl Default for ProductInput {
    fn default() -> Self {
        Self {
            sku: None,
            name: String::new(),
            name_tr: None,
            description: None,
            description_tr: None,
            category: None,
            material: None,
            dimensions: Dimensions::default(),
            weight: 0.0,
            size_variants: Vec::new(),
            default_size: None,
            image: None,
            image_scale: DEFAULT_IMAGE_SCALE,
            colors: Vec::new(),
            color_variants: Vec::new(),
            default_color: None,
            in_stock: true,
            featured: false,
            order: 0,
        }
    }
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::ValidationError("name is required".into()));
        }
        check_image_scale(self.image_scale)?;
        check_weight(self.weight)?;
        if self
            .color_variants
            .iter()
            .any(|v| v.color_id.trim().is_empty())
        {
            return Err(ServiceError::ValidationError(
                "every color variant needs a color id".into(),
            ));
        }
        Ok(())
    }

    /// Trims lookup ids so the stored values are the ones that were checked.
    pub fn with_trimmed_refs(mut self) -> Self {
        self.category = ref_id(self.category);
        self.material = ref_id(self.material);
        self.default_color = ref_id(self.default_color);
        self.colors = trim_ids(self.colors);
        trim_variant_ids(&mut self.color_variants);
        self
    }

    pub fn refs(&self) -> ProductRefs<'_> {
        let mut colors: Vec<&str> = self.colors.iter().map(String::as_str).collect();
        colors.extend(self.color_variants.iter().map(|v| v.color_id.as_str()));
        colors.extend(self.default_color.as_deref());
        ProductRefs {
            category: self.category.as_deref(),
            material: self.material.as_deref(),
            colors,
        }
    }
}

pub(crate) fn check_image_scale(scale: i32) -> Result<(), ServiceError> {
    if (MIN_IMAGE_SCALE..=MAX_IMAGE_SCALE).contains(&scale) {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(format!(
            "image_scale must be between {MIN_IMAGE_SCALE} and {MAX_IMAGE_SCALE}, got {scale}"
        )))
    }
}

pub(crate) fn check_weight(weight: f64) -> Result<(), ServiceError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(format!(
            "weight must be a non-negative number, got {weight}"
        )))
    }
}

/// `PRD-<unix millis>-<4 hex digits>`
pub fn generate_sku() -> String {
    format!(
        "PRD-{}-{:04X}",
        Utc::now().timestamp_millis(),
        rand::random::<u16>()
    )
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ServiceError> {
    Ok(serde_json::to_value(value)?)
}

/// Builds the row for `input`. `colors` is normalized against `color_variants` here.
pub(crate) fn product_active_model(
    input: &ProductInput,
    sku: String,
    group_id: Option<String>,
    primary_color: Option<&PrimaryColor>,
    created_at: DateTime<Utc>,
) -> Result<product::ActiveModel, ServiceError> {
    let colors = normalize_colors(&input.color_variants, input.colors.clone());

    Ok(product::ActiveModel {
        id: Set(Uuid::new_v4()),
        sku: Set(sku),
        name: Set(input.name.trim().to_string()),
        name_tr: Set(non_blank(input.name_tr.clone())),
        description: Set(non_blank(input.description.clone())),
        description_tr: Set(non_blank(input.description_tr.clone())),
        category: Set(non_blank(input.category.clone())),
        material: Set(non_blank(input.material.clone())),
        dimensions: Set(to_json(&input.dimensions)?),
        weight: Set(input.weight),
        size_variants: Set(to_json(&input.size_variants)?),
        default_size: Set(non_blank(input.default_size.clone())),
        image: Set(non_blank(input.image.clone())),
        image_scale: Set(input.image_scale),
        colors: Set(to_json(&colors)?),
        color_variants: Set(to_json(&input.color_variants)?),
        primary_color: Set(primary_color.map(to_json).transpose()?),
        default_color: Set(non_blank(input.default_color.clone())),
        group_id: Set(group_id),
        in_stock: Set(input.in_stock),
        featured: Set(input.featured),
        sort_order: Set(input.order),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    })
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Trimmed lookup id; blank means none.
pub(crate) fn ref_id(value: Option<String>) -> Option<String> {
    non_blank(value).map(|v| v.trim().to_string())
}

fn trim_ids(ids: Vec<String>) -> Vec<String> {
    ids.into_iter().filter_map(|id| ref_id(Some(id))).collect()
}

fn trim_variant_ids(variants: &mut [ColorVariant]) {
    for variant in variants {
        variant.color_id = variant.color_id.trim().to_string();
    }
}

/// Catalog listing filter. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub in_stock: Option<bool>,
    pub group_id: Option<String>,
}

/// Partial update. `None` leaves a field alone; an empty string clears an optional text field.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub name_tr: Option<String>,
    pub description: Option<String>,
    pub description_tr: Option<String>,
    pub category: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub weight: Option<f64>,
    pub size_variants: Option<Vec<SizeVariant>>,
    pub default_size: Option<String>,
    pub image: Option<String>,
    pub image_scale: Option<i32>,
    pub colors: Option<Vec<String>>,
    pub color_variants: Option<Vec<ColorVariant>>,
    pub default_color: Option<String>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub order: Option<i32>,
}

impl ProductUpdate {
    /// Like [`ProductInput::with_trimmed_refs`], but an empty id still clears the field.
    pub fn with_trimmed_refs(mut self) -> Self {
        let trim = |id: Option<String>| id.map(|id| id.trim().to_string());
        self.category = trim(self.category);
        self.material = trim(self.material);
        self.default_color = trim(self.default_color);
        self.colors = self.colors.map(trim_ids);
        if let Some(variants) = self.color_variants.as_mut() {
            trim_variant_ids(variants);
        }
        self
    }

    fn validate(&self) -> Result<(), ServiceError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError("name cannot be blank".into()));
            }
        }
        if let Some(sku) = &self.sku {
            if sku.trim().is_empty() {
                return Err(ServiceError::ValidationError("sku cannot be blank".into()));
            }
        }
        if let Some(scale) = self.image_scale {
            check_image_scale(scale)?;
        }
        if let Some(weight) = self.weight {
            check_weight(weight)?;
        }
        if let Some(variants) = &self.color_variants {
            if variants.iter().any(|v| v.color_id.trim().is_empty()) {
                return Err(ServiceError::ValidationError(
                    "every color variant needs a color id".into(),
                ));
            }
        }
        Ok(())
    }

    fn refs(&self) -> ProductRefs<'_> {
        let mut colors: Vec<&str> = Vec::new();
        if let Some(list) = &self.colors {
            colors.extend(list.iter().map(String::as_str));
        }
        if let Some(variants) = &self.color_variants {
            colors.extend(variants.iter().map(|v| v.color_id.as_str()));
        }
        colors.extend(self.default_color.as_deref());
        ProductRefs {
            category: self.category.as_deref(),
            material: self.material.as_deref(),
            colors,
        }
    }
}

/// Product reads and single-record writes.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    reference: ReferenceDataService,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>, reference: ReferenceDataService) -> Self {
        Self { db_pool, reference }
    }

    /// Lists products by rank, newest first within a rank.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let mut query = product::Entity::find();

        if let Some(category) = non_blank(filter.category) {
            query = query.filter(product::Column::Category.eq(category));
        }
        if let Some(group_id) = non_blank(filter.group_id) {
            query = query.filter(product::Column::GroupId.eq(group_id));
        }
        if let Some(featured) = filter.featured {
            query = query.filter(product::Column::Featured.eq(featured));
        }
        if let Some(in_stock) = filter.in_stock {
            query = query.filter(product::Column::InStock.eq(in_stock));
        }
        if let Some(term) = non_blank(filter.search) {
            query = query.filter(search_condition(&term));
        }

        let products = query
            .order_by_asc(product::Column::SortOrder)
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(products)
    }

    /// Members of a variant group in creation order. Unknown groups yield an empty list.
    #[instrument(skip(self))]
    pub async fn list_group(&self, group_id: &str) -> Result<Vec<product::Model>, ServiceError> {
        let products = product::Entity::find()
            .filter(product::Column::GroupId.eq(group_id))
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Sku)
            .all(&*self.db_pool)
            .await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {id} not found")))
    }

    /// Creates a single product outside of any group.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: ProductInput,
    ) -> Result<product::Model, ServiceError> {
        let input = input.with_trimmed_refs();
        input.validate()?;
        self.reference.ensure_product_refs(&input.refs()).await?;

        let sku = non_blank(input.sku.clone()).unwrap_or_else(generate_sku);
        let model = product_active_model(&input, sku, None, None, Utc::now())?
            .insert(&*self.db_pool)
            .await?;

        info!(product_id = %model.id, sku = %model.sku, "product created");
        Ok(model)
    }

    #[instrument(skip(self, update))]
    pub async fn update_product(
        &self,
        id: Uuid,
        update: ProductUpdate,
    ) -> Result<product::Model, ServiceError> {
        let update = update.with_trimmed_refs();
        update.validate()?;
        let existing = self.get_product(id).await?;
        self.reference.ensure_product_refs(&update.refs()).await?;

        let mut active = existing.into_active_model();
        if let Some(sku) = update.sku {
            active.sku = Set(sku.trim().to_string());
        }
        if let Some(name) = update.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(name_tr) = update.name_tr {
            active.name_tr = Set(non_blank(Some(name_tr)));
        }
        if let Some(description) = update.description {
            active.description = Set(non_blank(Some(description)));
        }
        if let Some(description_tr) = update.description_tr {
            active.description_tr = Set(non_blank(Some(description_tr)));
        }
        if let Some(category) = update.category {
            active.category = Set(non_blank(Some(category)));
        }
        if let Some(material) = update.material {
            active.material = Set(non_blank(Some(material)));
        }
        if let Some(dimensions) = update.dimensions {
            active.dimensions = Set(to_json(&dimensions)?);
        }
        if let Some(weight) = update.weight {
            active.weight = Set(weight);
        }
        if let Some(size_variants) = update.size_variants {
            active.size_variants = Set(to_json(&size_variants)?);
        }
        if let Some(default_size) = update.default_size {
            active.default_size = Set(non_blank(Some(default_size)));
        }
        if let Some(image) = update.image {
            active.image = Set(non_blank(Some(image)));
        }
        if let Some(image_scale) = update.image_scale {
            active.image_scale = Set(image_scale);
        }
        if let Some(colors) = update.colors {
            active.colors = Set(to_json(&colors)?);
        }
        if let Some(color_variants) = update.color_variants {
            active.color_variants = Set(to_json(&color_variants)?);
        }
        if let Some(default_color) = update.default_color {
            active.default_color = Set(non_blank(Some(default_color)));
        }
        if let Some(in_stock) = update.in_stock {
            active.in_stock = Set(in_stock);
        }
        if let Some(featured) = update.featured {
            active.featured = Set(featured);
        }
        if let Some(order) = update.order {
            active.sort_order = Set(order);
        }

        let model = active.update(&*self.db_pool).await?;
        info!(product_id = %id, "product updated");
        Ok(model)
    }

    /// Deletes one product. Other members of its group are left as they are.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = product::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Product {id} not found")));
        }
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Ranks products 1..N in the given order, then returns the whole catalog.
    #[instrument(skip(self, ordered_ids), fields(count = ordered_ids.len()))]
    pub async fn reorder_products(
        &self,
        ordered_ids: Vec<Uuid>,
    ) -> Result<Vec<product::Model>, ServiceError> {
        reorder::assign_ranks::<product::Entity, Uuid>(
            &self.db_pool,
            product::Column::Id,
            product::Column::SortOrder,
            &ordered_ids,
        )
        .await?;
        self.list_products(ProductFilter::default()).await
    }
}

/// Case-insensitive substring pattern. `%`, `_` and backslash in the term match literally.
pub(crate) fn contains_pattern(term: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.trim().to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

/// Case-insensitive substring match over the English name, Turkish name and sku.
fn search_condition(term: &str) -> Condition {
    let pattern = contains_pattern(term);
    [
        product::Column::Name,
        product::Column::NameTr,
        product::Column::Sku,
    ]
    .into_iter()
    .fold(Condition::any(), |condition, column| {
        condition.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[test]
    fn generated_sku_has_prefix_and_hex_suffix() {
        let sku = generate_sku();
        let parts: Vec<&str> = sku.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "PRD");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    #[case(49, false)]
    #[case(50, true)]
    #[case(200, true)]
    #[case(201, false)]
    fn image_scale_bounds(#[case] scale: i32, #[case] ok: bool) {
        assert_eq!(check_image_scale(scale).is_ok(), ok);
    }

    #[test]
    fn blank_name_is_rejected() {
        let input = ProductInput {
            name: "   ".into(),
            ..Default::default()
        };
        assert_matches!(input.validate(), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn lookup_ids_are_trimmed_before_storage() {
        let input = ProductInput {
            name: "Bench".into(),
            category: Some(" garden ".into()),
            material: Some("pp\t".into()),
            colors: vec![" red".into(), "  ".into()],
            default_color: Some(" ".into()),
            ..Default::default()
        }
        .with_trimmed_refs();

        assert_eq!(input.category.as_deref(), Some("garden"));
        assert_eq!(input.material.as_deref(), Some("pp"));
        assert_eq!(input.colors, vec!["red".to_string()]);
        assert_eq!(input.default_color, None);
    }

    #[test]
    fn update_keeps_an_empty_id_so_it_clears() {
        let update = ProductUpdate {
            category: Some("  ".into()),
            material: Some(" hdpe ".into()),
            ..Default::default()
        }
        .with_trimmed_refs();

        assert_eq!(update.category.as_deref(), Some(""));
        assert_eq!(update.material.as_deref(), Some("hdpe"));
    }

    #[test]
    fn active_model_derives_colors_from_variants() {
        let input = ProductInput {
            name: "Bucket".into(),
            colors: vec!["white".into()],
            color_variants: vec![
                ColorVariant {
                    id: "cv-2".into(),
                    color_id: "red".into(),
                    color_name: "Red".into(),
                    hue: 0.0,
                    saturation: 100.0,
                },
                ColorVariant {
                    id: "cv-1".into(),
                    color_id: "blue".into(),
                    color_name: "Blue".into(),
                    hue: 210.0,
                    saturation: 100.0,
                },
            ],
            ..Default::default()
        };
        let model = product_active_model(&input, "SKU".into(), None, None, Utc::now()).unwrap();
        assert_eq!(model.colors, Set(serde_json::json!(["blue", "red"])));
    }

    #[test]
    fn refs_collect_every_color_source() {
        let input = ProductInput {
            name: "Crate".into(),
            category: Some("storage".into()),
            colors: vec!["white".into()],
            default_color: Some("gray".into()),
            ..Default::default()
        };
        let refs = input.refs();
        assert_eq!(refs.category, Some("storage"));
        assert_eq!(refs.colors, vec!["white", "gray"]);
    }
}
