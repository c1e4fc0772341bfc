//! Propagates shared attributes to every product of a variant group.

use crate::{
    db::DbPool,
    entities::product,
    errors::ServiceError,
    models::catalog::{Dimensions, SizeVariant},
    services::{
        catalog::{check_image_scale, check_weight, non_blank, ref_id, CatalogService},
        reference::{ProductRefs, ReferenceDataService},
    },
};
use chrono::Utc;
use metrics::counter;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

/// Attributes shared by all members of a group. Colors, names and sku stay per variant.
pub const SYNC_FIELDS: [&str; 11] = [
    "dimensions",
    "weight",
    "material",
    "category",
    "description",
    "description_tr",
    "image",
    "image_scale",
    "size_variants",
    "default_size",
    "in_stock",
];

fn canonical_field(key: &str) -> Option<&'static str> {
    let key = match key {
        "descriptionTr" => "description_tr",
        "imageScale" => "image_scale",
        "sizeVariants" => "size_variants",
        "defaultSize" => "default_size",
        "inStock" => "in_stock",
        other => other,
    };
    SYNC_FIELDS.iter().copied().find(|field| *field == key)
}

/// The subset of [`SYNC_FIELDS`] present in a request. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncFields {
    pub dimensions: Option<Dimensions>,
    pub weight: Option<f64>,
    pub material: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub description_tr: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub image_scale: Option<i32>,
    pub size_variants: Option<Vec<SizeVariant>>,
    pub default_size: Option<Option<String>>,
    pub in_stock: Option<bool>,
}

fn invalid(field: &str, expected: &str) -> ServiceError {
    ServiceError::ValidationError(format!("sync field '{field}' must be {expected}"))
}

fn optional_text(field: &str, value: &Value) -> Result<Option<String>, ServiceError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(non_blank(Some(text.clone()))),
        _ => Err(invalid(field, "a string or null")),
    }
}

fn optional_id(field: &str, value: &Value) -> Result<Option<String>, ServiceError> {
    Ok(ref_id(optional_text(field, value)?))
}

impl SyncFields {
    /// Parses a `sync_fields` object. Keys outside [`SYNC_FIELDS`] are rejected.
    pub fn from_json(value: &Value) -> Result<Self, ServiceError> {
        let map = value
            .as_object()
            .ok_or_else(|| ServiceError::ValidationError("sync_fields must be an object".into()))?;

        let mut fields = SyncFields::default();
        for (key, value) in map {
            let field = canonical_field(key).ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "field '{key}' cannot be synchronized across a group"
                ))
            })?;

            match field {
                "dimensions" => {
                    let dims: Dimensions = serde_json::from_value(value.clone())
                        .map_err(|_| invalid(field, "an object of numbers"))?;
                    fields.dimensions = Some(dims);
                }
                "weight" => {
                    let weight = value.as_f64().ok_or_else(|| invalid(field, "a number"))?;
                    check_weight(weight)?;
                    fields.weight = Some(weight);
                }
                "image_scale" => {
                    let scale = value
                        .as_i64()
                        .and_then(|v| i32::try_from(v).ok())
                        .ok_or_else(|| invalid(field, "an integer"))?;
                    check_image_scale(scale)?;
                    fields.image_scale = Some(scale);
                }
                "size_variants" => {
                    let sizes: Vec<SizeVariant> = serde_json::from_value(value.clone())
                        .map_err(|_| invalid(field, "a list of size presets"))?;
                    fields.size_variants = Some(sizes);
                }
                "in_stock" => {
                    let in_stock = value.as_bool().ok_or_else(|| invalid(field, "a boolean"))?;
                    fields.in_stock = Some(in_stock);
                }
                "material" => fields.material = Some(optional_id(field, value)?),
                "category" => fields.category = Some(optional_id(field, value)?),
                "description" => fields.description = Some(optional_text(field, value)?),
                "description_tr" => fields.description_tr = Some(optional_text(field, value)?),
                "image" => fields.image = Some(optional_text(field, value)?),
                "default_size" => fields.default_size = Some(optional_text(field, value)?),
                other => {
                    return Err(ServiceError::InternalError(format!(
                        "sync field '{other}' has no handler"
                    )))
                }
            }
        }
        Ok(fields)
    }

    pub fn is_empty(&self) -> bool {
        self == &SyncFields::default()
    }

    fn refs(&self) -> ProductRefs<'_> {
        ProductRefs {
            category: self.category.as_ref().and_then(|c| c.as_deref()),
            material: self.material.as_ref().and_then(|m| m.as_deref()),
            colors: Vec::new(),
        }
    }

    /// Update touching only the present fields, plus `updated_at`.
    fn to_active_model(&self) -> Result<product::ActiveModel, ServiceError> {
        let mut active = product::ActiveModel {
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(dimensions) = &self.dimensions {
            active.dimensions = Set(serde_json::to_value(dimensions)?);
        }
        if let Some(weight) = self.weight {
            active.weight = Set(weight);
        }
        if let Some(material) = &self.material {
            active.material = Set(material.clone());
        }
        if let Some(category) = &self.category {
            active.category = Set(category.clone());
        }
        if let Some(description) = &self.description {
            active.description = Set(description.clone());
        }
        if let Some(description_tr) = &self.description_tr {
            active.description_tr = Set(description_tr.clone());
        }
        if let Some(image) = &self.image {
            active.image = Set(image.clone());
        }
        if let Some(image_scale) = self.image_scale {
            active.image_scale = Set(image_scale);
        }
        if let Some(size_variants) = &self.size_variants {
            active.size_variants = Set(serde_json::to_value(size_variants)?);
        }
        if let Some(default_size) = &self.default_size {
            active.default_size = Set(default_size.clone());
        }
        if let Some(in_stock) = self.in_stock {
            active.in_stock = Set(in_stock);
        }
        Ok(active)
    }
}

#[derive(Clone)]
pub struct GroupSyncService {
    db_pool: Arc<DbPool>,
    catalog: CatalogService,
    reference: ReferenceDataService,
}

impl GroupSyncService {
    pub fn new(
        db_pool: Arc<DbPool>,
        catalog: CatalogService,
        reference: ReferenceDataService,
    ) -> Self {
        Self {
            db_pool,
            catalog,
            reference,
        }
    }

    /// Writes `fields` to every member of `group_id` with a single update and returns the group.
    #[instrument(skip(self))]
    pub async fn sync_group(
        &self,
        group_id: &str,
        fields: SyncFields,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let members = self.catalog.list_group(group_id).await?;
        if members.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "Product group {group_id} not found"
            )));
        }
        if fields.is_empty() {
            return Ok(members);
        }

        self.reference.ensure_product_refs(&fields.refs()).await?;

        let result = product::Entity::update_many()
            .set(fields.to_active_model()?)
            .filter(product::Column::GroupId.eq(group_id))
            .exec(&*self.db_pool)
            .await?;

        counter!("catalog.group_sync.rows", result.rows_affected);
        info!(group_id, rows = result.rows_affected, "group synchronized");

        self.catalog.list_group(group_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn parses_camel_case_and_nulls() {
        let fields = SyncFields::from_json(&json!({
            "weight": 5,
            "imageScale": 120,
            "description": null,
            "inStock": false,
            "dimensions": { "width": 10 }
        }))
        .unwrap();

        assert_eq!(fields.weight, Some(5.0));
        assert_eq!(fields.image_scale, Some(120));
        assert_eq!(fields.description, Some(None));
        assert_eq!(fields.in_stock, Some(false));
        assert_eq!(fields.dimensions.unwrap().width, 10.0);
        assert!(fields.material.is_none());
    }

    #[rstest]
    #[case("colors")]
    #[case("color_variants")]
    #[case("colorVariants")]
    #[case("primary_color")]
    #[case("name")]
    #[case("sku")]
    #[case("group_id")]
    fn per_variant_fields_are_rejected(#[case] key: &str) {
        let mut body = serde_json::Map::new();
        body.insert(key.to_string(), json!("x"));
        assert_matches!(
            SyncFields::from_json(&Value::Object(body)),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn out_of_range_scale_is_rejected() {
        assert_matches!(
            SyncFields::from_json(&json!({ "image_scale": 20 })),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn empty_object_is_empty() {
        assert!(SyncFields::from_json(&json!({})).unwrap().is_empty());
        assert_matches!(
            SyncFields::from_json(&json!([])),
            Err(ServiceError::ValidationError(_))
        );
    }
}
