//! Color-variant expansion: one submitted product becomes one product per color,
//! all sharing a fresh group id.

use crate::{
    db::{self, DbPool},
    entities::product,
    errors::ServiceError,
    models::catalog::{is_hex_color, ColorVariant, PrimaryColor, DEFAULT_SWATCH_HEX},
    services::{
        catalog::{generate_sku, non_blank, product_active_model, ProductInput},
        reference::ReferenceDataService,
    },
};
use chrono::{Duration, Utc};
use metrics::counter;
use sea_orm::ActiveModelTrait;
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// One color the base product should be produced in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ColorVariantInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "colorId")]
    pub color_id: Option<String>,
    #[serde(default, alias = "colorName")]
    pub color_name: Option<String>,
    /// Swatch shown for this variant; `#808080` when absent
    #[serde(default)]
    pub hex: Option<String>,
    #[serde(default)]
    pub hue: f64,
    #[serde(default = "default_saturation")]
    pub saturation: f64,
}

fn default_saturation() -> f64 {
    100.0
}

impl Default for ColorVariantInput {
    fn default() -> Self {
        Self {
            id: None,
            color_id: None,
            color_name: None,
            hex: None,
            hue: 0.0,
            saturation: default_saturation(),
        }
    }
}

/// A variant that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVariant {
    pub variant: ColorVariant,
    pub hex: String,
}

impl ColorVariantInput {
    fn resolve(self, position: usize) -> Result<ResolvedVariant, ServiceError> {
        let color_id = non_blank(self.color_id)
            .map(|id| id.trim().to_string())
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "variant {} is missing a color id",
                    position + 1
                ))
            })?;

        let hex = match non_blank(self.hex) {
            Some(hex) if is_hex_color(hex.trim()) => hex.trim().to_uppercase(),
            Some(hex) => {
                return Err(ServiceError::ValidationError(format!(
                    "variant {} has an invalid hex color '{hex}'",
                    position + 1
                )))
            }
            None => DEFAULT_SWATCH_HEX.to_string(),
        };

        let color_name = non_blank(self.color_name).unwrap_or_else(|| color_id.clone());
        let id = non_blank(self.id).unwrap_or_else(|| format!("cv-{color_id}"));

        Ok(ResolvedVariant {
            variant: ColorVariant {
                id,
                color_id,
                color_name,
                hue: self.hue,
                saturation: self.saturation,
            },
            hex,
        })
    }
}

/// Derives the product written for one variant from the base payload.
pub fn expand_variant(
    base: &ProductInput,
    base_sku: &str,
    resolved: &ResolvedVariant,
) -> (ProductInput, String, PrimaryColor) {
    let variant = &resolved.variant;
    let suffix = format!(" - {}", variant.color_name);

    let mut input = base.clone();
    input.name = format!("{}{suffix}", base.name.trim());
    input.name_tr = Some(format!(
        "{}{suffix}",
        non_blank(base.name_tr.clone()).unwrap_or_else(|| base.name.trim().to_string())
    ));
    input.color_variants = vec![variant.clone()];
    input.colors = vec![variant.color_id.clone()];

    let sku = format!("{base_sku}-{}", variant.color_id.to_uppercase());
    let primary = PrimaryColor {
        id: variant.color_id.clone(),
        name: variant.color_name.clone(),
        hex: resolved.hex.clone(),
    };
    (input, sku, primary)
}

#[derive(Clone)]
pub struct VariantExpansionService {
    db_pool: Arc<DbPool>,
    reference: ReferenceDataService,
}

impl VariantExpansionService {
    pub fn new(db_pool: Arc<DbPool>, reference: ReferenceDataService) -> Self {
        Self { db_pool, reference }
    }

    /// Persists the base product once per variant (or once, when `variants` is empty)
    /// under a new group id. Either every product is written or none is.
    #[instrument(skip(self, base, variants), fields(name = %base.name, variants = variants.len()))]
    pub async fn create_with_variants(
        &self,
        base: ProductInput,
        variants: Vec<ColorVariantInput>,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let base = base.with_trimmed_refs();
        base.validate()?;
        let resolved = variants
            .into_iter()
            .enumerate()
            .map(|(position, variant)| variant.resolve(position))
            .collect::<Result<Vec<_>, _>>()?;

        let mut refs = base.refs();
        refs.colors
            .extend(resolved.iter().map(|r| r.variant.color_id.as_str()));
        self.reference.ensure_product_refs(&refs).await?;

        let group_id = Uuid::new_v4().to_string();
        let base_sku = non_blank(base.sku.clone()).unwrap_or_else(generate_sku);
        let now = Utc::now();

        let rows = if resolved.is_empty() {
            vec![product_active_model(
                &base,
                base_sku,
                Some(group_id.clone()),
                None,
                now,
            )?]
        } else {
            resolved
                .iter()
                .enumerate()
                .map(|(position, variant)| {
                    let (input, sku, primary) = expand_variant(&base, &base_sku, variant);
                    // Stamp members in submission order so group listings keep it.
                    let created_at = now + Duration::microseconds(position as i64);
                    product_active_model(
                        &input,
                        sku,
                        Some(group_id.clone()),
                        Some(&primary),
                        created_at,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let started = Instant::now();
        let txn = db::begin(&self.db_pool).await?;
        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            created.push(row.insert(&txn).await?);
        }
        db::commit(txn, started).await?;

        counter!("catalog.products.created", created.len() as u64);
        info!(group_id = %group_id, count = created.len(), "variant group created");
        Ok(created)
    }
}
