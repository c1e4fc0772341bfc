use crate::models::catalog::{
    decode_json, localized, normalize_colors, ColorVariant, Dimensions, Locale, PrimaryColor,
    SizeVariant,
};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog product. Nested structures live in JSON columns; use the typed accessors.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human-facing stock keeping unit
    pub sku: String,

    pub name: String,
    pub name_tr: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description_tr: Option<String>,

    /// Category reference id
    pub category: Option<String>,
    /// Material reference id
    pub material: Option<String>,

    #[sea_orm(column_type = "Json")]
    pub dimensions: Json,
    pub weight: f64,

    #[sea_orm(column_type = "Json")]
    pub size_variants: Json,
    pub default_size: Option<String>,

    pub image: Option<String>,
    /// Display scale percentage, 50..=200
    pub image_scale: i32,

    /// Available color ids
    #[sea_orm(column_type = "Json")]
    pub colors: Json,
    #[sea_orm(column_type = "Json")]
    pub color_variants: Json,
    /// Set only on products produced by variant expansion
    #[sea_orm(column_type = "Json", nullable)]
    pub primary_color: Option<Json>,
    pub default_color: Option<String>,

    /// Shared by products created together by variant expansion
    pub group_id: Option<String>,

    pub in_stock: bool,
    pub featured: bool,

    /// Manual rank; lower values list first
    pub sort_order: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Model {
    pub fn dimensions(&self) -> Dimensions {
        decode_json(&self.dimensions)
    }

    pub fn size_variants(&self) -> Vec<SizeVariant> {
        decode_json(&self.size_variants)
    }

    pub fn colors(&self) -> Vec<String> {
        decode_json(&self.colors)
    }

    pub fn color_variants(&self) -> Vec<ColorVariant> {
        decode_json(&self.color_variants)
    }

    pub fn primary_color(&self) -> Option<PrimaryColor> {
        self.primary_color
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn display_name(&self, locale: Locale) -> &str {
        localized(locale, &self.name, self.name_tr.as_deref())
    }

    pub fn display_description(&self, locale: Locale) -> Option<&str> {
        match self.description.as_deref() {
            Some(en) => Some(localized(locale, en, self.description_tr.as_deref())),
            None => self
                .description_tr
                .as_deref()
                .filter(|_| locale == Locale::Tr),
        }
    }
}

fn current<V>(value: &ActiveValue<V>) -> Option<&V>
where
    V: Into<sea_orm::Value>,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v),
        ActiveValue::NotSet => None,
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }
        active_model.updated_at = Set(now);

        // Keep `colors` derived from `color_variants` whenever either is written.
        let touched = active_model.color_variants.is_set() || active_model.colors.is_set();
        if touched {
            if let (Some(variants), Some(colors)) = (
                current(&active_model.color_variants),
                current(&active_model.colors),
            ) {
                let variants: Vec<ColorVariant> = decode_json(variants);
                let colors: Vec<String> = decode_json(colors);
                let normalized = normalize_colors(&variants, colors);
                active_model.colors = Set(serde_json::to_value(normalized)
                    .map_err(|e| DbErr::Custom(format!("colors encoding failed: {e}")))?);
            }
        }

        Ok(active_model)
    }
}
