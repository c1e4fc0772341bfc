use super::reference::{ReferenceEntity, ReferenceInput};
use crate::errors::ServiceError;
use crate::models::catalog::is_hex_color;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Palette entry. `hex` is the swatch shown next to the color name.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "colors")]
#[schema(as = Color)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub name_tr: Option<String>,
    #[schema(example = "#D32F2F")]
    pub hex: String,
    #[serde(rename = "order")]
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

const SEEDS: &[(&str, &str, &str, &str)] = &[
    ("white", "White", "Beyaz", "#FFFFFF"),
    ("black", "Black", "Siyah", "#1F1F1F"),
    ("gray", "Gray", "Gri", "#808080"),
    ("red", "Red", "Kırmızı", "#D32F2F"),
    ("blue", "Blue", "Mavi", "#1976D2"),
    ("green", "Green", "Yeşil", "#388E3C"),
    ("yellow", "Yellow", "Sarı", "#FBC02D"),
    ("beige", "Beige", "Bej", "#D7C4A3"),
];

impl ReferenceEntity for Entity {
    const LABEL: &'static str = "color";

    fn id_column() -> Column {
        Column::Id
    }

    fn rank_column() -> Column {
        Column::SortOrder
    }

    fn seeds() -> Vec<ActiveModel> {
        SEEDS
            .iter()
            .zip(1..)
            .map(|(&(id, name, name_tr, hex), rank)| ActiveModel {
                id: Set(id.to_string()),
                name: Set(name.to_string()),
                name_tr: Set(Some(name_tr.to_string())),
                hex: Set(hex.to_string()),
                sort_order: Set(rank),
            })
            .collect()
    }

    fn from_input(input: ReferenceInput, rank: i32) -> Result<ActiveModel, ServiceError> {
        let hex = input
            .hex
            .ok_or_else(|| ServiceError::ValidationError("hex is required for colors".into()))?;
        if !is_hex_color(&hex) {
            return Err(ServiceError::ValidationError(format!(
                "hex must look like #RRGGBB, got {hex}"
            )));
        }

        Ok(ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
            name_tr: Set(input.name_tr),
            hex: Set(hex.to_uppercase()),
            sort_order: Set(rank),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn seeds_are_ranked_in_declaration_order() {
        let seeds = Entity::seeds();
        assert_eq!(seeds.len(), 8);
        assert_eq!(seeds[0].id, Set("white".to_string()));
        assert_eq!(seeds[7].sort_order, Set(8));
    }

    #[test]
    fn rejects_malformed_hex() {
        let input = ReferenceInput {
            id: "teal".into(),
            name: "Teal".into(),
            hex: Some("teal".into()),
            ..Default::default()
        };
        assert_matches!(
            Entity::from_input(input, 9),
            Err(ServiceError::ValidationError(_))
        );
    }
}
