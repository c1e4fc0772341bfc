use super::reference::{ReferenceEntity, ReferenceInput};
use crate::errors::ServiceError;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "categories")]
#[schema(as = Category)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub name_tr: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

const SEEDS: &[(&str, &str, &str)] = &[
    ("furniture", "Furniture", "Mobilya"),
    ("garden", "Garden", "Bahçe"),
    ("storage", "Storage", "Depolama"),
    ("industrial", "Industrial", "Endüstriyel"),
    ("kids", "Kids", "Çocuk"),
];

impl ReferenceEntity for Entity {
    const LABEL: &'static str = "category";

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
            .map(|(&(id, name, name_tr), rank)| ActiveModel {
                id: Set(id.to_string()),
                name: Set(name.to_string()),
                name_tr: Set(Some(name_tr.to_string())),
                sort_order: Set(rank),
            })
            .collect()
    }

    fn from_input(input: ReferenceInput, rank: i32) -> Result<ActiveModel, ServiceError> {
        Ok(ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
            name_tr: Set(input.name_tr),
            sort_order: Set(rank),
        })
    }
}
