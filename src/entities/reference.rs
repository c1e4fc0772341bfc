//! Shared shape of the small lookup tables products point at by string id.

use crate::errors::ServiceError;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Payload for adding a single row to a lookup table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReferenceInput {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default, alias = "nameTr")]
    pub name_tr: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
    /// Only meaningful for colors
    #[serde(default)]
    pub hex: Option<String>,
}

/// Implemented by the category, material and color entities.
pub trait ReferenceEntity: EntityTrait + Default + Send + Sync {
    /// Singular name used in log lines and error messages.
    const LABEL: &'static str;

    fn id_column() -> Self::Column;

    fn rank_column() -> Self::Column;

    /// Fixed default rows, in rank order.
    fn seeds() -> Vec<Self::ActiveModel>;

    /// Builds a new row ranked at `rank`.
    fn from_input(input: ReferenceInput, rank: i32) -> Result<Self::ActiveModel, ServiceError>;
}
