use crate::{
    db::DbPool,
    entities::showroom_node,
    errors::ServiceError,
    services::{catalog::non_blank, reorder},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ShowroomNodeInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default, alias = "titleTr")]
    pub title_tr: Option<String>,
    #[serde(default, alias = "panoramaUrl")]
    pub panorama_url: Option<String>,
    /// Appended after the last node when absent
    #[serde(default)]
    pub order: Option<i32>,
}

#[derive(Clone)]
pub struct ShowroomService {
    db_pool: Arc<DbPool>,
}

impl ShowroomService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_nodes(&self) -> Result<Vec<showroom_node::Model>, ServiceError> {
        let nodes = showroom_node::Entity::find()
            .order_by_asc(showroom_node::Column::SortOrder)
            .order_by_asc(showroom_node::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(nodes)
    }

    #[instrument(skip(self, input))]
    pub async fn create_node(
        &self,
        input: ShowroomNodeInput,
    ) -> Result<showroom_node::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let rank = match input.order {
            Some(order) => order,
            None => {
                let count = showroom_node::Entity::find().count(db).await?;
                i32::try_from(count + 1).unwrap_or(i32::MAX)
            }
        };

        let node = showroom_node::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title.trim().to_string()),
            title_tr: Set(non_blank(input.title_tr)),
            panorama_url: Set(non_blank(input.panorama_url)),
            sort_order: Set(rank),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;

        info!(node_id = %node.id, "showroom node created");
        Ok(node)
    }

    #[instrument(skip(self))]
    pub async fn delete_node(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = showroom_node::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Showroom node {id} not found"
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, ordered_ids), fields(count = ordered_ids.len()))]
    pub async fn reorder_nodes(
        &self,
        ordered_ids: Vec<Uuid>,
    ) -> Result<Vec<showroom_node::Model>, ServiceError> {
        reorder::assign_ranks::<showroom_node::Entity, Uuid>(
            &self.db_pool,
            showroom_node::Column::Id,
            showroom_node::Column::SortOrder,
            &ordered_ids,
        )
        .await?;
        self.list_nodes().await
    }
}
