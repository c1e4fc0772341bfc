use crate::{
    db::DbPool,
    entities::customer,
    errors::ServiceError,
    services::catalog::{contains_pattern, non_blank},
};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Service for the customer contact book
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Lists customers, newest first. `search` matches name, company, email or country.
    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        search: Option<String>,
    ) -> Result<Vec<customer::Model>, ServiceError> {
        let mut query = customer::Entity::find();

        if let Some(term) = non_blank(search) {
            let pattern = contains_pattern(&term);
            let condition = [
                customer::Column::Name,
                customer::Column::Company,
                customer::Column::Email,
                customer::Column::Country,
            ]
            .into_iter()
            .fold(Condition::any(), |condition, column| {
                condition.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone()))
            });
            query = query.filter(condition);
        }

        let customers = query
            .order_by_desc(customer::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(customers)
    }

    #[instrument(skip(self))]
    pub async fn get_customer(&self, id: Uuid) -> Result<customer::Model, ServiceError> {
        customer::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {id} not found")))
    }

    #[instrument(skip(self, input))]
    pub async fn create_customer(
        &self,
        input: CustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;

        let model = customer::ActiveModel {
            name: Set(input.name.trim().to_string()),
            company: Set(non_blank(input.company)),
            email: Set(non_blank(input.email).map(|e| e.trim().to_lowercase())),
            phone: Set(non_blank(input.phone)),
            country: Set(non_blank(input.country)),
            notes: Set(non_blank(input.notes)),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(customer_id = %model.id, "customer created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete_customer(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = customer::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Customer {id} not found")));
        }
        info!(customer_id = %id, "customer deleted");
        Ok(())
    }
}
