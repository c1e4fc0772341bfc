pub mod auth;
pub mod common;
pub mod customers;
pub mod products;
pub mod reference;
pub mod showroom;

use crate::{
    db::DbPool,
    services::{
        catalog::CatalogService, customers::CustomerService, group_sync::GroupSyncService,
        reference::ReferenceDataService, showroom::ShowroomService,
        variants::VariantExpansionService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub variants: VariantExpansionService,
    pub group_sync: GroupSyncService,
    pub reference: ReferenceDataService,
    pub customers: CustomerService,
    pub showroom: ShowroomService,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        let reference = ReferenceDataService::new(db_pool.clone());
        let catalog = CatalogService::new(db_pool.clone(), reference.clone());

        Self {
            variants: VariantExpansionService::new(db_pool.clone(), reference.clone()),
            group_sync: GroupSyncService::new(db_pool.clone(), catalog.clone(), reference.clone()),
            customers: CustomerService::new(db_pool.clone()),
            showroom: ShowroomService::new(db_pool),
            catalog,
            reference,
        }
    }
}
