use crate::{
    db::{self, DbPool},
    entities::{category, color, material, ReferenceEntity, ReferenceInput},
    errors::ServiceError,
    services::reorder,
};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::{sync::Arc, time::Instant};
use tracing::{info, instrument, warn};
use validator::Validate;

/// Reference ids a product write points at. Blank ids count as absent.
#[derive(Debug, Default, Clone)]
pub struct ProductRefs<'a> {
    pub category: Option<&'a str>,
    pub material: Option<&'a str>,
    pub colors: Vec<&'a str>,
}

/// Lookup tables (categories, materials, colors): seed on first read, reset, rank.
#[derive(Clone)]
pub struct ReferenceDataService {
    db_pool: Arc<DbPool>,
}

impl ReferenceDataService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Lists rows by rank, seeding the defaults when the table is empty.
    #[instrument(skip(self), fields(table = E::LABEL))]
    pub async fn list<E>(&self) -> Result<Vec<E::Model>, ServiceError>
    where
        E: ReferenceEntity,
        E::Model: Send + Sync + IntoActiveModel<E::ActiveModel>,
    {
        let db = &*self.db_pool;
        seed_if_empty::<E, _>(db).await?;
        fetch_ranked::<E, _>(db).await
    }

    /// Wipes the table and restores the default rows.
    #[instrument(skip(self), fields(table = E::LABEL))]
    pub async fn reset<E>(&self) -> Result<Vec<E::Model>, ServiceError>
    where
        E: ReferenceEntity,
        E::Model: Send + Sync + IntoActiveModel<E::ActiveModel>,
    {
        let started = Instant::now();
        let txn = db::begin(&self.db_pool).await?;

        let removed = E::delete_many().exec(&txn).await?.rows_affected;
        E::insert_many(E::seeds())
            .exec_without_returning(&txn)
            .await?;

        db::commit(txn, started).await?;
        info!(removed, "{} table reset to defaults", E::LABEL);

        fetch_ranked::<E, _>(&*self.db_pool).await
    }

    /// Ranks `ordered_ids` 1..N and returns the full, re-sorted table.
    #[instrument(skip(self, ordered_ids), fields(table = E::LABEL, count = ordered_ids.len()))]
    pub async fn reorder<E>(&self, ordered_ids: Vec<String>) -> Result<Vec<E::Model>, ServiceError>
    where
        E: ReferenceEntity,
        E::Model: Send + Sync + IntoActiveModel<E::ActiveModel>,
    {
        let db = &*self.db_pool;
        seed_if_empty::<E, _>(db).await?;
        reorder::assign_ranks::<E, String>(db, E::id_column(), E::rank_column(), &ordered_ids)
            .await?;
        fetch_ranked::<E, _>(db).await
    }

    /// Adds one row. Without an explicit `order` it is ranked last.
    #[instrument(skip(self, input), fields(table = E::LABEL, id = %input.id))]
    pub async fn create<E>(&self, input: ReferenceInput) -> Result<E::Model, ServiceError>
    where
        E: ReferenceEntity,
        E::Model: Send + Sync + IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: Send,
    {
        input.validate()?;
        let db = &*self.db_pool;
        seed_if_empty::<E, _>(db).await?;

        let id = input.id.clone();
        if exists::<E, _>(db, &id).await? {
            return Err(ServiceError::Conflict(format!(
                "{} {id} already exists",
                E::LABEL
            )));
        }

        let count = E::find().count(db).await?;
        let rank = match input.order {
            Some(order) => order,
            None => i32::try_from(count + 1).unwrap_or(i32::MAX),
        };
        let model = E::from_input(input, rank)?;
        E::insert(model).exec_without_returning(db).await?;

        E::find()
            .filter(E::id_column().eq(id.as_str()))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::InternalError(format!("{} {id} vanished", E::LABEL)))
    }

    /// Removes one row. Products that still point at it keep the dangling id.
    #[instrument(skip(self), fields(table = E::LABEL))]
    pub async fn delete<E>(&self, id: &str) -> Result<(), ServiceError>
    where
        E: ReferenceEntity,
    {
        let result = E::delete_many()
            .filter(E::id_column().eq(id))
            .exec(&*self.db_pool)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "{} {id} not found",
                E::LABEL
            )));
        }
        Ok(())
    }

    /// Rejects a product write naming a category, material or color that does not exist.
    #[instrument(skip(self))]
    pub async fn ensure_product_refs(&self, refs: &ProductRefs<'_>) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let mut unknown = Vec::new();

        if let Some(category) = present(refs.category) {
            seed_if_empty::<category::Entity, _>(db).await?;
            if !exists::<category::Entity, _>(db, category).await? {
                unknown.push(format!("category '{category}'"));
            }
        }

        if let Some(material) = present(refs.material) {
            seed_if_empty::<material::Entity, _>(db).await?;
            if !exists::<material::Entity, _>(db, material).await? {
                unknown.push(format!("material '{material}'"));
            }
        }

        let mut colors: Vec<&str> = refs
            .colors
            .iter()
            .filter_map(|color| present(Some(*color)))
            .collect();
        colors.sort_unstable();
        colors.dedup();
        if !colors.is_empty() {
            seed_if_empty::<color::Entity, _>(db).await?;
            for color in colors {
                if !exists::<color::Entity, _>(db, color).await? {
                    unknown.push(format!("color '{color}'"));
                }
            }
        }

        if unknown.is_empty() {
            Ok(())
        } else {
            warn!(?unknown, "product write references unknown ids");
            Err(ServiceError::ValidationError(format!(
                "Unknown reference: {}",
                unknown.join(", ")
            )))
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

async fn exists<E, C>(db: &C, id: &str) -> Result<bool, ServiceError>
where
    E: ReferenceEntity,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let count = E::find().filter(E::id_column().eq(id)).count(db).await?;
    Ok(count > 0)
}

async fn fetch_ranked<E, C>(db: &C) -> Result<Vec<E::Model>, ServiceError>
where
    E: ReferenceEntity,
    C: ConnectionTrait,
{
    Ok(E::find()
        .order_by_asc(E::rank_column())
        .order_by_asc(E::id_column())
        .all(db)
        .await?)
}

/// Inserts the default rows when the table has none. Concurrent first reads are
/// harmless: rows that already exist are skipped.
async fn seed_if_empty<E, C>(db: &C) -> Result<bool, ServiceError>
where
    E: ReferenceEntity,
    E::Model: Send + Sync + IntoActiveModel<E::ActiveModel>,
    C: ConnectionTrait,
{
    if E::find().count(db).await? > 0 {
        return Ok(false);
    }

    let inserted = E::insert_many(E::seeds())
        .on_conflict(OnConflict::column(E::id_column()).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    info!(inserted, "seeded default {} rows", E::LABEL);
    Ok(true)
}
