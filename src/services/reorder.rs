//! Manual ranking shared by every orderable collection.

use crate::{db, db::DbPool, errors::ServiceError};
use sea_orm::{sea_query::Expr, ColumnTrait, EntityName, EntityTrait, QueryFilter, Value};
use std::time::Instant;
use tracing::{debug, instrument};

/// Sets `rank_column = position + 1` for each id in `ids`, inside one transaction.
///
/// Rows not named keep their current rank and ids that match nothing are skipped.
/// Returns the number of rows touched.
#[instrument(skip_all, fields(entity = %E::default().table_name(), count = ids.len()))]
pub async fn assign_ranks<E, V>(
    db: &DbPool,
    id_column: E::Column,
    rank_column: E::Column,
    ids: &[V],
) -> Result<u64, ServiceError>
where
    E: EntityTrait + Default,
    V: Into<Value> + Clone + Send + Sync,
{
    if ids.is_empty() {
        return Ok(0);
    }

    let started = Instant::now();
    let txn = db::begin(db).await?;
    let mut touched = 0;

    for (position, id) in ids.iter().enumerate() {
        let rank = i32::try_from(position + 1)
            .map_err(|_| ServiceError::InvalidInput("too many ids to rank".into()))?;
        let result = E::update_many()
            .col_expr(rank_column, Expr::value(rank))
            .filter(id_column.eq(id.clone()))
            .exec(&txn)
            .await?;
        touched += result.rows_affected;
    }

    db::commit(txn, started).await?;
    debug!(touched, "ranks assigned");
    Ok(touched)
}
