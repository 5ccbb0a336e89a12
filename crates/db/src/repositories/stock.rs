//! Stock repository: the persistence side of the stock ledger.
//!
//! Every counter mutation goes through [`apply_delta`], which row-locks the
//! variant, asks [`StockLedger`] for the new value, writes it, and appends a
//! movement row on the same connection. Callers own the transaction.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, warn};

use stockbook_core::ledger::{
    EntryType, LedgerError, MovementReference, MovementType, ReplayReport, StockLedger,
};
use stockbook_shared::types::{StockEntryId, StockMovementId, UserId, VariantId};

use crate::entities::{product_variants, stock_entries, stock_movements};

/// One counter mutation to apply.
#[derive(Debug, Clone)]
pub struct MovementInput {
    /// Variant whose counter changes.
    pub variant_id: VariantId,
    /// Signed, non-zero delta.
    pub delta: i32,
    /// Cause of the movement.
    pub movement_type: MovementType,
    /// Record that caused the movement.
    pub reference: MovementReference,
    /// Opaque identity of the actor.
    pub performed_by: UserId,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input for a manual stock entry.
#[derive(Debug, Clone)]
pub struct CreateStockEntryInput {
    /// Target variant.
    pub variant_id: VariantId,
    /// Caller-supplied quantity; its sign is normalized by `entry_type`.
    pub quantity: i32,
    /// Entry type.
    pub entry_type: EntryType,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Author.
    pub created_by: UserId,
}

/// Stock entry together with the movement it produced.
#[derive(Debug, Clone)]
pub struct StockEntryWithMovement {
    /// The immutable entry.
    pub entry: stock_entries::Model,
    /// The audit movement.
    pub movement: stock_movements::Model,
}

/// Filter options for listing stock entries.
#[derive(Debug, Clone, Default)]
pub struct StockEntryFilter {
    /// Filter by entry type.
    pub entry_type: Option<EntryType>,
    /// Filter by variant.
    pub variant_id: Option<VariantId>,
    /// Only entries created at or after this instant.
    pub date_from: Option<DateTime<Utc>>,
}

/// Filter options for listing stock movements.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    /// Filter by movement type.
    pub movement_type: Option<MovementType>,
    /// Filter by variant.
    pub variant_id: Option<VariantId>,
    /// Only movements created at or after this instant.
    pub date_from: Option<DateTime<Utc>>,
}

/// Locks a variant row and returns it.
///
/// # Errors
///
/// Returns `VariantNotFound` or a database error.
pub async fn lock_variant<C: ConnectionTrait>(
    conn: &C,
    variant_id: VariantId,
) -> Result<product_variants::Model, LedgerError> {
    let variant = product_variants::Entity::find_by_id(variant_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?
        .ok_or(LedgerError::VariantNotFound(variant_id))?;
    debug!(%variant_id, stock = variant.stock_quantity, "variant locked");
    Ok(variant)
}

/// Locks several variant rows in ascending id order.
///
/// A fixed lock order keeps concurrent multi-variant operations from
/// deadlocking each other.
///
/// # Errors
///
/// Returns `VariantNotFound` for the first missing id, or a database error.
pub async fn lock_variants<C: ConnectionTrait>(
    conn: &C,
    variant_ids: impl IntoIterator<Item = VariantId>,
) -> Result<BTreeMap<VariantId, product_variants::Model>, LedgerError> {
    let mut ids: Vec<VariantId> = variant_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let rows = product_variants::Entity::find()
        .filter(product_variants::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
        .order_by_asc(product_variants::Column::Id)
        .lock_exclusive()
        .all(conn)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

    let locked: BTreeMap<VariantId, product_variants::Model> = rows
        .into_iter()
        .map(|row| (VariantId::from_uuid(row.id), row))
        .collect();

    if let Some(missing) = ids.iter().find(|id| !locked.contains_key(id)) {
        return Err(LedgerError::VariantNotFound(*missing));
    }
    debug!(count = locked.len(), "variants locked");
    Ok(locked)
}

/// Applies a delta to a variant's counter and appends the movement row.
///
/// Must run inside a transaction: the counter update and the movement insert
/// commit or roll back together.
///
/// # Errors
///
/// - `InvalidQuantity` for a zero or overflowing delta.
/// - `InsufficientStock` if the counter would go negative; nothing is written.
/// - `VariantNotFound` or a database error.
pub async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    input: MovementInput,
) -> Result<stock_movements::Model, LedgerError> {
    let variant = lock_variant(conn, input.variant_id).await?;

    let change = StockLedger::apply_delta(input.variant_id, variant.stock_quantity, input.delta)
        .inspect_err(|e| {
            warn!(
                variant_id = %input.variant_id,
                delta = input.delta,
                error = %e,
                "stock delta rejected"
            );
        })?;

    let now = Utc::now().into();
    let mut active: product_variants::ActiveModel = variant.into();
    active.stock_quantity = Set(change.new_stock);
    active.updated_at = Set(now);
    active
        .update(conn)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

    let movement = stock_movements::ActiveModel {
        id: Set(StockMovementId::new().into_inner()),
        variant_id: Set(input.variant_id.into_inner()),
        movement_type: Set(input.movement_type.into()),
        quantity: Set(change.quantity),
        previous_stock: Set(change.previous_stock),
        new_stock: Set(change.new_stock),
        reference_id: Set(input.reference.to_string()),
        performed_by: Set(input.performed_by.into_inner()),
        notes: Set(input.notes),
        created_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(|e| LedgerError::Database(e.to_string()))?;

    info!(
        variant_id = %input.variant_id,
        delta = change.quantity,
        new_stock = change.new_stock,
        movement_type = %input.movement_type,
        reference = %movement.reference_id,
        "stock updated"
    );
    Ok(movement)
}

/// Stock repository for entries, movements and counter audits.
#[derive(Debug, Clone)]
pub struct StockRepository {
    db: DatabaseConnection,
}

impl StockRepository {
    /// Creates a new stock repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a manual stock entry and applies it to the variant's counter.
    ///
    /// The quantity is normalized by entry type before anything is written.
    ///
    /// # Errors
    ///
    /// - `InvalidQuantity` for zero.
    /// - `InsufficientStock` if a removal exceeds stock on hand.
    /// - `VariantNotFound` or a database error.
    pub async fn create_stock_entry(
        &self,
        input: CreateStockEntryInput,
    ) -> Result<StockEntryWithMovement, LedgerError> {
        let quantity = input.entry_type.normalize(input.quantity)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let entry_id = StockEntryId::new();
        let movement = apply_delta(
            &txn,
            MovementInput {
                variant_id: input.variant_id,
                delta: quantity,
                movement_type: input.entry_type.movement_type(),
                reference: MovementReference::Entry(entry_id),
                performed_by: input.created_by,
                notes: input.notes.clone(),
            },
        )
        .await?;

        let entry = stock_entries::ActiveModel {
            id: Set(entry_id.into_inner()),
            variant_id: Set(input.variant_id.into_inner()),
            quantity: Set(quantity),
            entry_type: Set(input.entry_type.into()),
            notes: Set(input.notes),
            created_by: Set(input.created_by.into_inner()),
            created_at: Set(movement.created_at),
        }
        .insert(&txn)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        info!(%entry_id, entry_type = %input.entry_type, quantity, "stock entry recorded");
        Ok(StockEntryWithMovement { entry, movement })
    }

    /// Lists stock entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_stock_entries(
        &self,
        filter: StockEntryFilter,
    ) -> Result<Vec<stock_entries::Model>, LedgerError> {
        let mut query = stock_entries::Entity::find();

        if let Some(entry_type) = filter.entry_type {
            let entry_type: crate::entities::sea_orm_active_enums::StockEntryType =
                entry_type.into();
            query = query.filter(stock_entries::Column::EntryType.eq(entry_type));
        }
        if let Some(variant_id) = filter.variant_id {
            query = query.filter(stock_entries::Column::VariantId.eq(variant_id.into_inner()));
        }
        if let Some(date_from) = filter.date_from {
            query =
                query.filter(stock_entries::Column::CreatedAt.gte(date_from.fixed_offset()));
        }

        query
            .order_by_desc(stock_entries::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Lists stock movements, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
    ) -> Result<Vec<stock_movements::Model>, LedgerError> {
        let mut query = stock_movements::Entity::find();

        if let Some(movement_type) = filter.movement_type {
            let movement_type: crate::entities::sea_orm_active_enums::MovementType =
                movement_type.into();
            query = query.filter(stock_movements::Column::MovementType.eq(movement_type));
        }
        if let Some(variant_id) = filter.variant_id {
            query = query.filter(stock_movements::Column::VariantId.eq(variant_id.into_inner()));
        }
        if let Some(date_from) = filter.date_from {
            query =
                query.filter(stock_movements::Column::CreatedAt.gte(date_from.fixed_offset()));
        }

        query
            .order_by_desc(stock_movements::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Replays a variant's movement log and compares it with the counter.
    ///
    /// Variants start at zero stock, so the replay opens at zero. Rows are
    /// ordered by creation time; UUID v7 ids break ties.
    ///
    /// # Errors
    ///
    /// Returns `VariantNotFound` or a database error.
    pub async fn verify_movement_log(
        &self,
        variant_id: VariantId,
    ) -> Result<(ReplayReport, i32), LedgerError> {
        let variant = product_variants::Entity::find_by_id(variant_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or(LedgerError::VariantNotFound(variant_id))?;

        let changes: Vec<_> = stock_movements::Entity::find()
            .filter(stock_movements::Column::VariantId.eq(variant_id.into_inner()))
            .order_by_asc(stock_movements::Column::CreatedAt)
            .order_by_asc(stock_movements::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .iter()
            .map(stock_movements::Model::change)
            .collect();

        let report = StockLedger::replay_movements(0, &changes);
        if !report.matches(variant.stock_quantity) {
            warn!(
                %variant_id,
                counter = variant.stock_quantity,
                replayed = report.final_stock,
                "movement log does not match counter"
            );
        }
        Ok((report, variant.stock_quantity))
    }
}
