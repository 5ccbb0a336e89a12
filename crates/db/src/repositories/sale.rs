//! Sale repository: recording, completing and cancelling sales.
//!
//! Completion and cancellation lock the sale header, then every variant on
//! the sale in ascending id order, before any counter is touched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};
use uuid::Uuid;

use stockbook_core::ledger::{LedgerError, MovementReference, MovementType};
use stockbook_core::sales::{
    NewSaleLine, PaymentMethod, SaleError, SaleLine, SaleService, SaleStatus, SaleTotals,
    sale_totals,
};
use stockbook_shared::types::{CustomerId, SaleId, SaleItemId, UserId, VariantId};

use super::stock::{MovementInput, apply_delta, lock_variants};
use crate::entities::{customers, product_variants, sale_items, sales, sea_orm_active_enums};

/// Input for recording a sale.
#[derive(Debug, Clone)]
pub struct CreateSaleInput {
    /// Buying customer.
    pub customer_id: CustomerId,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Whether the goods are delivered, which adds the delivery fee.
    pub delivery_required: bool,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Author.
    pub created_by: UserId,
    /// Sold lines.
    pub items: Vec<NewSaleLine>,
}

/// Sale with its items and totals.
#[derive(Debug, Clone)]
pub struct SaleWithItems {
    /// The sale header.
    pub sale: sales::Model,
    /// Line items.
    pub items: Vec<sale_items::Model>,
    /// Subtotal, delivery fee and total.
    pub totals: SaleTotals,
}

impl SaleWithItems {
    /// Current status as the core type.
    #[must_use]
    pub fn status(&self) -> SaleStatus {
        self.sale.status.into()
    }
}

/// Filter options for listing sales.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    /// Filter by status.
    pub status: Option<SaleStatus>,
    /// Filter by customer.
    pub customer_id: Option<CustomerId>,
    /// Filter by author.
    pub created_by: Option<UserId>,
    /// Only sales containing this variant.
    pub variant_id: Option<VariantId>,
    /// Only sales at or after this instant.
    pub date_from: Option<DateTime<Utc>>,
    /// Only sales before this instant.
    pub date_to: Option<DateTime<Utc>>,
}

/// Completed purchases of one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerPurchaseStats {
    /// Customer ID.
    pub customer_id: CustomerId,
    /// Number of completed sales.
    pub completed_sales: u64,
    /// Sum of their totals.
    pub total_spent: i64,
}

fn discount_basis_points(pct: Decimal) -> Result<i32, SaleError> {
    i32::try_from((pct * Decimal::ONE_HUNDRED).trunc()).map_err(|_| SaleError::AmountOverflow)
}

fn sale_lines(items: &[sale_items::Model]) -> Vec<SaleLine> {
    items.iter().map(sale_items::Model::line).collect()
}

fn with_items(
    sale: sales::Model,
    items: Vec<sale_items::Model>,
) -> Result<SaleWithItems, SaleError> {
    let totals = sale_totals(&sale_lines(&items), sale.delivery_required)?;
    Ok(SaleWithItems { sale, items, totals })
}

/// Customer's full name for movement notes, falling back to the id.
async fn customer_name<C: ConnectionTrait>(
    conn: &C,
    customer_id: Uuid,
) -> Result<String, SaleError> {
    let customer = customers::Entity::find_by_id(customer_id)
        .one(conn)
        .await
        .map_err(|e| SaleError::Database(e.to_string()))?;
    Ok(customer.map_or_else(|| customer_id.to_string(), |c| c.full_name()))
}

async fn lock_sale<C: ConnectionTrait>(
    conn: &C,
    sale_id: SaleId,
) -> Result<sales::Model, SaleError> {
    sales::Entity::find_by_id(sale_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| SaleError::Database(e.to_string()))?
        .ok_or(SaleError::SaleNotFound(sale_id))
}

async fn load_items<C: ConnectionTrait>(
    conn: &C,
    sale_id: SaleId,
) -> Result<Vec<sale_items::Model>, SaleError> {
    sale_items::Entity::find()
        .filter(sale_items::Column::SaleId.eq(sale_id.into_inner()))
        .order_by_asc(sale_items::Column::Id)
        .all(conn)
        .await
        .map_err(|e| SaleError::Database(e.to_string()))
}

/// Sale repository.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    db: DatabaseConnection,
}

impl SaleRepository {
    /// Creates a new sale repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a PENDING sale.
    ///
    /// Unit prices default to the variant's price. Requested quantities are
    /// checked against current stock; the check is advisory and runs again at
    /// completion. No stock moves until the sale is completed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There are no items or an item is malformed
    /// - The customer or a variant does not exist
    /// - A variant lacks stock for the requested quantity
    pub async fn create_sale(&self, input: CreateSaleInput) -> Result<SaleWithItems, SaleError> {
        if input.items.is_empty() {
            return Err(SaleError::EmptySale);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        customers::Entity::find_by_id(input.customer_id.into_inner())
            .one(&txn)
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?
            .ok_or(SaleError::CustomerNotFound(input.customer_id))?;

        let mut stock = BTreeMap::new();
        let mut lines = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let variant = product_variants::Entity::find_by_id(item.variant_id.into_inner())
                .one(&txn)
                .await
                .map_err(|e| SaleError::Database(e.to_string()))?
                .ok_or(LedgerError::VariantNotFound(item.variant_id))?;
            stock.insert(item.variant_id, variant.stock_quantity);
            lines.push(SaleLine {
                variant_id: item.variant_id,
                quantity: item.quantity,
                unit_price: SaleService::resolve_unit_price(item.unit_price, variant.unit_price),
                discount_percentage: item.discount_percentage,
            });
        }

        SaleService::validate_lines(&lines)?;
        SaleService::check_stock(&lines, &stock)
            .inspect_err(|e| warn!(error = %e, "sale rejected"))?;
        let totals = sale_totals(&lines, input.delivery_required)?;

        let sale_id = SaleId::new();
        let now = Utc::now().into();
        let sale = sales::ActiveModel {
            id: Set(sale_id.into_inner()),
            customer_id: Set(input.customer_id.into_inner()),
            status: Set(sea_orm_active_enums::SaleStatus::Pending),
            payment_method: Set(input.payment_method.into()),
            delivery_required: Set(input.delivery_required),
            delivery_fee: Set(totals.delivery_fee),
            notes: Set(input.notes),
            created_by: Set(input.created_by.into_inner()),
            sale_date: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| SaleError::Database(e.to_string()))?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = sale_items::ActiveModel {
                id: Set(SaleItemId::new().into_inner()),
                sale_id: Set(sale_id.into_inner()),
                variant_id: Set(line.variant_id.into_inner()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                discount_basis_points: Set(discount_basis_points(line.discount_percentage)?),
            }
            .insert(&txn)
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;
            items.push(item);
        }

        txn.commit()
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        info!(%sale_id, items = items.len(), total = totals.total, "sale recorded");
        Ok(SaleWithItems { sale, items, totals })
    }

    /// Finds a sale with its items and totals.
    ///
    /// # Errors
    ///
    /// Returns `SaleNotFound` or a database error.
    pub async fn get_sale(&self, sale_id: SaleId) -> Result<SaleWithItems, SaleError> {
        let sale = sales::Entity::find_by_id(sale_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?
            .ok_or(SaleError::SaleNotFound(sale_id))?;
        let items = load_items(&self.db, sale_id).await?;
        with_items(sale, items)
    }

    /// Lists sale headers, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_sales(&self, filter: SaleFilter) -> Result<Vec<sales::Model>, SaleError> {
        let mut query = sales::Entity::find();

        if let Some(status) = filter.status {
            let status: sea_orm_active_enums::SaleStatus = status.into();
            query = query.filter(sales::Column::Status.eq(status));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(sales::Column::CustomerId.eq(customer_id.into_inner()));
        }
        if let Some(created_by) = filter.created_by {
            query = query.filter(sales::Column::CreatedBy.eq(created_by.into_inner()));
        }
        if let Some(variant_id) = filter.variant_id {
            let sale_ids: Vec<Uuid> = sale_items::Entity::find()
                .select_only()
                .column(sale_items::Column::SaleId)
                .filter(sale_items::Column::VariantId.eq(variant_id.into_inner()))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| SaleError::Database(e.to_string()))?;
            if sale_ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.filter(sales::Column::Id.is_in(sale_ids));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(sales::Column::SaleDate.gte(date_from.fixed_offset()));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(sales::Column::SaleDate.lt(date_to.fixed_offset()));
        }

        query
            .order_by_desc(sales::Column::SaleDate)
            .all(&self.db)
            .await
            .map_err(|e| SaleError::Database(e.to_string()))
    }

    /// Completes a pending sale, deducting every item from stock.
    ///
    /// Stock is re-validated under row locks. The delivery fee is recomputed
    /// from the current items. The deductions and the status change commit
    /// together.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The sale has no items
    /// - The sale is already COMPLETED or has been CANCELLED
    /// - Any variant lacks stock (every shortage is reported)
    pub async fn complete(
        &self,
        sale_id: SaleId,
        performed_by: UserId,
    ) -> Result<SaleWithItems, SaleError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        let sale = lock_sale(&txn, sale_id).await?;
        let items = load_items(&txn, sale_id).await?;
        let lines = sale_lines(&items);

        let stock: BTreeMap<VariantId, i32> = if lines.is_empty() {
            BTreeMap::new()
        } else {
            lock_variants(&txn, lines.iter().map(|l| l.variant_id))
                .await?
                .iter()
                .map(|(id, variant)| (*id, variant.stock_quantity))
                .collect()
        };

        let plan = SaleService::plan_completion(
            sale.status.into(),
            &lines,
            &stock,
            sale.delivery_required,
        )
        .inspect_err(|e| warn!(%sale_id, error = %e, "completion rejected"))?;

        let note = format!("Sale to {}", customer_name(&txn, sale.customer_id).await?);
        for debit in &plan.debits {
            apply_delta(
                &txn,
                MovementInput {
                    variant_id: debit.variant_id,
                    delta: debit.delta,
                    movement_type: MovementType::Sale,
                    reference: MovementReference::Sale(sale_id),
                    performed_by,
                    notes: Some(note.clone()),
                },
            )
            .await?;
        }

        let mut active: sales::ActiveModel = sale.into();
        active.status = Set(sea_orm_active_enums::SaleStatus::Completed);
        active.delivery_fee = Set(plan.delivery_fee);
        active.updated_at = Set(Utc::now().into());
        let sale = active
            .update(&txn)
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        info!(
            %sale_id,
            debits = plan.debits.len(),
            delivery_fee = plan.delivery_fee,
            "sale completed"
        );
        with_items(sale, items)
    }

    /// Cancels a sale. A completed sale has every item returned to stock.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCancelled` if the sale is CANCELLED.
    pub async fn cancel(
        &self,
        sale_id: SaleId,
        performed_by: UserId,
    ) -> Result<SaleWithItems, SaleError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        let sale = lock_sale(&txn, sale_id).await?;
        let items = load_items(&txn, sale_id).await?;
        let lines = sale_lines(&items);

        let plan = SaleService::plan_cancellation(sale.status.into(), &lines)
            .inspect_err(|e| warn!(%sale_id, error = %e, "cancellation rejected"))?;

        if !plan.restorations.is_empty() {
            lock_variants(&txn, plan.restorations.iter().map(|r| r.variant_id)).await?;
        }
        let note = format!(
            "Sale cancellation for {}",
            customer_name(&txn, sale.customer_id).await?
        );
        for restoration in &plan.restorations {
            apply_delta(
                &txn,
                MovementInput {
                    variant_id: restoration.variant_id,
                    delta: restoration.delta,
                    movement_type: MovementType::Return,
                    reference: MovementReference::SaleCancel(sale_id),
                    performed_by,
                    notes: Some(note.clone()),
                },
            )
            .await?;
        }

        let mut active: sales::ActiveModel = sale.into();
        active.status = Set(sea_orm_active_enums::SaleStatus::Cancelled);
        active.updated_at = Set(Utc::now().into());
        let sale = active
            .update(&txn)
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        info!(%sale_id, restorations = plan.restorations.len(), "sale cancelled");
        with_items(sale, items)
    }

    /// Deletes a sale that never completed.
    ///
    /// # Errors
    ///
    /// Returns `CannotDelete` if the sale is COMPLETED.
    pub async fn delete_sale(&self, sale_id: SaleId) -> Result<(), SaleError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        let sale = lock_sale(&txn, sale_id).await?;
        SaleService::validate_can_delete(sale.status.into())?;

        sale_items::Entity::delete_many()
            .filter(sale_items::Column::SaleId.eq(sale_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;
        sale.delete(&txn)
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        info!(%sale_id, "sale deleted");
        Ok(())
    }

    /// Counts a customer's completed sales and sums their totals.
    ///
    /// # Errors
    ///
    /// Returns `CustomerNotFound` or a database error.
    pub async fn customer_purchase_stats(
        &self,
        customer_id: CustomerId,
    ) -> Result<CustomerPurchaseStats, SaleError> {
        customers::Entity::find_by_id(customer_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?
            .ok_or(SaleError::CustomerNotFound(customer_id))?;

        let completed = sales::Entity::find()
            .filter(sales::Column::CustomerId.eq(customer_id.into_inner()))
            .filter(sales::Column::Status.eq(sea_orm_active_enums::SaleStatus::Completed))
            .all(&self.db)
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;
        if completed.is_empty() {
            return Ok(CustomerPurchaseStats {
                customer_id,
                completed_sales: 0,
                total_spent: 0,
            });
        }

        let items = sale_items::Entity::find()
            .filter(sale_items::Column::SaleId.is_in(completed.iter().map(|s| s.id)))
            .all(&self.db)
            .await
            .map_err(|e| SaleError::Database(e.to_string()))?;

        let mut lines_by_sale: HashMap<Uuid, Vec<SaleLine>> = HashMap::new();
        for item in &items {
            lines_by_sale.entry(item.sale_id).or_default().push(item.line());
        }

        let mut total_spent = 0i64;
        for sale in &completed {
            let lines = lines_by_sale.remove(&sale.id).unwrap_or_default();
            let totals = sale_totals(&lines, sale.delivery_required)?;
            total_spent = total_spent
                .checked_add(totals.total)
                .ok_or(SaleError::AmountOverflow)?;
        }

        Ok(CustomerPurchaseStats {
            customer_id,
            completed_sales: completed.len() as u64,
            total_spent,
        })
    }
}
