//! Order repository for purchase orders and their deliveries.
//!
//! Status transitions lock the order header first, then the variants touched
//! by the delivery in ascending id order.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::{info, warn};

use stockbook_core::ledger::{LedgerError, MovementReference, MovementType};
use stockbook_core::orders::{
    FulfillmentService, ItemDelivery, NewOrderLine, OrderError, OrderLine, OrderStatus,
};
use stockbook_shared::types::{OrderId, OrderItemId, SupplierId, UserId, VariantId};

use super::stock::{MovementInput, apply_delta, lock_variants};
use crate::entities::{order_items, orders, product_variants, sea_orm_active_enums, suppliers};

/// Input for creating a purchase order.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    /// Supplier the goods are ordered from.
    pub supplier_id: SupplierId,
    /// Expected delivery date.
    pub expected_delivery: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Author.
    pub created_by: UserId,
    /// Ordered lines.
    pub items: Vec<NewOrderLine>,
}

/// Order with its items and total amount.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    /// The order header.
    pub order: orders::Model,
    /// Line items.
    pub items: Vec<order_items::Model>,
    /// Sum of quantity x unit price.
    pub total_amount: i64,
}

impl OrderWithItems {
    /// Current status as the core type.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        self.order.status.into()
    }

    /// Finds an item by variant.
    #[must_use]
    pub fn item_for(&self, variant_id: VariantId) -> Option<&order_items::Model> {
        self.items
            .iter()
            .find(|item| item.variant_id == variant_id.into_inner())
    }
}

/// Filter options for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Filter by status.
    pub status: Option<OrderStatus>,
    /// Filter by supplier.
    pub supplier_id: Option<SupplierId>,
    /// Only orders placed at or after this instant.
    pub ordered_after: Option<DateTime<Utc>>,
}

fn order_line(item: &order_items::Model) -> OrderLine {
    OrderLine {
        item_id: OrderItemId::from_uuid(item.id),
        variant_id: VariantId::from_uuid(item.variant_id),
        quantity: item.quantity,
        delivered_quantity: item.delivered_quantity,
        unit_price: item.unit_price,
    }
}

fn with_items(
    order: orders::Model,
    items: Vec<order_items::Model>,
) -> Result<OrderWithItems, OrderError> {
    let lines: Vec<OrderLine> = items.iter().map(order_line).collect();
    let total_amount = FulfillmentService::order_total(&lines)?;
    Ok(OrderWithItems {
        order,
        items,
        total_amount,
    })
}

async fn lock_order<C: ConnectionTrait>(
    conn: &C,
    order_id: OrderId,
) -> Result<orders::Model, OrderError> {
    orders::Entity::find_by_id(order_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?
        .ok_or(OrderError::OrderNotFound(order_id))
}

async fn load_items<C: ConnectionTrait>(
    conn: &C,
    order_id: OrderId,
) -> Result<Vec<order_items::Model>, OrderError> {
    order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order_id.into_inner()))
        .order_by_asc(order_items::Column::Id)
        .all(conn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))
}

/// Order repository.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a PENDING purchase order with its items.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There are no items, or an item has a quantity below 1 or a negative price
    /// - The supplier or a variant does not exist
    pub async fn create_order(
        &self,
        input: CreateOrderInput,
    ) -> Result<OrderWithItems, OrderError> {
        FulfillmentService::validate_new_order(&input.items)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        suppliers::Entity::find_by_id(input.supplier_id.into_inner())
            .one(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?
            .ok_or(OrderError::SupplierNotFound(input.supplier_id))?;

        for line in &input.items {
            product_variants::Entity::find_by_id(line.variant_id.into_inner())
                .one(&txn)
                .await
                .map_err(|e| OrderError::Database(e.to_string()))?
                .ok_or(LedgerError::VariantNotFound(line.variant_id))?;
        }

        let order_id = OrderId::new();
        let now = Utc::now().into();
        let order = orders::ActiveModel {
            id: Set(order_id.into_inner()),
            supplier_id: Set(input.supplier_id.into_inner()),
            status: Set(sea_orm_active_enums::OrderStatus::Pending),
            order_date: Set(now),
            expected_delivery: Set(input.expected_delivery),
            received_date: Set(None),
            created_by: Set(input.created_by.into_inner()),
            received_by: Set(None),
            notes: Set(input.notes),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?;

        let mut items = Vec::with_capacity(input.items.len());
        for line in input.items {
            let item = order_items::ActiveModel {
                id: Set(OrderItemId::new().into_inner()),
                order_id: Set(order_id.into_inner()),
                variant_id: Set(line.variant_id.into_inner()),
                quantity: Set(line.quantity),
                delivered_quantity: Set(0),
                unit_price: Set(line.unit_price),
                is_delivered: Set(false),
                notes: Set(line.notes),
            }
            .insert(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
            items.push(item);
        }

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(%order_id, items = items.len(), "order created");
        with_items(order, items)
    }

    /// Finds an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound` or a database error.
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderWithItems, OrderError> {
        let order = orders::Entity::find_by_id(order_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let items = load_items(&self.db, order_id).await?;
        with_items(order, items)
    }

    /// Lists order headers, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<orders::Model>, OrderError> {
        let mut query = orders::Entity::find();

        if let Some(status) = filter.status {
            let status: sea_orm_active_enums::OrderStatus = status.into();
            query = query.filter(orders::Column::Status.eq(status));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(orders::Column::SupplierId.eq(supplier_id.into_inner()));
        }
        if let Some(after) = filter.ordered_after {
            query = query.filter(orders::Column::OrderDate.gte(after.fixed_offset()));
        }

        query
            .order_by_desc(orders::Column::OrderDate)
            .all(&self.db)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))
    }

    /// Lists orders still awaiting goods (PENDING or PARTIAL), oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn pending_orders(&self) -> Result<Vec<orders::Model>, OrderError> {
        orders::Entity::find()
            .filter(orders::Column::Status.is_in([
                sea_orm_active_enums::OrderStatus::Pending,
                sea_orm_active_enums::OrderStatus::Partial,
            ]))
            .order_by_asc(orders::Column::OrderDate)
            .all(&self.db)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))
    }

    /// Records the receipt of goods against an order.
    ///
    /// Every pair is validated before anything is written. Accepted items get
    /// their delivered quantity raised and their variant's stock incremented
    /// with an ORDER movement; the order status is then recomputed. The whole
    /// delivery is one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The order is DELIVERED or CANCELLED
    /// - An item does not belong to the order
    /// - Any item would receive more than its remaining quantity
    /// - No pair carries a positive quantity
    pub async fn record_delivery(
        &self,
        order_id: OrderId,
        deliveries: &[ItemDelivery],
        received_by: UserId,
    ) -> Result<OrderWithItems, OrderError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let order = lock_order(&txn, order_id).await?;
        let items = load_items(&txn, order_id).await?;
        let lines: Vec<OrderLine> = items.iter().map(order_line).collect();

        let plan = FulfillmentService::plan_delivery(order.status.into(), &lines, deliveries)
            .inspect_err(|e| warn!(%order_id, error = %e, "delivery rejected"))?;

        lock_variants(&txn, plan.receipts.iter().map(|r| r.variant_id)).await?;

        let mut items: HashMap<OrderItemId, order_items::Model> = items
            .into_iter()
            .map(|item| (OrderItemId::from_uuid(item.id), item))
            .collect();

        for receipt in &plan.receipts {
            let item = items
                .remove(&receipt.item_id)
                .ok_or(OrderError::ItemNotInOrder(receipt.item_id))?;

            let mut active: order_items::ActiveModel = item.into();
            active.delivered_quantity = Set(receipt.delivered_quantity);
            active.is_delivered = Set(receipt.is_delivered);
            active
                .update(&txn)
                .await
                .map_err(|e| OrderError::Database(e.to_string()))?;

            apply_delta(
                &txn,
                MovementInput {
                    variant_id: receipt.variant_id,
                    delta: receipt.quantity,
                    movement_type: MovementType::Order,
                    reference: MovementReference::Order(order_id),
                    performed_by: received_by,
                    notes: None,
                },
            )
            .await?;
        }

        let now = Utc::now().into();
        let mut active: orders::ActiveModel = order.clone().into();
        active.status = Set(plan.new_status.into());
        if plan.new_status == OrderStatus::Delivered {
            active.received_date = Set(Some(now));
        }
        if order.received_by.is_none() {
            active.received_by = Set(Some(received_by.into_inner()));
        }
        active.updated_at = Set(now);
        active
            .update(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(
            %order_id,
            items = plan.receipts.len(),
            status = %plan.new_status,
            "delivery recorded"
        );
        self.get_order(order_id).await
    }

    /// Cancels an open order. Goods already received stay in stock.
    ///
    /// # Errors
    ///
    /// Returns `CannotCancel` unless the order is PENDING or PARTIAL.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<orders::Model, OrderError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let order = lock_order(&txn, order_id).await?;
        FulfillmentService::validate_can_cancel(order.status.into())
            .inspect_err(|e| warn!(%order_id, error = %e, "cancellation rejected"))?;

        let mut active: orders::ActiveModel = order.into();
        active.status = Set(sea_orm_active_enums::OrderStatus::Cancelled);
        active.updated_at = Set(Utc::now().into());
        let order = active
            .update(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(%order_id, "order cancelled");
        Ok(order)
    }

    /// Deletes an order and its items.
    ///
    /// # Errors
    ///
    /// Returns `CannotDelete` if the order is DELIVERED.
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), OrderError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let order = lock_order(&txn, order_id).await?;
        FulfillmentService::validate_can_delete(order.status.into())?;

        order_items::Entity::delete_many()
            .filter(order_items::Column::OrderId.eq(order_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        order
            .delete(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(%order_id, "order deleted");
        Ok(())
    }
}
