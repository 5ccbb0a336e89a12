//! Fulfillment service for purchase orders.

use std::collections::BTreeMap;
use stockbook_shared::types::OrderItemId;

use super::error::OrderError;
use super::types::{
    DeliveryPlan, ItemDelivery, ItemReceipt, NewOrderLine, OrderLine, OrderStatus,
    OverDeliveryLine,
};

/// Fulfillment service for purchase orders.
///
/// Pure planning logic; the repository applies the plan inside a
/// transaction and credits stock through the ledger.
pub struct FulfillmentService;

impl FulfillmentService {
    /// Validates the lines of a new purchase order.
    ///
    /// # Errors
    ///
    /// - `EmptyOrder` if there are no lines.
    /// - `InvalidLine` listing every malformed line.
    /// - `AmountOverflow` if the order total does not fit an `i64`.
    pub fn validate_new_order(lines: &[NewOrderLine]) -> Result<(), OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let mut issues = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            let n = idx + 1;
            if line.quantity < 1 {
                issues.push(format!("item {n}: quantity must be at least 1"));
            }
            if line.unit_price < 0 {
                issues.push(format!("item {n}: unit price cannot be negative"));
            }
        }

        if !issues.is_empty() {
            return Err(OrderError::InvalidLine(issues));
        }

        lines.iter().try_fold(0_i64, |total, line| {
            i64::from(line.quantity)
                .checked_mul(line.unit_price)
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or(OrderError::AmountOverflow)
        })?;
        Ok(())
    }

    /// Plans a delivery against the order's current item state.
    ///
    /// Non-positive quantities are skipped and repeated items are summed.
    /// Every over-filled item is reported in one `OverDelivery` error so the
    /// caller can fix the whole request at once.
    ///
    /// # Errors
    ///
    /// - `AlreadyDelivered` / `OrderCancelled` for closed orders.
    /// - `ItemNotInOrder` for an item id outside `lines`.
    /// - `OverDelivery` if any item would exceed its ordered quantity.
    /// - `NothingToDeliver` if no positive quantity remains.
    pub fn plan_delivery(
        status: OrderStatus,
        lines: &[OrderLine],
        deliveries: &[ItemDelivery],
    ) -> Result<DeliveryPlan, OrderError> {
        match status {
            OrderStatus::Delivered => return Err(OrderError::AlreadyDelivered),
            OrderStatus::Cancelled => return Err(OrderError::OrderCancelled),
            OrderStatus::Pending | OrderStatus::Partial => {}
        }

        let by_item: BTreeMap<OrderItemId, &OrderLine> =
            lines.iter().map(|line| (line.item_id, line)).collect();

        let mut requested: BTreeMap<OrderItemId, i64> = BTreeMap::new();
        for delivery in deliveries.iter().filter(|d| d.quantity > 0) {
            if !by_item.contains_key(&delivery.item_id) {
                return Err(OrderError::ItemNotInOrder(delivery.item_id));
            }
            *requested.entry(delivery.item_id).or_default() += i64::from(delivery.quantity);
        }

        if requested.is_empty() {
            return Err(OrderError::NothingToDeliver);
        }

        let mut violations = Vec::new();
        let mut receipts = Vec::with_capacity(requested.len());
        for (item_id, qty) in &requested {
            let line = by_item[item_id];
            match i32::try_from(*qty) {
                Ok(qty) if qty <= line.remaining() => {
                    let delivered_quantity = line.delivered_quantity + qty;
                    receipts.push(ItemReceipt {
                        item_id: *item_id,
                        variant_id: line.variant_id,
                        quantity: qty,
                        delivered_quantity,
                        is_delivered: delivered_quantity >= line.quantity,
                    });
                }
                over => violations.push(OverDeliveryLine {
                    item_id: *item_id,
                    variant_id: line.variant_id,
                    ordered: line.quantity,
                    already_delivered: line.delivered_quantity,
                    requested: over.unwrap_or(i32::MAX),
                }),
            }
        }

        if !violations.is_empty() {
            return Err(OrderError::OverDelivery(violations));
        }

        let delivered_after: BTreeMap<OrderItemId, i32> = receipts
            .iter()
            .map(|r| (r.item_id, r.delivered_quantity))
            .collect();
        let updated: Vec<OrderLine> = lines
            .iter()
            .map(|line| OrderLine {
                delivered_quantity: delivered_after
                    .get(&line.item_id)
                    .copied()
                    .unwrap_or(line.delivered_quantity),
                ..*line
            })
            .collect();

        receipts.sort_by_key(|r| (r.variant_id, r.item_id));

        Ok(DeliveryPlan {
            receipts,
            new_status: Self::derive_status(&updated),
        })
    }

    /// Derives order status from item delivery state.
    #[must_use]
    pub fn derive_status(lines: &[OrderLine]) -> OrderStatus {
        if !lines.is_empty() && lines.iter().all(OrderLine::is_delivered) {
            OrderStatus::Delivered
        } else if lines.iter().any(|line| line.delivered_quantity > 0) {
            OrderStatus::Partial
        } else {
            OrderStatus::Pending
        }
    }

    /// Sum of ordered quantity times unit price.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if the total does not fit an `i64`.
    pub fn order_total(lines: &[OrderLine]) -> Result<i64, OrderError> {
        lines.iter().try_fold(0_i64, |total, line| {
            line.subtotal()
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or(OrderError::AmountOverflow)
        })
    }

    /// Validates that an order can be cancelled.
    ///
    /// # Errors
    ///
    /// Returns `CannotCancel` unless the order is pending or partial.
    pub fn validate_can_cancel(status: OrderStatus) -> Result<(), OrderError> {
        if status.is_open() {
            Ok(())
        } else {
            Err(OrderError::CannotCancel(status))
        }
    }

    /// Validates that an order can be deleted.
    ///
    /// # Errors
    ///
    /// Returns `CannotDelete` for delivered orders.
    pub fn validate_can_delete(status: OrderStatus) -> Result<(), OrderError> {
        if status == OrderStatus::Delivered {
            Err(OrderError::CannotDelete(status))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use stockbook_shared::types::VariantId;

    fn line(quantity: i32, delivered: i32) -> OrderLine {
        OrderLine {
            item_id: OrderItemId::new(),
            variant_id: VariantId::new(),
            quantity,
            delivered_quantity: delivered,
            unit_price: 250,
        }
    }

    fn deliver(line: &OrderLine, quantity: i32) -> ItemDelivery {
        ItemDelivery {
            item_id: line.item_id,
            quantity,
        }
    }

    #[test]
    fn test_partial_then_full_delivery() {
        let mut item = line(10, 0);

        let plan =
            FulfillmentService::plan_delivery(OrderStatus::Pending, &[item], &[deliver(&item, 4)])
                .unwrap();
        assert_eq!(plan.new_status, OrderStatus::Partial);
        assert_eq!(plan.receipts[0].quantity, 4);
        assert!(!plan.receipts[0].is_delivered);
        item.delivered_quantity = plan.receipts[0].delivered_quantity;

        let plan =
            FulfillmentService::plan_delivery(OrderStatus::Partial, &[item], &[deliver(&item, 6)])
                .unwrap();
        assert_eq!(plan.new_status, OrderStatus::Delivered);
        assert_eq!(plan.receipts[0].delivered_quantity, 10);
        assert!(plan.receipts[0].is_delivered);
        item.delivered_quantity = 10;

        let err = FulfillmentService::plan_delivery(
            OrderStatus::Delivered,
            &[item],
            &[deliver(&item, 1)],
        )
        .unwrap_err();
        assert_eq!(err, OrderError::AlreadyDelivered);
    }

    #[test]
    fn test_over_delivery_collects_every_item() {
        let a = line(10, 4);
        let b = line(5, 0);
        let c = line(3, 0);

        let err = FulfillmentService::plan_delivery(
            OrderStatus::Partial,
            &[a, b, c],
            &[deliver(&a, 7), deliver(&b, 2), deliver(&c, 4)],
        )
        .unwrap_err();

        let OrderError::OverDelivery(lines) = err else {
            panic!("expected over-delivery");
        };
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().any(|l| l.item_id == a.item_id && l.remaining() == 6));
        assert!(lines.iter().any(|l| l.item_id == c.item_id && l.requested == 4));
    }

    #[test]
    fn test_repeated_items_are_summed() {
        let a = line(5, 0);
        let err = FulfillmentService::plan_delivery(
            OrderStatus::Pending,
            &[a],
            &[deliver(&a, 3), deliver(&a, 3)],
        )
        .unwrap_err();
        assert!(matches!(err, OrderError::OverDelivery(_)));

        let plan = FulfillmentService::plan_delivery(
            OrderStatus::Pending,
            &[a],
            &[deliver(&a, 2), deliver(&a, 3)],
        )
        .unwrap();
        assert_eq!(plan.receipts.len(), 1);
        assert_eq!(plan.receipts[0].quantity, 5);
        assert_eq!(plan.new_status, OrderStatus::Delivered);
    }

    #[test]
    fn test_non_positive_quantities_skipped() {
        let a = line(5, 0);
        let b = line(5, 0);
        let plan = FulfillmentService::plan_delivery(
            OrderStatus::Pending,
            &[a, b],
            &[deliver(&a, 0), deliver(&b, -2), deliver(&b, 1)],
        )
        .unwrap();
        assert_eq!(plan.receipts.len(), 1);
        assert_eq!(plan.receipts[0].item_id, b.item_id);
        assert_eq!(plan.new_status, OrderStatus::Partial);

        let err = FulfillmentService::plan_delivery(
            OrderStatus::Pending,
            &[a],
            &[deliver(&a, 0)],
        )
        .unwrap_err();
        assert_eq!(err, OrderError::NothingToDeliver);
    }

    #[test]
    fn test_foreign_item_rejected() {
        let a = line(5, 0);
        let stranger = line(5, 0);
        let err = FulfillmentService::plan_delivery(
            OrderStatus::Pending,
            &[a],
            &[deliver(&stranger, 1)],
        )
        .unwrap_err();
        assert_eq!(err, OrderError::ItemNotInOrder(stranger.item_id));
    }

    #[test]
    fn test_cancelled_order_rejects_delivery() {
        let a = line(5, 0);
        let err = FulfillmentService::plan_delivery(
            OrderStatus::Cancelled,
            &[a],
            &[deliver(&a, 1)],
        )
        .unwrap_err();
        assert_eq!(err, OrderError::OrderCancelled);
    }

    #[test]
    fn test_receipts_sorted_by_variant() {
        let a = line(5, 0);
        let b = line(5, 0);
        let plan = FulfillmentService::plan_delivery(
            OrderStatus::Pending,
            &[a, b],
            &[deliver(&b, 1), deliver(&a, 1)],
        )
        .unwrap();
        assert!(plan.receipts[0].variant_id <= plan.receipts[1].variant_id);
    }

    #[rstest]
    #[case(&[(10, 0), (5, 0)], OrderStatus::Pending)]
    #[case(&[(10, 3), (5, 0)], OrderStatus::Partial)]
    #[case(&[(10, 10), (5, 0)], OrderStatus::Partial)]
    #[case(&[(10, 10), (5, 5)], OrderStatus::Delivered)]
    fn test_derive_status(#[case] state: &[(i32, i32)], #[case] expected: OrderStatus) {
        let lines: Vec<OrderLine> = state.iter().map(|(q, d)| line(*q, *d)).collect();
        assert_eq!(FulfillmentService::derive_status(&lines), expected);
    }

    #[test]
    fn test_validate_new_order() {
        assert_eq!(
            FulfillmentService::validate_new_order(&[]),
            Err(OrderError::EmptyOrder)
        );

        let bad = [
            NewOrderLine {
                variant_id: VariantId::new(),
                quantity: 0,
                unit_price: 100,
                notes: None,
            },
            NewOrderLine {
                variant_id: VariantId::new(),
                quantity: 2,
                unit_price: -1,
                notes: None,
            },
        ];
        let Err(OrderError::InvalidLine(issues)) = FulfillmentService::validate_new_order(&bad)
        else {
            panic!("expected invalid line");
        };
        assert_eq!(issues.len(), 2);
        assert!(issues[0].starts_with("item 1"));
        assert!(issues[1].starts_with("item 2"));
    }

    #[test]
    fn test_order_total() {
        assert_eq!(FulfillmentService::order_total(&[line(4, 0), line(2, 2)]), Ok(1500));
    }

    #[test]
    fn test_order_total_overflow_is_an_error() {
        let mut huge = line(2, 0);
        huge.unit_price = i64::MAX;
        assert_eq!(
            FulfillmentService::order_total(&[huge]),
            Err(OrderError::AmountOverflow)
        );

        let mut half = line(1, 0);
        half.unit_price = i64::MAX / 2 + 1;
        assert_eq!(
            FulfillmentService::order_total(&[half, half]),
            Err(OrderError::AmountOverflow)
        );
    }

    #[test]
    fn test_new_order_total_must_fit() {
        let new_line = |quantity, unit_price| NewOrderLine {
            variant_id: VariantId::new(),
            quantity,
            unit_price,
            notes: None,
        };
        let err = FulfillmentService::validate_new_order(&[new_line(2, i64::MAX)]).unwrap_err();
        assert_eq!(err, OrderError::AmountOverflow);

        assert!(FulfillmentService::validate_new_order(&[new_line(1, i64::MAX)]).is_ok());
    }

    #[rstest]
    #[case(OrderStatus::Pending, true, true)]
    #[case(OrderStatus::Partial, true, true)]
    #[case(OrderStatus::Delivered, false, false)]
    #[case(OrderStatus::Cancelled, false, true)]
    fn test_cancel_and_delete_rules(
        #[case] status: OrderStatus,
        #[case] can_cancel: bool,
        #[case] can_delete: bool,
    ) {
        assert_eq!(FulfillmentService::validate_can_cancel(status).is_ok(), can_cancel);
        assert_eq!(FulfillmentService::validate_can_delete(status).is_ok(), can_delete);
    }
}
