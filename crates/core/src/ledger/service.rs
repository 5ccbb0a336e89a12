//! Stock ledger service.
//!
//! Pure counter arithmetic. The repository layer loads and row-locks the
//! variant, calls [`StockLedger::apply_delta`], then persists the returned
//! snapshot and the movement row in the same database transaction.

use stockbook_shared::types::VariantId;

use super::error::LedgerError;
use super::types::{ReplayMismatch, ReplayReport, StockChange};

/// Stock ledger service.
///
/// Stateless: every operation receives the current counter value and returns
/// the change to persist.
pub struct StockLedger;

impl StockLedger {
    /// Computes the effect of applying `delta` to a variant's counter.
    ///
    /// # Errors
    ///
    /// - `InvalidQuantity` if `delta` is zero or the result overflows.
    /// - `InsufficientStock` if `current_stock + delta` would be negative.
    pub fn apply_delta(
        variant_id: VariantId,
        current_stock: i32,
        delta: i32,
    ) -> Result<StockChange, LedgerError> {
        if delta == 0 {
            return Err(LedgerError::InvalidQuantity(
                "stock delta cannot be zero".to_string(),
            ));
        }

        let new_stock = current_stock.checked_add(delta).ok_or_else(|| {
            LedgerError::InvalidQuantity(format!(
                "applying {delta} to stock {current_stock} overflows the counter"
            ))
        })?;

        if new_stock < 0 {
            return Err(LedgerError::InsufficientStock {
                variant_id,
                available: current_stock,
                requested: delta.saturating_neg(),
            });
        }

        Ok(StockChange {
            previous_stock: current_stock,
            quantity: delta,
            new_stock,
        })
    }

    /// Rebuilds a counter by replaying its movement rows in creation order.
    ///
    /// A row is consistent when it starts from the running counter, its
    /// `new_stock` equals `previous_stock + quantity`, and the result is not
    /// negative. Replay stops at the first inconsistent row.
    #[must_use]
    pub fn replay_movements(opening_stock: i32, movements: &[StockChange]) -> ReplayReport {
        let mut running = opening_stock;

        for (index, movement) in movements.iter().enumerate() {
            let chained = movement.previous_stock == running
                && movement.previous_stock.checked_add(movement.quantity)
                    == Some(movement.new_stock)
                && movement.new_stock >= 0;

            if !chained {
                return ReplayReport {
                    final_stock: running,
                    applied: index,
                    mismatch: Some(ReplayMismatch {
                        index,
                        expected_previous: running,
                        recorded: *movement,
                    }),
                };
            }
            running = movement.new_stock;
        }

        ReplayReport {
            final_stock: running,
            applied: movements.len(),
            mismatch: None,
        }
    }
}
