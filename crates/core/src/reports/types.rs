//! Report types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stockbook_shared::types::{CategoryId, VariantId};

/// Stock row of an active variant, joined with its product and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantStockRow {
    /// Variant ID.
    pub variant_id: VariantId,
    /// Product name.
    pub product_name: String,
    /// Variant name.
    pub variant_name: String,
    /// Category ID.
    pub category_id: CategoryId,
    /// Category name.
    pub category_name: String,
    /// Whether the category is active.
    pub category_active: bool,
    /// Units on hand.
    pub stock_quantity: i32,
    /// Reorder level.
    pub reorder_level: i32,
    /// Unit price.
    pub unit_price: i64,
}

impl VariantStockRow {
    /// Stock quantity times unit price, `None` on overflow.
    #[must_use]
    pub fn stock_value(&self) -> Option<i64> {
        i64::from(self.stock_quantity).checked_mul(self.unit_price)
    }
}

/// Stock aggregated per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStock {
    /// Category ID.
    pub category_id: CategoryId,
    /// Category name.
    pub category_name: String,
    /// Number of variants.
    pub variant_count: u64,
    /// Units on hand.
    pub units: i64,
    /// Stock value.
    pub value: i64,
}

/// Inventory report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryReport {
    /// Threshold used for the low-stock list.
    pub low_stock_threshold: i32,
    /// Number of active variants.
    pub total_variants: u64,
    /// Units on hand across active variants.
    pub total_units: i64,
    /// Stock value across active variants.
    pub total_value: i64,
    /// Variants at or below the threshold, ascending stock.
    pub low_stock: Vec<VariantStockRow>,
    /// Variants with no stock.
    pub out_of_stock: Vec<VariantStockRow>,
    /// Stock per active category, by name.
    pub by_category: Vec<CategoryStock>,
}

/// Sold line of a completed sale within the report range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldLineRow {
    /// Variant ID.
    pub variant_id: VariantId,
    /// Product name.
    pub product_name: String,
    /// Variant name.
    pub variant_name: String,
    /// Units sold.
    pub quantity: i32,
    /// Line total after discount.
    pub line_total: i64,
}

/// Sales per variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    /// Variant ID.
    pub variant_id: VariantId,
    /// Product name.
    pub product_name: String,
    /// Variant name.
    pub variant_name: String,
    /// Units sold.
    pub quantity_sold: i64,
    /// Revenue after discounts.
    pub revenue: i64,
}

/// Sales report over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReport {
    /// First day included.
    pub date_from: NaiveDate,
    /// Last day included.
    pub date_to: NaiveDate,
    /// Completed sales in range.
    pub sale_count: u64,
    /// Sum of sale totals.
    pub revenue: i64,
    /// Revenue divided by count, rounded half to even.
    pub average_sale: i64,
    /// Best sellers by quantity.
    pub top_products: Vec<ProductSales>,
}
