//! Report repository: loads the rows the report service aggregates.
//!
//! Queries are read-only and take no locks.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use uuid::Uuid;

use stockbook_core::reports::{
    InventoryReport, ReportError, ReportService, SalesReport, SoldLineRow, VariantStockRow,
};
use stockbook_core::sales::{SaleError, SaleLine, line_amounts, sale_totals};
use stockbook_shared::types::{CategoryId, VariantId};

use crate::entities::{
    categories, product_variants, products, sale_items, sales, sea_orm_active_enums::SaleStatus,
};

// Pricing only fails when an amount overflows.
fn sale_amount_overflow(_: SaleError) -> ReportError {
    ReportError::AmountOverflow("sale amount")
}

/// Product and variant names keyed by variant id.
type VariantNames = HashMap<Uuid, (String, String)>;

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stock levels and value of every active variant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidThreshold` for a negative threshold, or a database error.
    pub async fn inventory_report(
        &self,
        low_stock_threshold: i32,
    ) -> Result<InventoryReport, ReportError> {
        ReportService::validate_threshold(low_stock_threshold)?;

        let variants = product_variants::Entity::find()
            .filter(product_variants::Column::IsActive.eq(true))
            .order_by_asc(product_variants::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let products: HashMap<Uuid, products::Model> = products::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let categories: HashMap<Uuid, categories::Model> = categories::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let rows: Vec<VariantStockRow> = variants
            .into_iter()
            .filter_map(|variant| {
                let product = products.get(&variant.product_id)?;
                let category = categories.get(&product.category_id)?;
                Some(VariantStockRow {
                    variant_id: VariantId::from_uuid(variant.id),
                    product_name: product.name.clone(),
                    variant_name: variant.name,
                    category_id: CategoryId::from_uuid(category.id),
                    category_name: category.name.clone(),
                    category_active: category.is_active,
                    stock_quantity: variant.stock_quantity,
                    reorder_level: variant.reorder_level,
                    unit_price: variant.unit_price,
                })
            })
            .collect();

        ReportService::generate_inventory_report(rows, low_stock_threshold)
    }

    /// Completed sales between two dates, both inclusive (UTC days).
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `date_from` is after `date_to`, or a
    /// database error.
    pub async fn sales_report(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<SalesReport, ReportError> {
        ReportService::validate_date_range(date_from, date_to)?;

        let start = Utc
            .from_utc_datetime(&date_from.and_time(NaiveTime::MIN))
            .fixed_offset();
        let end = date_to
            .succ_opt()
            .map(|next| Utc.from_utc_datetime(&next.and_time(NaiveTime::MIN)).fixed_offset());

        let mut query = sales::Entity::find()
            .filter(sales::Column::Status.eq(SaleStatus::Completed))
            .filter(sales::Column::SaleDate.gte(start));
        if let Some(end) = end {
            query = query.filter(sales::Column::SaleDate.lt(end));
        }
        let completed = query
            .order_by_asc(sales::Column::SaleDate)
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        if completed.is_empty() {
            return ReportService::generate_sales_report(date_from, date_to, &[], Vec::new());
        }

        let items = sale_items::Entity::find()
            .filter(sale_items::Column::SaleId.is_in(completed.iter().map(|s| s.id)))
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let names = self.variant_names(&items).await?;

        let mut lines_by_sale: HashMap<Uuid, Vec<SaleLine>> = HashMap::new();
        let mut sold = Vec::with_capacity(items.len());
        for item in &items {
            let line = item.line();
            let amounts = line_amounts(&line).map_err(sale_amount_overflow)?;
            let (product_name, variant_name) =
                names.get(&item.variant_id).cloned().unwrap_or_default();
            sold.push(SoldLineRow {
                variant_id: line.variant_id,
                product_name,
                variant_name,
                quantity: line.quantity,
                line_total: amounts.total,
            });
            lines_by_sale.entry(item.sale_id).or_default().push(line);
        }

        let mut totals = Vec::with_capacity(completed.len());
        for sale in &completed {
            let lines = lines_by_sale.remove(&sale.id).unwrap_or_default();
            let sale_total =
                sale_totals(&lines, sale.delivery_required).map_err(sale_amount_overflow)?;
            totals.push(sale_total.total);
        }

        ReportService::generate_sales_report(date_from, date_to, &totals, sold)
    }

    async fn variant_names(
        &self,
        items: &[sale_items::Model],
    ) -> Result<VariantNames, ReportError> {
        let variants = product_variants::Entity::find()
            .filter(product_variants::Column::Id.is_in(items.iter().map(|i| i.variant_id)))
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let products: HashMap<Uuid, String> = products::Entity::find()
            .filter(products::Column::Id.is_in(variants.iter().map(|v| v.product_id)))
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        Ok(variants
            .into_iter()
            .map(|v| {
                let product_name = products.get(&v.product_id).cloned().unwrap_or_default();
                (v.id, (product_name, v.name))
            })
            .collect())
    }
}
