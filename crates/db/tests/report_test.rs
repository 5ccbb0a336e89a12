//! Report integration tests.

mod common;

use chrono::{Days, Utc};
use sea_orm::{ActiveModelTrait, Set};

use stockbook_core::reports::{DEFAULT_LOW_STOCK_THRESHOLD, ReportError};
use stockbook_db::entities::sale_items;
use stockbook_shared::types::SaleId;

use common::{line, setup};

#[tokio::test]
async fn test_inventory_report_over_active_variants() {
    let fx = setup().await;
    let full = fx.stocked_variant("Full", 100, 50).await;
    let low = fx.stocked_variant("Low", 200, 3).await;
    let empty = fx.variant("Empty", 300).await;
    let retired = fx.stocked_variant("Retired", 1000, 1).await;
    fx.catalog.set_variant_active(retired, false).await.unwrap();

    let report = fx
        .reports
        .inventory_report(DEFAULT_LOW_STOCK_THRESHOLD)
        .await
        .unwrap();

    assert_eq!(report.total_variants, 3);
    assert_eq!(report.total_units, 53);
    assert_eq!(report.total_value, 50 * 100 + 3 * 200);

    let low_ids: Vec<_> = report.low_stock.iter().map(|r| r.variant_id).collect();
    assert_eq!(low_ids, vec![empty, low]);
    assert_eq!(report.out_of_stock.len(), 1);
    assert_eq!(report.out_of_stock[0].variant_id, empty);
    assert!(!low_ids.contains(&full));

    assert_eq!(report.by_category.len(), 1);
    assert_eq!(report.by_category[0].variant_count, 3);
    assert_eq!(report.by_category[0].units, 53);
}

#[tokio::test]
async fn test_inventory_report_rejects_negative_threshold() {
    let fx = setup().await;
    let err = fx.reports.inventory_report(-1).await.unwrap_err();
    assert_eq!(err, ReportError::InvalidThreshold(-1));
}

#[tokio::test]
async fn test_sales_report_counts_completed_sales_only() {
    let fx = setup().await;
    let chair = fx.stocked_variant("Chair", 1000, 20).await;
    let table = fx.stocked_variant("Table", 4000, 5).await;

    let first = fx
        .sales
        .create_sale(fx.sale_input(false, vec![line(chair, 3)]))
        .await
        .unwrap();
    let second = fx
        .sales
        .create_sale(fx.sale_input(true, vec![line(chair, 1), line(table, 1)]))
        .await
        .unwrap();
    fx.sales
        .create_sale(fx.sale_input(false, vec![line(table, 2)]))
        .await
        .unwrap();

    for sale in [&first, &second] {
        fx.sales
            .complete(SaleId::from_uuid(sale.sale.id), fx.user)
            .await
            .unwrap();
    }

    let today = Utc::now().date_naive();
    let report = fx
        .reports
        .sales_report(today - Days::new(1), today + Days::new(1))
        .await
        .unwrap();

    assert_eq!(report.sale_count, 2);
    assert_eq!(report.revenue, 3000 + 5250);
    assert_eq!(report.average_sale, 4125);
    assert_eq!(report.top_products.len(), 2);
    assert_eq!(report.top_products[0].variant_id, chair);
    assert_eq!(report.top_products[0].quantity_sold, 4);
    assert_eq!(report.top_products[1].variant_id, table);

    let earlier = fx
        .reports
        .sales_report(today - Days::new(10), today - Days::new(5))
        .await
        .unwrap();
    assert_eq!(earlier.sale_count, 0);
    assert_eq!(earlier.average_sale, 0);
}

#[tokio::test]
async fn test_sales_report_rejects_inverted_range() {
    let fx = setup().await;
    let today = Utc::now().date_naive();
    let tomorrow = today + Days::new(1);

    let err = fx.reports.sales_report(tomorrow, today).await.unwrap_err();
    assert_eq!(
        err,
        ReportError::InvalidDateRange {
            start: tomorrow,
            end: today,
        }
    );
}

#[tokio::test]
async fn test_inventory_value_overflow_is_reported() {
    let fx = setup().await;
    fx.stocked_variant("Gilded throne", i64::MAX, 2).await;

    let err = fx
        .reports
        .inventory_report(DEFAULT_LOW_STOCK_THRESHOLD)
        .await
        .unwrap_err();
    assert_eq!(err, ReportError::AmountOverflow("stock value"));
}

#[tokio::test]
async fn test_sale_amount_overflow_is_not_a_database_error() {
    let fx = setup().await;
    let variant = fx.stocked_variant("Crown", 1000, 5).await;
    let sale = fx
        .sales
        .create_sale(fx.sale_input(false, vec![line(variant, 2)]))
        .await
        .unwrap();
    fx.sales
        .complete(SaleId::from_uuid(sale.sale.id), fx.user)
        .await
        .unwrap();

    let mut item: sale_items::ActiveModel = sale.items[0].clone().into();
    item.unit_price = Set(i64::MAX);
    item.update(&fx.db).await.unwrap();

    let today = Utc::now().date_naive();
    let err = fx
        .reports
        .sales_report(today - Days::new(1), today + Days::new(1))
        .await
        .unwrap_err();
    assert_eq!(err, ReportError::AmountOverflow("sale amount"));
    assert_eq!(err.error_code(), "AMOUNT_OVERFLOW");
}
