//! Database seeder for Stockbook development and testing.
//!
//! Migrates the configured database, then seeds a small furniture catalog,
//! opening stock, a partly delivered purchase order and a completed sale.
//! Every write goes through the repositories, so the seeded movement log
//! replays to the seeded counters.
//!
//! Usage: cargo run --bin seeder

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use stockbook_core::ledger::EntryType;
use stockbook_core::orders::{ItemDelivery, NewOrderLine};
use stockbook_core::sales::{NewSaleLine, PaymentMethod};
use stockbook_db::entities::{categories, sea_orm_active_enums::CategoryType};
use stockbook_db::migration::Migrator;
use stockbook_db::repositories::{
    CatalogRepository, CreateCategoryInput, CreateCustomerInput, CreateOrderInput,
    CreateProductInput, CreateSaleInput, CreateStockEntryInput, CreateSupplierInput,
    CreateVariantInput, OrderRepository, ReportRepository, SaleRepository, StockRepository,
};
use stockbook_shared::AppConfig;
use stockbook_shared::config::LoggingConfig;
use stockbook_shared::types::{
    CategoryId, CustomerId, OrderId, OrderItemId, ProductId, SaleId, SupplierId, UserId, VariantId,
};

/// Performer recorded on seeded rows (consistent for all seeds).
const SEED_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = stockbook_db::connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;

    if categories::Entity::find().count(&db).await? > 0 {
        info!("Catalog already seeded, skipping");
        return Ok(());
    }

    let user = UserId::from_uuid(SEED_USER_ID);
    let catalog = seed_catalog(&db).await?;
    seed_opening_stock(&db, &catalog, user).await?;
    seed_order(&db, &catalog, user).await?;
    seed_sale(&db, &catalog, user).await?;

    let report = ReportRepository::new(db.clone())
        .inventory_report(config.inventory.low_stock_threshold)
        .await?;
    info!(
        variants = report.total_variants,
        units = report.total_units,
        low_stock = report.low_stock.len(),
        "Seeding complete"
    );
    Ok(())
}

/// Ids of the seeded catalog.
struct SeededCatalog {
    supplier: SupplierId,
    customer: CustomerId,
    chair: VariantId,
    armchair: VariantId,
    table: VariantId,
    plank: VariantId,
}

async fn seed_catalog(db: &DatabaseConnection) -> Result<SeededCatalog> {
    let repo = CatalogRepository::new(db.clone());

    let furniture = repo
        .create_category(CreateCategoryInput {
            name: "Furniture".to_string(),
            category_type: CategoryType::Furniture,
            description: Some("Finished pieces".to_string()),
        })
        .await?;
    let wood = repo
        .create_category(CreateCategoryInput {
            name: "Wood".to_string(),
            category_type: CategoryType::Wood,
            description: Some("Raw timber".to_string()),
        })
        .await?;

    let supplier = repo
        .create_supplier(CreateSupplierInput {
            name: "Ashanti Timber".to_string(),
            contact_person: Some("Yaw Boateng".to_string()),
            email: Some("orders@ashanti-timber.example".to_string()),
            ..Default::default()
        })
        .await?;
    let supplier_id = SupplierId::from_uuid(supplier.id);

    let chair = repo
        .create_product(CreateProductInput {
            category_id: CategoryId::from_uuid(furniture.id),
            supplier_id: Some(supplier_id),
            name: "Dining Chair".to_string(),
            description: None,
        })
        .await?;
    let table = repo
        .create_product(CreateProductInput {
            category_id: CategoryId::from_uuid(furniture.id),
            supplier_id: Some(supplier_id),
            name: "Dining Table".to_string(),
            description: None,
        })
        .await?;
    let plank = repo
        .create_product(CreateProductInput {
            category_id: CategoryId::from_uuid(wood.id),
            supplier_id: Some(supplier_id),
            name: "Oak Plank".to_string(),
            description: Some("2m x 20cm".to_string()),
        })
        .await?;

    let variant = |product_id: Uuid, name: &str, unit_price: i64| CreateVariantInput {
        product_id: ProductId::from_uuid(product_id),
        name: name.to_string(),
        unit_price,
        reorder_level: None,
    };
    let chair_plain = repo.create_variant(variant(chair.id, "Plain", 1000)).await?;
    let chair_arms = repo.create_variant(variant(chair.id, "With arms", 1500)).await?;
    let table_six = repo.create_variant(variant(table.id, "Six seater", 12_000)).await?;
    let plank_raw = repo.create_variant(variant(plank.id, "Unfinished", 250)).await?;

    let customer = repo
        .create_customer(CreateCustomerInput {
            first_name: "Akosua".to_string(),
            last_name: "Owusu".to_string(),
            phone: Some("+233244000000".to_string()),
            ..Default::default()
        })
        .await?;

    info!("Seeded catalog");
    Ok(SeededCatalog {
        supplier: supplier_id,
        customer: CustomerId::from_uuid(customer.id),
        chair: VariantId::from_uuid(chair_plain.id),
        armchair: VariantId::from_uuid(chair_arms.id),
        table: VariantId::from_uuid(table_six.id),
        plank: VariantId::from_uuid(plank_raw.id),
    })
}

async fn seed_opening_stock(
    db: &DatabaseConnection,
    catalog: &SeededCatalog,
    user: UserId,
) -> Result<()> {
    let repo = StockRepository::new(db.clone());
    let opening = [
        (catalog.chair, 24, EntryType::Addition),
        (catalog.armchair, 6, EntryType::Addition),
        (catalog.table, 3, EntryType::Addition),
        (catalog.chair, 2, EntryType::Damage),
    ];

    for (variant_id, quantity, entry_type) in opening {
        repo.create_stock_entry(CreateStockEntryInput {
            variant_id,
            quantity,
            entry_type,
            notes: Some("Opening stock".to_string()),
            created_by: user,
        })
        .await?;
    }

    info!("Seeded opening stock");
    Ok(())
}

async fn seed_order(db: &DatabaseConnection, catalog: &SeededCatalog, user: UserId) -> Result<()> {
    let repo = OrderRepository::new(db.clone());
    let order = repo
        .create_order(CreateOrderInput {
            supplier_id: catalog.supplier,
            expected_delivery: None,
            notes: Some("Monthly timber".to_string()),
            created_by: user,
            items: vec![NewOrderLine {
                variant_id: catalog.plank,
                quantity: 100,
                unit_price: 180,
                notes: None,
            }],
        })
        .await?;

    let item = order
        .item_for(catalog.plank)
        .context("seeded order has no plank item")?;
    repo.record_delivery(
        OrderId::from_uuid(order.order.id),
        &[ItemDelivery {
            item_id: OrderItemId::from_uuid(item.id),
            quantity: 40,
        }],
        user,
    )
    .await?;

    info!("Seeded partly delivered order");
    Ok(())
}

async fn seed_sale(db: &DatabaseConnection, catalog: &SeededCatalog, user: UserId) -> Result<()> {
    let repo = SaleRepository::new(db.clone());
    let sale = repo
        .create_sale(CreateSaleInput {
            customer_id: catalog.customer,
            payment_method: PaymentMethod::MobileMoney,
            delivery_required: true,
            notes: None,
            created_by: user,
            items: vec![
                NewSaleLine {
                    variant_id: catalog.chair,
                    quantity: 6,
                    unit_price: None,
                    discount_percentage: Decimal::new(10, 0),
                },
                NewSaleLine {
                    variant_id: catalog.table,
                    quantity: 1,
                    unit_price: None,
                    discount_percentage: Decimal::ZERO,
                },
            ],
        })
        .await?;

    let completed = repo.complete(SaleId::from_uuid(sale.sale.id), user).await?;
    info!(total = completed.totals.total, "Seeded completed sale");
    Ok(())
}
