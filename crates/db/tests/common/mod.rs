//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use stockbook_core::ledger::EntryType;
use stockbook_core::sales::{NewSaleLine, PaymentMethod};
use stockbook_db::entities::sea_orm_active_enums::CategoryType;
use stockbook_db::migration::Migrator;
use stockbook_db::repositories::{
    CatalogRepository, CreateCategoryInput, CreateCustomerInput, CreateProductInput,
    CreateSaleInput, CreateStockEntryInput, CreateSupplierInput, CreateVariantInput,
    OrderRepository, ReportRepository, SaleRepository, StockRepository,
};
use stockbook_shared::types::{CustomerId, ProductId, SupplierId, UserId, VariantId};

/// Repositories plus a minimal catalog to hang variants on.
pub struct Fixture {
    pub db: DatabaseConnection,
    pub catalog: CatalogRepository,
    pub stock: StockRepository,
    pub orders: OrderRepository,
    pub sales: SaleRepository,
    pub reports: ReportRepository,
    pub user: UserId,
    pub supplier: SupplierId,
    pub customer: CustomerId,
    pub product: ProductId,
}

/// Fresh in-memory SQLite database migrated with the real migrator.
///
/// A single pooled connection keeps the in-memory database alive for the
/// whole test.
pub async fn sqlite() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("in-memory sqlite should connect");
    Migrator::up(&db, None).await.expect("migrations should apply");
    db
}

/// Fixture on a fresh SQLite database.
pub async fn setup() -> Fixture {
    Fixture::on(sqlite().await).await
}

impl Fixture {
    /// Builds the fixture on an already migrated database.
    ///
    /// Names carry a random suffix so the fixture can be created repeatedly
    /// against a shared database.
    pub async fn on(db: DatabaseConnection) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        let catalog = CatalogRepository::new(db.clone());

        let category = catalog
            .create_category(CreateCategoryInput {
                name: format!("Furniture {suffix}"),
                category_type: CategoryType::Furniture,
                description: None,
            })
            .await
            .expect("category");
        let supplier = catalog
            .create_supplier(CreateSupplierInput {
                name: format!("Timber Co {suffix}"),
                contact_person: Some("Ama".to_string()),
                ..Default::default()
            })
            .await
            .expect("supplier");
        let product = catalog
            .create_product(CreateProductInput {
                category_id: stockbook_shared::types::CategoryId::from_uuid(category.id),
                supplier_id: Some(SupplierId::from_uuid(supplier.id)),
                name: format!("Dining Chair {suffix}"),
                description: None,
            })
            .await
            .expect("product");
        let customer = catalog
            .create_customer(CreateCustomerInput {
                first_name: "Kofi".to_string(),
                last_name: "Mensah".to_string(),
                phone: Some("+233200000000".to_string()),
                ..Default::default()
            })
            .await
            .expect("customer");

        Self {
            catalog,
            stock: StockRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            sales: SaleRepository::new(db.clone()),
            reports: ReportRepository::new(db.clone()),
            db,
            user: UserId::new(),
            supplier: SupplierId::from_uuid(supplier.id),
            customer: CustomerId::from_uuid(customer.id),
            product: ProductId::from_uuid(product.id),
        }
    }

    /// Creates a variant with zero stock.
    pub async fn variant(&self, name: &str, unit_price: i64) -> VariantId {
        let variant = self
            .catalog
            .create_variant(CreateVariantInput {
                product_id: self.product,
                name: name.to_string(),
                unit_price,
                reorder_level: None,
            })
            .await
            .expect("variant");
        VariantId::from_uuid(variant.id)
    }

    /// Creates a variant and books `quantity` units in with an ADDITION entry.
    pub async fn stocked_variant(&self, name: &str, unit_price: i64, quantity: i32) -> VariantId {
        let variant_id = self.variant(name, unit_price).await;
        if quantity != 0 {
            self.entry(variant_id, quantity, EntryType::Addition).await;
        }
        variant_id
    }

    /// Records a stock entry, panicking on rejection.
    pub async fn entry(&self, variant_id: VariantId, quantity: i32, entry_type: EntryType) {
        self.stock
            .create_stock_entry(CreateStockEntryInput {
                variant_id,
                quantity,
                entry_type,
                notes: None,
                created_by: self.user,
            })
            .await
            .expect("stock entry");
    }

    /// Current counter of a variant.
    pub async fn stock_of(&self, variant_id: VariantId) -> i32 {
        self.catalog
            .get_variant(variant_id)
            .await
            .expect("variant exists")
            .stock_quantity
    }

    /// Sale input for this fixture's customer.
    pub fn sale_input(&self, delivery_required: bool, items: Vec<NewSaleLine>) -> CreateSaleInput {
        CreateSaleInput {
            customer_id: self.customer,
            payment_method: PaymentMethod::Cash,
            delivery_required,
            notes: None,
            created_by: self.user,
            items,
        }
    }
}

/// Sale line at the variant's list price without discount.
pub fn line(variant_id: VariantId, quantity: i32) -> NewSaleLine {
    NewSaleLine {
        variant_id,
        quantity,
        unit_price: None,
        discount_percentage: rust_decimal::Decimal::ZERO,
    }
}
