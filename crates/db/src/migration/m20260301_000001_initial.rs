//! Initial database migration.
//!
//! Creates the catalog, stock ledger, purchase order and sales tables with
//! the schema builder so the same migration runs on PostgreSQL and SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: CATALOG
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Categories::Name).string_len(100).not_null().unique_key())
                    .col(ColumnDef::new(Categories::CategoryType).string_len(20).not_null())
                    .col(ColumnDef::new(Categories::Description).text())
                    .col(ColumnDef::new(Categories::IsActive).boolean().not_null().default(true))
                    .col(timestamp(Categories::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Suppliers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Suppliers::Name).string_len(100).not_null().unique_key())
                    .col(ColumnDef::new(Suppliers::ContactPerson).string_len(100))
                    .col(ColumnDef::new(Suppliers::Email).string_len(254))
                    .col(ColumnDef::new(Suppliers::Phone).string_len(20))
                    .col(ColumnDef::new(Suppliers::Address).text())
                    .col(ColumnDef::new(Suppliers::IsActive).boolean().not_null().default(true))
                    .col(timestamp(Suppliers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Products::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Products::SupplierId).uuid())
                    .col(ColumnDef::new(Products::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Products::Description).text())
                    .col(ColumnDef::new(Products::IsActive).boolean().not_null().default(true))
                    .col(timestamp(Products::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Products::Table, Products::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .index(
                        Index::create()
                            .name("uq_products_category_name")
                            .col(Products::CategoryId)
                            .col(Products::Name)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductVariants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductVariants::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ProductVariants::ProductId).uuid().not_null())
                    .col(ColumnDef::new(ProductVariants::Name).string_len(100).not_null())
                    .col(ColumnDef::new(ProductVariants::UnitPrice).big_integer().not_null())
                    .col(
                        ColumnDef::new(ProductVariants::StockQuantity)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(ProductVariants::StockQuantity).gte(0)),
                    )
                    .col(
                        ColumnDef::new(ProductVariants::ReorderLevel)
                            .integer()
                            .not_null()
                            .default(5)
                            .check(Expr::col(ProductVariants::ReorderLevel).gte(0)),
                    )
                    .col(
                        ColumnDef::new(ProductVariants::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(ProductVariants::CreatedAt))
                    .col(timestamp(ProductVariants::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(ProductVariants::Table, ProductVariants::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("uq_product_variants_product_name")
                            .col(ProductVariants::ProductId)
                            .col(ProductVariants::Name)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Customers::FirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Customers::LastName).string_len(50).not_null())
                    .col(ColumnDef::new(Customers::Email).string_len(254))
                    .col(ColumnDef::new(Customers::Phone).string_len(15))
                    .col(ColumnDef::new(Customers::Address).text())
                    .col(ColumnDef::new(Customers::IsActive).boolean().not_null().default(true))
                    .col(timestamp(Customers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: STOCK LEDGER
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(StockEntries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StockEntries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(StockEntries::VariantId).uuid().not_null())
                    .col(
                        ColumnDef::new(StockEntries::Quantity)
                            .integer()
                            .not_null()
                            .check(Expr::col(StockEntries::Quantity).ne(0)),
                    )
                    .col(ColumnDef::new(StockEntries::EntryType).string_len(20).not_null())
                    .col(ColumnDef::new(StockEntries::Notes).text())
                    .col(ColumnDef::new(StockEntries::CreatedBy).uuid().not_null())
                    .col(timestamp(StockEntries::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(StockEntries::Table, StockEntries::VariantId)
                            .to(ProductVariants::Table, ProductVariants::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StockMovements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StockMovements::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(StockMovements::VariantId).uuid().not_null())
                    .col(ColumnDef::new(StockMovements::MovementType).string_len(20).not_null())
                    .col(ColumnDef::new(StockMovements::Quantity).integer().not_null())
                    .col(ColumnDef::new(StockMovements::PreviousStock).integer().not_null())
                    .col(
                        ColumnDef::new(StockMovements::NewStock)
                            .integer()
                            .not_null()
                            .check(Expr::col(StockMovements::NewStock).gte(0)),
                    )
                    .col(ColumnDef::new(StockMovements::ReferenceId).string_len(100).not_null())
                    .col(ColumnDef::new(StockMovements::PerformedBy).uuid().not_null())
                    .col(ColumnDef::new(StockMovements::Notes).text())
                    .col(timestamp(StockMovements::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(StockMovements::Table, StockMovements::VariantId)
                            .to(ProductVariants::Table, ProductVariants::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stock_movements_variant_created")
                    .table(StockMovements::Table)
                    .col(StockMovements::VariantId)
                    .col(StockMovements::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: PURCHASE ORDERS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Orders::SupplierId).uuid().not_null())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(timestamp(Orders::OrderDate))
                    .col(ColumnDef::new(Orders::ExpectedDelivery).date())
                    .col(ColumnDef::new(Orders::ReceivedDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Orders::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(Orders::ReceivedBy).uuid())
                    .col(ColumnDef::new(Orders::Notes).text())
                    .col(timestamp(Orders::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Orders::Table, Orders::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OrderItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                    .col(ColumnDef::new(OrderItems::VariantId).uuid().not_null())
                    .col(
                        ColumnDef::new(OrderItems::Quantity)
                            .integer()
                            .not_null()
                            .check(Expr::col(OrderItems::Quantity).gte(1)),
                    )
                    .col(
                        ColumnDef::new(OrderItems::DeliveredQuantity)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(
                                Expr::col(OrderItems::DeliveredQuantity)
                                    .gte(0)
                                    .and(
                                        Expr::col(OrderItems::DeliveredQuantity)
                                            .lte(Expr::col(OrderItems::Quantity)),
                                    ),
                            ),
                    )
                    .col(ColumnDef::new(OrderItems::UnitPrice).big_integer().not_null())
                    .col(
                        ColumnDef::new(OrderItems::IsDelivered)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(OrderItems::Notes).text())
                    .foreign_key(
                        ForeignKey::create()
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OrderItems::Table, OrderItems::VariantId)
                            .to(ProductVariants::Table, ProductVariants::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 4: SALES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sales::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sales::CustomerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Sales::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Sales::PaymentMethod)
                            .string_len(20)
                            .not_null()
                            .default("CASH"),
                    )
                    .col(
                        ColumnDef::new(Sales::DeliveryRequired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Sales::DeliveryFee)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Sales::DeliveryFee).gte(0)),
                    )
                    .col(ColumnDef::new(Sales::Notes).text())
                    .col(ColumnDef::new(Sales::CreatedBy).uuid().not_null())
                    .col(timestamp(Sales::SaleDate))
                    .col(timestamp(Sales::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Sales::Table, Sales::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SaleItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SaleItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SaleItems::SaleId).uuid().not_null())
                    .col(ColumnDef::new(SaleItems::VariantId).uuid().not_null())
                    .col(
                        ColumnDef::new(SaleItems::Quantity)
                            .integer()
                            .not_null()
                            .check(Expr::col(SaleItems::Quantity).gte(1)),
                    )
                    .col(
                        ColumnDef::new(SaleItems::UnitPrice)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(SaleItems::UnitPrice).gte(1)),
                    )
                    .col(
                        ColumnDef::new(SaleItems::DiscountBasisPoints)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(
                                Expr::col(SaleItems::DiscountBasisPoints)
                                    .gte(0)
                                    .and(Expr::col(SaleItems::DiscountBasisPoints).lt(10_000)),
                            ),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SaleItems::Table, SaleItems::SaleId)
                            .to(Sales::Table, Sales::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SaleItems::Table, SaleItems::VariantId)
                            .to(ProductVariants::Table, ProductVariants::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            SaleItems::Table.into_iden(),
            Sales::Table.into_iden(),
            OrderItems::Table.into_iden(),
            Orders::Table.into_iden(),
            StockMovements::Table.into_iden(),
            StockEntries::Table.into_iden(),
            Customers::Table.into_iden(),
            ProductVariants::Table.into_iden(),
            Products::Table.into_iden(),
            Suppliers::Table.into_iden(),
            Categories::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    CategoryType,
    Description,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Suppliers {
    Table,
    Id,
    Name,
    ContactPerson,
    Email,
    Phone,
    Address,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    CategoryId,
    SupplierId,
    Name,
    Description,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProductVariants {
    Table,
    Id,
    ProductId,
    Name,
    UnitPrice,
    StockQuantity,
    ReorderLevel,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StockEntries {
    Table,
    Id,
    VariantId,
    Quantity,
    EntryType,
    Notes,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StockMovements {
    Table,
    Id,
    VariantId,
    MovementType,
    Quantity,
    PreviousStock,
    NewStock,
    ReferenceId,
    PerformedBy,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    SupplierId,
    Status,
    OrderDate,
    ExpectedDelivery,
    ReceivedDate,
    CreatedBy,
    ReceivedBy,
    Notes,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    VariantId,
    Quantity,
    DeliveredQuantity,
    UnitPrice,
    IsDelivered,
    Notes,
}

#[derive(DeriveIden)]
enum Sales {
    Table,
    Id,
    CustomerId,
    Status,
    PaymentMethod,
    DeliveryRequired,
    DeliveryFee,
    Notes,
    CreatedBy,
    SaleDate,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SaleItems {
    Table,
    Id,
    SaleId,
    VariantId,
    Quantity,
    UnitPrice,
    DiscountBasisPoints,
}
