//! `SeaORM` Entity for sale_items table.
//!
//! The discount is stored in basis points (hundredths of a percent) so the
//! two-decimal percentage survives every backend exactly.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stockbook_core::sales::SaleLine;
use stockbook_shared::types::VariantId;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sale_id: Uuid,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub discount_basis_points: i32,
}

impl Model {
    /// Discount as a percentage with two decimal places.
    #[must_use]
    pub fn discount_percentage(&self) -> Decimal {
        Decimal::new(i64::from(self.discount_basis_points), 2)
    }

    /// Priced line for the sale services.
    #[must_use]
    pub fn line(&self) -> SaleLine {
        SaleLine {
            variant_id: VariantId::from_uuid(self.variant_id),
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_percentage: self.discount_percentage(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales::Entity",
        from = "Column::SaleId",
        to = "super::sales::Column::Id",
        on_delete = "Cascade"
    )]
    Sales,
    #[sea_orm(
        belongs_to = "super::product_variants::Entity",
        from = "Column::VariantId",
        to = "super::product_variants::Column::Id",
        on_delete = "Restrict"
    )]
    ProductVariants,
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl Related<super::product_variants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductVariants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
