//! `SeaORM` Entity for stock_movements table.
//!
//! Append-only audit log of every counter change.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stockbook_core::ledger::StockChange;

use super::sea_orm_active_enums::MovementType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub variant_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub reference_id: String,
    pub performed_by: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Counter snapshot recorded by this movement.
    #[must_use]
    pub fn change(&self) -> StockChange {
        StockChange {
            previous_stock: self.previous_stock,
            quantity: self.quantity,
            new_stock: self.new_stock,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product_variants::Entity",
        from = "Column::VariantId",
        to = "super::product_variants::Column::Id"
    )]
    ProductVariants,
}

impl Related<super::product_variants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductVariants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
