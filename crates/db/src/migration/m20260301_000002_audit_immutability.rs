//! Append-only guards for the stock audit tables.
//!
//! PostgreSQL only: rejects UPDATE and DELETE on `stock_entries` and
//! `stock_movements`. Other backends rely on the repositories never issuing
//! those statements.

use sea_orm::DbBackend;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::Postgres {
            return Ok(());
        }
        let db = manager.get_connection();
        db.execute_unprepared(IMMUTABLE_AUDIT_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::Postgres {
            return Ok(());
        }
        let db = manager.get_connection();
        db.execute_unprepared(DROP_IMMUTABLE_AUDIT_SQL).await?;
        Ok(())
    }
}

const IMMUTABLE_AUDIT_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_audit_modification
-- Stock entries and movements are append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_audit_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION '% rows are immutable', TG_TABLE_NAME;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_stock_entries_immutable
BEFORE UPDATE OR DELETE ON stock_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_audit_modification();

CREATE TRIGGER trg_stock_movements_immutable
BEFORE UPDATE OR DELETE ON stock_movements
FOR EACH ROW
EXECUTE FUNCTION prevent_audit_modification();
";

const DROP_IMMUTABLE_AUDIT_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_stock_movements_immutable ON stock_movements;
DROP TRIGGER IF EXISTS trg_stock_entries_immutable ON stock_entries;
DROP FUNCTION IF EXISTS prevent_audit_modification();
";
