pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;

use sqlx::SqlitePool;

use crate::common::error::AppError;

const SCHEMA: &str = include_str!("schema.sql");

/// Aplica o schema embutido. Idempotente (CREATE IF NOT EXISTS), roda a cada
/// inicialização — o equivalente local de uma migração única.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
