// src/db/report_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Acquire, Executor, FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    models::reports::{
        CategoryBreakdown, LowStockAlert, StockStatistics, SupplierBreakdown, ValuationEntry,
    },
};

/// Totais brutos da janela de movimentações; o serviço monta o resumo final.
#[derive(Debug, FromRow)]
pub(crate) struct MovementTotals {
    pub movements_in: i64,
    pub movements_out: i64,
    pub total_quantity_in: i64,
    pub total_quantity_out: i64,
}

// Camada de agregação: somente leitura, sempre calculada na hora da consulta.
#[derive(Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // 1. Resumo Geral
    pub async fn get_statistics<'e, E>(&self, executor: E) -> Result<StockStatistics, AppError>
    where
        E: Executor<'e, Database = Sqlite> + Acquire<'e, Database = Sqlite>,
    {
        // Uma transação = um snapshot consistente dos números do painel.
        let mut tx = executor.begin().await?;

        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await?;

        let total_quantity: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM products")
                .fetch_one(&mut *tx)
                .await?;

        let total_stock_value: f64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(quantity * unit_price), 0.0) FROM products")
                .fetch_one(&mut *tx)
                .await?;

        let low_stock_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE quantity <= min_stock_level",
        )
        .fetch_one(&mut *tx)
        .await?;

        let out_of_stock_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE quantity = 0")
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(StockStatistics {
            total_products,
            total_quantity,
            total_stock_value,
            low_stock_count,
            out_of_stock_count,
        })
    }

    // 2. Valorização do estoque, maiores valores primeiro
    pub async fn get_valuation<'e, E>(&self, executor: E) -> Result<Vec<ValuationEntry>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let entries = sqlx::query_as::<_, ValuationEntry>(
            r#"
            SELECT p.id, p.name, p.sku, c.name AS category_name,
                   p.quantity, p.unit_price,
                   (p.quantity * p.unit_price) AS total_value
            FROM products p
            LEFT JOIN categories c ON p.category_id = c.id
            ORDER BY total_value DESC, p.name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(entries)
    }

    // 3. Quebra por categoria
    pub async fn get_category_breakdown<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<CategoryBreakdown>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, CategoryBreakdown>(
            r#"
            SELECT c.name AS category_name,
                   COUNT(p.id) AS product_count,
                   COALESCE(SUM(p.quantity), 0) AS total_quantity,
                   COALESCE(SUM(p.quantity * p.unit_price), 0.0) AS total_value,
                   AVG(p.unit_price) AS avg_price,
                   MIN(p.unit_price) AS min_price,
                   MAX(p.unit_price) AS max_price
            FROM categories c
            LEFT JOIN products p ON c.id = p.category_id
            GROUP BY c.id, c.name
            ORDER BY total_value DESC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // 4. Quebra por fornecedor (com contato, para facilitar a reposição)
    pub async fn get_supplier_breakdown<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<SupplierBreakdown>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, SupplierBreakdown>(
            r#"
            SELECT s.name AS supplier_name,
                   s.email, s.phone,
                   COUNT(p.id) AS product_count,
                   COALESCE(SUM(p.quantity), 0) AS total_quantity,
                   COALESCE(SUM(p.quantity * p.unit_price), 0.0) AS total_value,
                   AVG(p.unit_price) AS avg_price
            FROM suppliers s
            LEFT JOIN products p ON s.id = p.supplier_id
            GROUP BY s.id, s.name, s.email, s.phone
            ORDER BY total_value DESC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // 5. Totais de movimentação na janela retroativa
    pub(crate) async fn get_movement_totals<'e, E>(
        &self,
        executor: E,
        cutoff: DateTime<Utc>,
        product_id: Option<i64>,
    ) -> Result<MovementTotals, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN movement_type = 'in' THEN 1 ELSE 0 END), 0) AS movements_in,
                COALESCE(SUM(CASE WHEN movement_type = 'out' THEN 1 ELSE 0 END), 0) AS movements_out,
                COALESCE(SUM(CASE WHEN movement_type = 'in' THEN quantity ELSE 0 END), 0) AS total_quantity_in,
                COALESCE(SUM(CASE WHEN movement_type = 'out' THEN quantity ELSE 0 END), 0) AS total_quantity_out
            FROM stock_movements
            WHERE created_at >= "#,
        );
        qb.push_bind(cutoff);
        if let Some(pid) = product_id {
            qb.push(" AND product_id = ").push_bind(pid);
        }

        let totals = qb
            .build_query_as::<MovementTotals>()
            .fetch_one(executor)
            .await?;
        Ok(totals)
    }

    // 6. Alertas de estoque baixo, mais deficitários primeiro
    pub async fn get_low_stock_alerts<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<LowStockAlert>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let alerts = sqlx::query_as::<_, LowStockAlert>(
            r#"
            SELECT p.id, p.name, p.sku,
                   c.name AS category_name,
                   s.name AS supplier_name,
                   p.quantity, p.min_stock_level,
                   (p.min_stock_level - p.quantity) AS shortage
            FROM products p
            LEFT JOIN categories c ON p.category_id = c.id
            LEFT JOIN suppliers s ON p.supplier_id = s.id
            WHERE p.quantity <= p.min_stock_level
            ORDER BY shortage DESC, p.name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(alerts)
    }
}
