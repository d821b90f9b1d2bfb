//! Utilitários compartilhados pelos testes de integração: pool SQLite em
//! memória com o schema aplicado, serviços montados e oráculos de permissão
//! de mentira.

// Nem todo binário de teste usa todos os helpers.
#![allow(dead_code)]

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;

use stock_core::{
    db::{self, InventoryRepository, ReportRepository},
    models::{
        auth::{AccessPolicy, Capability, SessionContext},
        inventory::NewProduct,
    },
    services::{ReportService, StockService},
};

/// Pool com UMA conexão: cada conexão `sqlite::memory:` é um banco próprio,
/// então o banco do teste precisa viver em uma única conexão.
pub async fn setup_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("opções SQLite inválidas")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("falha ao abrir o banco em memória");

    db::init_schema(&pool).await.expect("falha ao aplicar o schema");
    pool
}

pub async fn setup_services() -> (StockService, ReportService, SqlitePool) {
    let pool = setup_pool().await;
    let stock = StockService::new(InventoryRepository::new(), pool.clone());
    let reports = ReportService::new(ReportRepository::new(pool.clone()));
    (stock, reports, pool)
}

// --- Oráculos de permissão de teste ---

/// Concede tudo (sessão de administrador).
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn has_permission(&self, _capability: Capability) -> bool {
        true
    }
    fn is_admin(&self) -> bool {
        true
    }
}

/// Nega tudo (sessão sem capacidades).
pub struct DenyAll;

impl AccessPolicy for DenyAll {
    fn has_permission(&self, _capability: Capability) -> bool {
        false
    }
    fn is_admin(&self) -> bool {
        false
    }
}

/// Só leitura: enxerga estoque e relatórios, não muta nada.
pub struct ViewOnly;

impl AccessPolicy for ViewOnly {
    fn has_permission(&self, capability: Capability) -> bool {
        matches!(capability, Capability::ViewStock | Capability::ViewReports)
    }
    fn is_admin(&self) -> bool {
        false
    }
}

pub const TEST_USER_ID: i64 = 7;

pub fn admin_ctx(policy: &AllowAll) -> SessionContext<'_> {
    SessionContext::new(policy, Some(TEST_USER_ID))
}

// --- Fixtures ---

pub fn new_product(name: &str, quantity: i64, unit_price: f64, min_stock_level: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        category_id: None,
        description: None,
        unit_price,
        initial_quantity: quantity,
        min_stock_level,
        supplier_id: None,
        sku: None,
    }
}

/// Soma líquida do livro-razão de um produto (entradas - saídas), direto no
/// banco — é contra isso que o invariante da quantidade é conferido.
pub async fn ledger_net(pool: &SqlitePool, product_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COALESCE(SUM(CASE WHEN movement_type = 'in' THEN quantity ELSE -quantity END), 0)
        FROM stock_movements
        WHERE product_id = ?
        "#,
    )
    .bind(product_id)
    .fetch_one(pool)
    .await
    .expect("falha ao somar o livro-razão")
}

pub async fn movement_count(pool: &SqlitePool, product_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stock_movements WHERE product_id = ?")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .expect("falha ao contar movimentações")
}
