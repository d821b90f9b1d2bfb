// src/config.rs

use crate::{
    db::{self, InventoryRepository, ReportRepository},
    services::{ReportService, StockService},
};
use anyhow::Context;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{env, str::FromStr, time::Duration};

const DEFAULT_DATABASE_URL: &str = "sqlite://stock.db";

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub stock_service: StockService,
    pub report_service: ReportService,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, o host decide o que fazer.
    pub async fn new() -> anyhow::Result<Self> {
        // O .env é opcional em uma instalação desktop; sem ele, usamos o banco local padrão.
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        Self::with_database_url(&database_url).await
    }

    /// Monta o estado apontando para um banco específico (também usado nos testes).
    pub async fn with_database_url(database_url: &str) -> anyhow::Result<Self> {
        // Chaves estrangeiras no SQLite são opt-in, por conexão.
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("DATABASE_URL inválida: {database_url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await
            .context("falha ao abrir a pool SQLite")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        db::init_schema(&db_pool)
            .await
            .context("falha ao inicializar o schema do banco de dados")?;

        // --- Monta o gráfico de dependências ---
        let inventory_repo = InventoryRepository::new();
        let report_repo = ReportRepository::new(db_pool.clone());
        let stock_service = StockService::new(inventory_repo, db_pool.clone());
        let report_service = ReportService::new(report_repo);

        Ok(Self {
            db_pool,
            stock_service,
            report_service,
        })
    }
}

/// Inicializa o logger global. Deve ser chamado uma única vez pelo binário host.
pub fn init_tracing() {
    tracing_subscriber::fmt().with_target(false).compact().init();
}
