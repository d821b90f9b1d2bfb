// src/models/reports.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Tipos de resultado da camada de agregação. Tudo aqui é calculado na leitura,
// nunca cacheado: cada consulta reflete o último estado commitado.

/// Resumo geral do estoque (painel principal).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockStatistics {
    pub total_products: i64,
    pub total_quantity: i64,
    /// Σ quantidade × preço unitário.
    pub total_stock_value: f64,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
}

/// Linha do relatório de valorização, ordenado por valor total decrescente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ValuationEntry {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub category_name: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_value: f64,
}

/// Quebra por categoria: contagem, quantidades e faixa de preços.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category_name: String,
    pub product_count: i64,
    pub total_quantity: i64,
    pub total_value: f64,
    pub avg_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Quebra por fornecedor, com o contato para facilitar a reposição.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SupplierBreakdown {
    pub supplier_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub product_count: i64,
    pub total_quantity: i64,
    pub total_value: f64,
    pub avg_price: Option<f64>,
}

/// Resumo de movimentações em uma janela retroativa de dias.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementSummary {
    pub period_days: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub movements_in: i64,
    pub movements_out: i64,
    pub total_quantity_in: i64,
    pub total_quantity_out: i64,
    /// total_quantity_in - total_quantity_out.
    pub net_movement: i64,
}

/// Item do relatório de alerta de estoque baixo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LowStockAlert {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub category_name: Option<String>,
    pub supplier_name: Option<String>,
    pub quantity: i64,
    pub min_stock_level: i64,
    /// min_stock_level - quantity.
    pub shortage: i64,
}

/// Relatório de alertas: críticos (estoque zerado) antes dos avisos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockReport {
    pub total_alerts: i64,
    pub critical: Vec<LowStockAlert>,
    pub warning: Vec<LowStockAlert>,
}
