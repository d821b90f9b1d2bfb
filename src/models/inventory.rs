// src/models/inventory.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// --- 1. Categorias ---
// Categorias nunca são removidas pelo núcleo; produtos podem referenciá-las.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- 2. Fornecedores ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- 3. Produtos ---
// `quantity` é uma projeção materializada do livro de movimentações: em todo
// ponto observável ela é igual à soma líquida (entradas - saídas) das
// movimentações do produto. Só o motor de estoque escreve nesse campo, sempre
// junto com a movimentação correspondente, na mesma transação.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub sku: String,
    pub description: Option<String>,
    pub unit_price: f64,
    pub quantity: i64,
    pub min_stock_level: i64,
    pub supplier_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Status derivado, nunca armazenado.
    /// Estoque zerado é um subconjunto de estoque baixo (0 <= min_stock_level).
    pub fn status(&self) -> StockStatus {
        if self.quantity == 0 {
            StockStatus::OutOfStock
        } else if self.quantity <= self.min_stock_level {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// Déficit em relação ao nível mínimo; ordena a urgência dos alertas.
    pub fn shortage(&self) -> i64 {
        self.min_stock_level - self.quantity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

// --- 4. Movimentações de Estoque (livro-razão) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")] // Banco: 'in' / 'out'
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
}

/// Registro imutável do livro-razão. Nunca atualizado nem removido pelo núcleo:
/// toda variação de quantidade passa por um registro destes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Movimentação enriquecida com os dados do produto, para o feed de
/// atividade recente e o histórico por produto.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementEntry {
    pub id: i64,
    pub product_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub sku: String,
}

// --- 5. Entradas (DTOs validados na borda do serviço) ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, message = "O nome do produto é obrigatório"))]
    pub name: String,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "O preço unitário não pode ser negativo"))]
    pub unit_price: f64,
    #[validate(range(min = 0, message = "A quantidade inicial não pode ser negativa"))]
    pub initial_quantity: i64,
    #[validate(range(min = 0, message = "O nível mínimo não pode ser negativo"))]
    pub min_stock_level: i64,
    pub supplier_id: Option<i64>,
    /// Quando ausente, o SKU é gerado a partir do nome + categoria.
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[validate(length(min = 1, message = "O nome da categoria é obrigatório"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    #[validate(length(min = 1, message = "O nome do fornecedor é obrigatório"))]
    pub name: String,
    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Atualização parcial de produto: só os campos listados aqui são mutáveis por
/// esse caminho. `quantity` fica de fora de propósito — quantidade só muda via
/// ajuste de estoque, que registra a movimentação correspondente.
/// `None` significa "não alterar".
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[validate(length(min = 1, message = "O nome do produto é obrigatório"))]
    pub name: Option<String>,
    pub category_id: Option<i64>,
    #[validate(length(min = 1, message = "O SKU não pode ser vazio"))]
    pub sku: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "O preço unitário não pode ser negativo"))]
    pub unit_price: Option<f64>,
    #[validate(range(min = 0, message = "O nível mínimo não pode ser negativo"))]
    pub min_stock_level: Option<i64>,
    pub supplier_id: Option<i64>,
}

/// Atualização parcial de fornecedor. `None` significa "não alterar".
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupplierUpdate {
    #[validate(length(min = 1, message = "O nome do fornecedor é obrigatório"))]
    pub name: Option<String>,
    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl SupplierUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category_id.is_none()
            && self.sku.is_none()
            && self.description.is_none()
            && self.unit_price.is_none()
            && self.min_stock_level.is_none()
            && self.supplier_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: i64, min_stock_level: i64) -> Product {
        Product {
            id: 1,
            name: "Teste".into(),
            category_id: None,
            sku: "GEN-TEST-01010101".into(),
            description: None,
            unit_price: 1.0,
            quantity,
            min_stock_level,
            supplier_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn status_zero_quantity_is_out_of_stock_even_with_min_zero() {
        assert_eq!(product(0, 0).status(), StockStatus::OutOfStock);
        assert_eq!(product(0, 5).status(), StockStatus::OutOfStock);
    }

    #[test]
    fn status_at_or_below_min_is_low_stock() {
        assert_eq!(product(5, 5).status(), StockStatus::LowStock);
        assert_eq!(product(6, 5).status(), StockStatus::InStock);
        assert_eq!(product(10, 0).status(), StockStatus::InStock);
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(ProductUpdate::default().is_empty());
        let upd = ProductUpdate {
            unit_price: Some(9.9),
            ..Default::default()
        };
        assert!(!upd.is_empty());
    }
}
