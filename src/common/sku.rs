// src/common/sku.rs

use chrono::{DateTime, Utc};

/// Gera um SKU legível no formato `{PREFIXO}-{CORPO}-{SUFIXO}`.
///
/// - Prefixo: 3 primeiros caracteres da categoria, maiúsculos, ou "GEN" sem categoria.
/// - Corpo: caracteres alfanuméricos dos 4 primeiros do nome, maiúsculos.
/// - Sufixo: token de hora (MMDDHHMM) para reduzir a chance de colisão.
///
/// O gerador NÃO garante unicidade: quem cria o produto confere o SKU contra o
/// banco e falha com `DuplicateSku` em caso de colisão, sem regenerar.
pub fn generate_sku(product_name: &str, category_name: &str) -> String {
    sku_at(product_name, category_name, Utc::now())
}

// Seam interno para os testes fixarem o relógio.
fn sku_at(product_name: &str, category_name: &str, when: DateTime<Utc>) -> String {
    let category_prefix = if category_name.is_empty() {
        "GEN".to_string()
    } else {
        category_name.chars().take(3).collect::<String>().to_uppercase()
    };

    // Primeiro recorta os 4 caracteres, depois descarta os não alfanuméricos.
    let product_prefix: String = product_name
        .chars()
        .take(4)
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_uppercase();

    let timestamp = when.format("%m%d%H%M");

    format!("{category_prefix}-{product_prefix}-{timestamp}")
}
