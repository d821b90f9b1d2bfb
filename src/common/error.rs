use thiserror::Error;

use crate::models::auth::Capability;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// A camada de UI (colaborador externo) decide como apresentar cada variante;
// o contrato do núcleo é devolver uma falha tipada, nunca uma exceção genérica.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Quantidade inválida: {0}")]
    InvalidQuantity(i64),

    #[error("SKU já existe: {0}")]
    DuplicateSku(String),

    #[error("E-mail já cadastrado")]
    DuplicateEmail,

    #[error("Categoria já existe: {0}")]
    CategoryNameAlreadyExists(String),

    #[error("Registro não encontrado")]
    NotFound,

    #[error("Produto possui movimentações no histórico")]
    HasMovementHistory,

    #[error("Fornecedor possui produtos vinculados")]
    SupplierHasProducts,

    #[error("Permissão negada: é necessária a capacidade '{0}'")]
    PermissionDenied(Capability),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno")]
    InternalServerError(#[from] anyhow::Error),
}
