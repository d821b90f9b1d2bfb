// src/lib.rs

//! Núcleo do livro-razão de estoque: modelo de produtos/categorias/fornecedores,
//! movimentações append-only e consultas agregadas para relatórios.
//!
//! A interface gráfica, os relatórios e as ferramentas de exportação são
//! colaboradores externos: eles constroem um [`config::AppState`], instanciam
//! os serviços e invocam as operações passando um
//! [`models::auth::SessionContext`] com o usuário atuante.

pub mod common;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-exportações principais
pub use common::error::AppError;
pub use config::AppState;
pub use services::{ReportService, StockService};
