// src/models/auth.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::error::AppError;

/// Capacidades referenciadas pelo núcleo de estoque.
///
/// Quem concede (ou nega) cada capacidade é o oráculo de autorização da
/// aplicação host; o núcleo apenas consulta antes de executar a operação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    AddStock,
    EditStock,
    DeleteStock,
    ViewStock,
    ViewReports,
}

impl Capability {
    pub fn slug(&self) -> &'static str {
        match self {
            Capability::AddStock => "add_stock",
            Capability::EditStock => "edit_stock",
            Capability::DeleteStock => "delete_stock",
            Capability::ViewStock => "view_stock",
            Capability::ViewReports => "view_reports",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// O oráculo de autorização, implementado pela camada de login/sessão da
/// aplicação (fora deste núcleo).
pub trait AccessPolicy: Send + Sync {
    fn has_permission(&self, capability: Capability) -> bool;
    fn is_admin(&self) -> bool;
}

/// Contexto do usuário atuante, passado explicitamente em cada chamada de
/// serviço. Substitui o "usuário corrente" global: nada de estado ambiente.
#[derive(Clone, Copy)]
pub struct SessionContext<'a> {
    /// Id do usuário, carimbado no `user_id` das movimentações. `None` para
    /// processos sem usuário (ex.: rotinas de manutenção autorizadas).
    pub user_id: Option<i64>,
    policy: &'a dyn AccessPolicy,
}

impl<'a> SessionContext<'a> {
    pub fn new(policy: &'a dyn AccessPolicy, user_id: Option<i64>) -> Self {
        Self { user_id, policy }
    }

    pub fn has_permission(&self, capability: Capability) -> bool {
        self.policy.has_permission(capability)
    }

    pub fn is_admin(&self) -> bool {
        self.policy.is_admin()
    }

    /// Verificação de permissão na entrada de cada operação. Roda ANTES de
    /// qualquer validação ou leitura, para não vazar existência de registros
    /// a quem não tem acesso.
    pub fn ensure(&self, capability: Capability) -> Result<(), AppError> {
        if self.policy.has_permission(capability) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(capability))
        }
    }
}
