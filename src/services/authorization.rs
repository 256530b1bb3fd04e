// src/services/authorization.rs

use async_trait::async_trait;
use std::sync::Arc;

use crate::common::error::{AppError, IdentityError};

/// O colaborador externo que sabe quais papéis um sujeito possui.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn roles_of(&self, subject_id: &str) -> Result<Vec<String>, IdentityError>;
}

/// Decide se um sujeito pode ler dados administrativos.
#[derive(Clone)]
pub struct AuthorizationGate {
    identity: Arc<dyn IdentityProvider>,
    admin_role: String,
}

impl AuthorizationGate {
    pub fn new(identity: Arc<dyn IdentityProvider>, admin_role: impl Into<String>) -> Self {
        Self { identity, admin_role: admin_role.into() }
    }

    /// `true` somente se o sujeito tiver o papel administrativo.
    /// Sujeito desconhecido (sem papéis) é simplesmente `false`.
    pub async fn authorize(&self, subject_id: &str) -> Result<bool, AppError> {
        let roles = self.identity.roles_of(subject_id).await?;
        let allowed = roles.iter().any(|r| r == &self.admin_role);

        if !allowed {
            tracing::warn!(subject = subject_id, "Acesso administrativo negado");
        }
        Ok(allowed)
    }
}
