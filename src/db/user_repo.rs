// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::IdentityError,
    models::auth::UserRole,
    services::authorization::IdentityProvider,
};

// O repositório de usuários: aqui ele só responde "quais papéis este sujeito tem?"
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca o papel de um usuário pelo ID do provedor de identidade
    pub async fn find_role(&self, subject_id: &str) -> Result<Option<UserRole>, IdentityError> {
        let maybe_role = sqlx::query_as::<_, UserRole>("SELECT role FROM users WHERE id = $1")
            .bind(subject_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_role)
    }
}

#[async_trait]
impl IdentityProvider for UserRepository {
    async fn roles_of(&self, subject_id: &str) -> Result<Vec<String>, IdentityError> {
        Ok(self
            .find_role(subject_id)
            .await?
            .map(|r| vec![r.role])
            .unwrap_or_default())
    }
}
