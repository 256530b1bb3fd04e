// src/models/auth.rs

use serde::{Deserialize, Serialize};

// Estrutura de dados ("claims") dentro do JWT emitido pelo provedor de identidade.
// Aqui só lemos o token; emissão e sessão ficam com o provedor.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (ID do usuário no provedor)
    pub exp: usize,  // Expiration time
}

// O papel de um usuário, como gravado na tabela `users`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRole {
    pub role: String,
}
