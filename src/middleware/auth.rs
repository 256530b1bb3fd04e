// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{common::error::AppError, config::AppState, models::auth::Claims};

/// O sujeito autenticado da requisição (o `sub` do token do provedor).
///
/// Sem token, ou com token inválido, a requisição é "Not authorized": o
/// portão de autorização nunca chega a ser consultado.
#[derive(Debug, Clone)]
pub struct Subject(pub String);

impl<S> FromRequestParts<S> for Subject
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::NotAuthorized)?;

        subject_from_token(token, &app_state.settings.jwt_secret)
    }
}

pub fn subject_from_token(token: &str, secret: &str) -> Result<Subject, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
        .map_err(|e| {
            tracing::debug!("Token rejeitado: {}", e);
            AppError::NotAuthorized
        })?;

    Ok(Subject(token_data.claims.sub))
}
