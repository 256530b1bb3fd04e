// src/common/error.rs

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Falha de leitura na camada de persistência durante a agregação do dashboard.
///
/// Sempre "retryable" do ponto de vista do cliente: nenhuma escrita acontece,
/// então repetir a requisição é seguro.
#[derive(Debug, Error)]
#[error("Falha ao agregar dados do dashboard ({step}): {source}")]
pub struct AggregationError {
    pub step: &'static str,
    #[source]
    pub source: sqlx::Error,
}

impl AggregationError {
    pub fn new(step: &'static str, source: sqlx::Error) -> Self {
        Self { step, source }
    }

    pub fn is_retryable(&self) -> bool {
        true
    }

    /// Código estável para o corpo da resposta (código SQLSTATE quando existir).
    pub fn code(&self) -> String {
        error_code(&self.source)
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Falha ao consultar o provedor de identidade: {0}")]
    Lookup(#[from] sqlx::Error),
}

impl IdentityError {
    pub fn code(&self) -> String {
        match self {
            IdentityError::Lookup(e) => error_code(e),
        }
    }
}

/// Erro do cliente de sugestões. Nunca vira resposta HTTP: só é logado.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Falha na requisição de sugestões: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Resposta inesperada do servidor de busca: {0}")]
    Status(u16),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Query string inválida: {0}")]
    InvalidQuery(#[from] QueryRejection),

    #[error("Not authorized")]
    NotAuthorized,

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

fn error_code(e: &sqlx::Error) -> String {
    match e {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|c| c.into_owned())
            .unwrap_or_else(|| db_err.message().to_string()),
        other => other.to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidQuery(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::NotAuthorized => (StatusCode::UNAUTHORIZED, "Not authorized".to_string()),

            // Falhas de leitura viram 400 com um corpo estável (código ou mensagem).
            AppError::Aggregation(ref e) => {
                tracing::error!(retryable = e.is_retryable(), "{}", e);
                (StatusCode::BAD_REQUEST, e.code())
            }
            AppError::Identity(ref e) => {
                tracing::error!("{}", e);
                (StatusCode::BAD_REQUEST, e.code())
            }
            AppError::DatabaseError(ref e) => {
                tracing::error!("Erro de banco de dados: {}", e);
                (StatusCode::BAD_REQUEST, error_code(e))
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
