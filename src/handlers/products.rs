// src/handlers/products.rs

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::product::{SearchParams, SearchResponse},
};

// Consultas com até 1 caractere não vão ao banco
const MIN_QUERY_CHARS: usize = 2;

// GET /api/products/search?query=...
#[utoipa::path(
    get,
    path = "/api/products/search",
    tag = "Products",
    params(SearchParams),
    responses(
        (status = 200, description = "Produtos cujo nome contém o trecho buscado", body = SearchResponse),
        (status = 400, description = "Busca inválida")
    )
)]
pub async fn search_products(
    State(app_state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    // Rejeição do extrator também sai no formato { "error": ... }
    let Query(params) = params?;
    params.validate().map_err(AppError::ValidationError)?;

    let query = params.query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(Json(SearchResponse { results: Vec::new() }));
    }

    let results = app_state.product_repo
        .search_by_name(query, app_state.settings.search_result_limit)
        .await?;

    Ok(Json(SearchResponse { results }))
}
