// src/db/product_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::product::SuggestionItem};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca por trecho do nome (case-insensitive), em ordem alfabética
    pub async fn search_by_name(&self, query: &str, limit: i64) -> Result<Vec<SuggestionItem>, AppError> {
        let pattern = format!("%{}%", escape_like(query));

        let items = sqlx::query_as::<_, SuggestionItem>(
            r#"
            SELECT id, name, price
            FROM products
            WHERE name ILIKE $1 ESCAPE '\'
            ORDER BY name ASC
            LIMIT $2
            "#,
        )
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }
}

// '%' e '_' digitados pelo usuário são literais, não curingas
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
