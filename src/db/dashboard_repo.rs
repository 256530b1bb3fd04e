// src/db/dashboard_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{common::error::AggregationError, models::dashboard::OrderProjection};

/// Leituras que o dashboard administrativo faz na persistência.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn count_orders(&self) -> Result<i64, AggregationError>;
    async fn count_stores(&self) -> Result<i64, AggregationError>;
    async fn count_products(&self) -> Result<i64, AggregationError>;
    async fn list_order_totals(&self) -> Result<Vec<OrderProjection>, AggregationError>;
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, step: &'static str, sql: &str) -> Result<i64, AggregationError> {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AggregationError::new(step, e))
    }
}

#[async_trait]
impl DashboardStore for DashboardRepository {
    async fn count_orders(&self) -> Result<i64, AggregationError> {
        self.count("count_orders", "SELECT COUNT(*) FROM orders").await
    }

    async fn count_stores(&self) -> Result<i64, AggregationError> {
        self.count("count_stores", "SELECT COUNT(*) FROM stores").await
    }

    async fn count_products(&self) -> Result<i64, AggregationError> {
        self.count("count_products", "SELECT COUNT(*) FROM products").await
    }

    // Todos os pedidos, só com created_at e total (custo linear no tamanho da tabela)
    async fn list_order_totals(&self) -> Result<Vec<OrderProjection>, AggregationError> {
        sqlx::query_as::<_, OrderProjection>(
            r#"
            SELECT created_at, total
            FROM orders
            ORDER BY created_at ASC
            "#,
        )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AggregationError::new("list_order_totals", e))
    }
}
