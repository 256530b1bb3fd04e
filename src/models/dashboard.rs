// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Projeção de leitura de um pedido (só o que o dashboard precisa)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderProjection {
    pub created_at: DateTime<Utc>,
    #[schema(value_type = f64, example = 19.99)]
    pub total: Decimal,
}

/// Retrato do painel administrativo. Calculado a cada requisição, nunca cacheado.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardSnapshot {
    #[serde(rename = "orders")]
    pub order_count: i64,
    #[serde(rename = "stores")]
    pub store_count: i64,
    #[serde(rename = "products")]
    pub product_count: i64,
    // Soma de todos os totais, arredondada uma única vez (ex: "24.99")
    #[serde(rename = "revenue")]
    #[schema(example = "24.99")]
    pub total_revenue: String,
    #[serde(rename = "allOrders")]
    pub orders: Vec<OrderProjection>,
}

// Envelope da resposta: { "dashboardData": { ... } }
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub dashboard_data: DashboardSnapshot,
}
