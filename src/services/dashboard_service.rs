// src/services/dashboard_service.rs

use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::DashboardStore,
    models::dashboard::{DashboardSnapshot, OrderProjection},
    services::authorization::AuthorizationGate,
};

#[derive(Clone)]
pub struct DashboardService {
    gate: AuthorizationGate,
    store: Arc<dyn DashboardStore>,
}

impl DashboardService {
    pub fn new(gate: AuthorizationGate, store: Arc<dyn DashboardStore>) -> Self {
        Self { gate, store }
    }

    /// Monta o retrato do painel administrativo.
    ///
    /// A autorização vem sempre antes de qualquer leitura: se o sujeito não
    /// for admin, nenhuma query é feita.
    pub async fn compute_dashboard(&self, subject_id: &str) -> Result<DashboardSnapshot, AppError> {
        if !self.gate.authorize(subject_id).await? {
            return Err(AppError::NotAuthorized);
        }

        let order_count = self.store.count_orders().await?;
        let store_count = self.store.count_stores().await?;
        let product_count = self.store.count_products().await?;
        let orders = self.store.list_order_totals().await?;

        let total_revenue = total_revenue(&orders);

        tracing::debug!(order_count, store_count, product_count, %total_revenue, "Dashboard calculado");

        Ok(DashboardSnapshot {
            order_count,
            store_count,
            product_count,
            total_revenue,
            orders,
        })
    }
}

/// Soma exata de todos os totais, arredondada para 2 casas uma única vez no fim.
///
/// Empates arredondam para longe do zero ("half-up"): 0.005 -> 0.01.
pub fn total_revenue(orders: &[OrderProjection]) -> String {
    let sum: Decimal = orders.iter().map(|o| o.total).sum();

    let mut rounded = sum.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // Sempre duas casas no texto ("20.00", nunca "20")
    rounded.rescale(2);
    rounded.to_string()
}
