// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, str::FromStr, sync::Arc, time::Duration};

use crate::{
    db::{DashboardRepository, ProductRepository, UserRepository},
    services::{authorization::AuthorizationGate, dashboard_service::DashboardService},
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub admin_role: String,
    pub bind_addr: String,
    pub search_result_limit: i64,
    pub db_max_connections: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required(&var, "DATABASE_URL")?,
            jwt_secret: required(&var, "JWT_SECRET")?,
            admin_role: var("ADMIN_ROLE").unwrap_or_else(|| "admin".to_string()),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            // Zero ou negativo viraria erro do Postgres no LIMIT, em plena requisição
            search_result_limit: positive(&var, "SEARCH_RESULT_LIMIT", 10)?,
            db_max_connections: positive(&var, "DB_MAX_CONNECTIONS", 5)?,
        })
    }
}

fn required(var: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<String> {
    var(key).ok_or_else(|| anyhow::anyhow!("{} deve ser definida", key))
}

fn positive<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let value: T = match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{} inválida ({}): {}", key, raw, e))?,
        None => default,
    };

    if value <= T::default() {
        anyhow::bail!("{} deve ser maior que zero", key);
    }
    Ok(value)
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Settings,
    pub dashboard_service: DashboardService,
    pub product_repo: ProductRepository,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let gate = AuthorizationGate::new(
            Arc::new(UserRepository::new(db_pool.clone())),
            settings.admin_role.clone(),
        );
        let dashboard_service = DashboardService::new(
            gate,
            Arc::new(DashboardRepository::new(db_pool.clone())),
        );
        let product_repo = ProductRepository::new(db_pool.clone());

        Ok(Self {
            db_pool,
            settings,
            dashboard_service,
            product_repo,
        })
    }
}
