// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Admin ---
        handlers::dashboard::get_dashboard,

        // --- Products ---
        handlers::products::search_products,
    ),
    components(
        schemas(
            // --- DASHBOARD ---
            models::dashboard::DashboardResponse,
            models::dashboard::DashboardSnapshot,
            models::dashboard::OrderProjection,

            // --- PRODUCTS ---
            models::product::SuggestionItem,
            models::product::SearchResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Admin", description = "Painel administrativo"),
        (name = "Products", description = "Busca de produtos")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
