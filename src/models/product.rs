// src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// Um item de sugestão, como devolvido pela busca de produtos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SuggestionItem {
    #[schema(example = "prod_01")]
    pub id: String,
    #[schema(example = "Fone Bluetooth")]
    pub name: String,
    #[schema(value_type = f64, example = 499.0)]
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Trecho do nome do produto
    #[validate(length(max = 100, message = "A busca deve ter no máximo 100 caracteres."))]
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<SuggestionItem>,
}
