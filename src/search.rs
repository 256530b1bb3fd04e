//! Busca incremental de sugestões (o lado "cliente" da busca de produtos).
//!
//! Cada tecla vira um evento; o controlador espera um período de silêncio,
//! consulta a busca remota e só aplica a resposta da geração mais recente.

pub mod controller;
pub mod navigation;
pub mod source;

pub use controller::{
    connect_search_box, connect_search_box_with, spawn_search_box, FetchOutcome, Phase, SearchBox, SearchEvent, SuggestionController,
    SuggestionView,
};
pub use navigation::{ChannelNavigator, Navigation, Navigator};
pub use source::{HttpSuggestionSource, SuggestionConfig, SuggestionSource};
