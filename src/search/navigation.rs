// src/search/navigation.rs

use reqwest::Url;
use tokio::sync::mpsc;

// Página de resultados e o parâmetro que ela lê
pub const RESULTS_PATH: &str = "/shop";
pub const SEARCH_PARAM: &str = "search";

// Base fictícia só para reaproveitar o encoding de query do `Url`
const NAV_BASE: &str = "app://storefront/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub search: String,
}

impl Navigation {
    pub fn search_results(search: impl Into<String>) -> Self {
        Self { path: RESULTS_PATH.to_string(), search: search.into() }
    }

    /// Caminho relativo com a query codificada, ex: `/shop?search=fone+azul`.
    pub fn to_url(&self) -> String {
        match Url::parse(NAV_BASE).and_then(|base| base.join(&self.path)) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair(SEARCH_PARAM, &self.search);
                format!("{}?{}", url.path(), url.query().unwrap_or_default())
            }
            Err(_) => format!("{}?{}={}", self.path, SEARCH_PARAM, self.search),
        }
    }
}

/// Quem troca a view ativa (roteador do app hospedeiro).
pub trait Navigator: Send + Sync {
    fn navigate(&self, to: Navigation);
}

/// Encaminha as navegações para um canal; o hospedeiro consome do outro lado.
#[derive(Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Navigation>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Navigation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, to: Navigation) {
        tracing::debug!(url = %to.to_url(), "Navegando");
        if self.tx.send(to).is_err() {
            tracing::warn!("Navegação descartada: ninguém escutando");
        }
    }
}
