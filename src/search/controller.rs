// src/search/controller.rs

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    task::AbortHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    common::error::NetworkError,
    models::product::SuggestionItem,
    search::{
        navigation::{Navigation, Navigator},
        source::{HttpSuggestionSource, SuggestionConfig, SuggestionSource},
    },
};

// Até 1 caractere não vale uma consulta
const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Debouncing,
    Fetching,
}

/// O que aconteceu com uma resposta da busca remota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Discarded,
    Failed,
}

#[derive(Debug)]
pub enum SearchEvent {
    Input(String),
    TimerFired { generation: u64, text: String },
    Fetched { generation: u64, result: Result<Vec<SuggestionItem>, NetworkError> },
    Submit,
    Pick(SuggestionItem),
    Close,
}

/// Estado visível, publicado depois de cada evento.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionView {
    pub query: String,
    pub suggestions: Vec<SuggestionItem>,
    pub phase: Phase,
}

/// Máquina de estados que transforma teclas em consultas de sugestão.
///
/// Só o loop de eventos muta este estado. Timers e consultas rodam em tasks
/// separadas e apenas devolvem eventos pelo canal.
pub struct SuggestionController {
    query: String,
    suggestions: Vec<SuggestionItem>,
    generation: u64,
    phase: Phase,
    pending_timer: Option<CancellationToken>,
    in_flight: Option<AbortHandle>,
    debounce: Duration,
    source: Arc<dyn SuggestionSource>,
    navigator: Arc<dyn Navigator>,
    events: mpsc::UnboundedSender<SearchEvent>,
}

impl SuggestionController {
    // Construção direta só dentro do crate: os métodos `on_*` disparam tasks
    // com `tokio::spawn` e exigem um runtime tokio ativo.
    pub(crate) fn new(
        source: Arc<dyn SuggestionSource>,
        navigator: Arc<dyn Navigator>,
        debounce: Duration,
        events: mpsc::UnboundedSender<SearchEvent>,
    ) -> Self {
        Self {
            query: String::new(),
            suggestions: Vec::new(),
            generation: 0,
            phase: Phase::Idle,
            pending_timer: None,
            in_flight: None,
            debounce,
            source,
            navigator,
            events,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[SuggestionItem] {
        &self.suggestions
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view(&self) -> SuggestionView {
        SuggestionView {
            query: self.query.clone(),
            suggestions: self.suggestions.clone(),
            phase: self.phase,
        }
    }

    /// Nova tecla: reinicia o debounce e abre uma nova geração.
    ///
    /// Precisa rodar dentro de um runtime tokio (o timer é uma task).
    pub fn on_input(&mut self, text: impl Into<String>) {
        self.query = text.into();
        self.cancel_timer();
        // A resposta da geração anterior seria descartada de qualquer forma
        self.abort_in_flight();

        self.generation += 1;
        let generation = self.generation;
        let text = self.query.clone();
        let delay = self.debounce;
        let events = self.events.clone();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = events.send(SearchEvent::TimerFired { generation, text });
                }
            }
        });

        self.pending_timer = Some(token);
        self.phase = Phase::Debouncing;
    }

    pub fn on_timer_fire(&mut self, generation: u64, text: String) {
        let current = generation == self.generation;
        if current {
            self.pending_timer = None;
        }

        // Mesmo critério do servidor: espaços nas pontas não contam
        if text.trim().chars().count() < MIN_QUERY_CHARS {
            self.suggestions.clear();
            if current {
                self.phase = Phase::Idle;
            }
            return;
        }

        if !current {
            tracing::debug!(generation, current = self.generation, "Timer obsoleto ignorado");
            return;
        }

        let source = self.source.clone();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let result = source.search(&text).await;
            let _ = events.send(SearchEvent::Fetched { generation, result });
        });

        self.in_flight = Some(handle.abort_handle());
        self.phase = Phase::Fetching;
    }

    /// Aplica a resposta só se nenhuma tecla mais nova a superou.
    pub fn on_fetch_complete(
        &mut self,
        generation: u64,
        result: Result<Vec<SuggestionItem>, NetworkError>,
    ) -> FetchOutcome {
        let current = generation == self.generation;
        if current {
            self.in_flight = None;
            self.phase = Phase::Idle;
        }

        match result {
            Ok(items) if current => {
                self.suggestions = items;
                FetchOutcome::Applied
            }
            Ok(_) => {
                tracing::debug!(generation, current = self.generation, "Resposta obsoleta descartada");
                FetchOutcome::Discarded
            }
            Err(e) => {
                // Lista atual fica como está; a próxima tecla tenta de novo
                tracing::warn!(generation, "Falha ao buscar sugestões: {}", e);
                FetchOutcome::Failed
            }
        }
    }

    pub fn on_submit(&mut self) {
        self.invalidate();
        self.navigator.navigate(Navigation::search_results(self.query.clone()));
    }

    pub fn on_suggestion_pick(&mut self, item: SuggestionItem) {
        self.query = item.name;
        self.invalidate();
        self.navigator.navigate(Navigation::search_results(self.query.clone()));
    }

    pub fn teardown(&mut self) {
        self.cancel_timer();
        self.abort_in_flight();
        self.phase = Phase::Idle;
    }

    /// Trata um evento; `false` quando o loop deve parar.
    pub fn handle(&mut self, event: SearchEvent) -> bool {
        match event {
            SearchEvent::Input(text) => self.on_input(text),
            SearchEvent::TimerFired { generation, text } => self.on_timer_fire(generation, text),
            SearchEvent::Fetched { generation, result } => {
                self.on_fetch_complete(generation, result);
            }
            SearchEvent::Submit => self.on_submit(),
            SearchEvent::Pick(item) => self.on_suggestion_pick(item),
            SearchEvent::Close => return false,
        }
        true
    }

    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<SearchEvent>,
        view: watch::Sender<SuggestionView>,
    ) {
        while let Some(event) = events.recv().await {
            let keep_going = self.handle(event);
            view.send_replace(self.view());
            if !keep_going {
                break;
            }
        }

        self.teardown();
        view.send_replace(self.view());
        tracing::debug!("Busca de sugestões encerrada");
    }

    // Cancela timer e consulta em voo, limpa a lista e torna qualquer
    // resposta pendente obsoleta.
    fn invalidate(&mut self) {
        self.teardown();
        self.suggestions.clear();
        self.generation += 1;
    }

    fn cancel_timer(&mut self) {
        if let Some(token) = self.pending_timer.take() {
            token.cancel();
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for SuggestionController {
    fn drop(&mut self) {
        self.cancel_timer();
        self.abort_in_flight();
    }
}

/// Handle do campo de busca. Soltar o handle encerra o loop.
pub struct SearchBox {
    events: mpsc::UnboundedSender<SearchEvent>,
    view: watch::Receiver<SuggestionView>,
}

impl SearchBox {
    pub fn input(&self, text: impl Into<String>) {
        self.send(SearchEvent::Input(text.into()));
    }

    pub fn submit(&self) {
        self.send(SearchEvent::Submit);
    }

    pub fn pick(&self, item: SuggestionItem) {
        self.send(SearchEvent::Pick(item));
    }

    pub fn close(&self) {
        self.send(SearchEvent::Close);
    }

    pub fn view(&self) -> SuggestionView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionView> {
        self.view.clone()
    }

    fn send(&self, event: SearchEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Loop de sugestões já encerrado");
        }
    }
}

impl Drop for SearchBox {
    fn drop(&mut self) {
        let _ = self.events.send(SearchEvent::Close);
    }
}

/// Sobe o loop de eventos no runtime atual e devolve o handle.
///
/// Deve ser chamada de dentro de um runtime tokio.
pub fn spawn_search_box(
    source: Arc<dyn SuggestionSource>,
    navigator: Arc<dyn Navigator>,
    debounce: Duration,
) -> SearchBox {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(SuggestionView::default());

    let controller = SuggestionController::new(source, navigator, debounce, events_tx.clone());
    tokio::spawn(controller.run(events_rx, view_tx));

    SearchBox { events: events_tx, view: view_rx }
}

/// Conecta à busca HTTP configurada pelo ambiente (`SuggestionConfig::from_env`).
pub fn connect_search_box(navigator: Arc<dyn Navigator>) -> Result<SearchBox, NetworkError> {
    connect_search_box_with(&SuggestionConfig::from_env(), navigator)
}

/// Como `spawn_search_box`, consultando a busca HTTP descrita em `config`.
pub fn connect_search_box_with(
    config: &SuggestionConfig,
    navigator: Arc<dyn Navigator>,
) -> Result<SearchBox, NetworkError> {
    let source = HttpSuggestionSource::new(&config.base_url)?;
    tracing::info!(base_url = %config.base_url, "Busca de sugestões conectada");
    Ok(spawn_search_box(Arc::new(source), navigator, config.debounce))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::navigation::ChannelNavigator;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn item(name: &str) -> SuggestionItem {
        SuggestionItem { id: format!("id-{name}"), name: name.to_string(), price: Decimal::new(4990, 2) }
    }

    // Devolve "<texto> 1" depois de um atraso opcional; "erro" sempre falha
    #[derive(Default)]
    struct ScriptedSource {
        delays: HashMap<String, Duration>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SuggestionSource for ScriptedSource {
        async fn search(&self, text: &str) -> Result<Vec<SuggestionItem>, NetworkError> {
            self.calls.lock().unwrap().push(text.to_string());
            if let Some(delay) = self.delays.get(text) {
                tokio::time::sleep(*delay).await;
            }
            if text == "erro" {
                return Err(NetworkError::Status(503));
            }
            Ok(vec![item(&format!("{text} 1"))])
        }
    }

    struct NullNavigator;

    impl Navigator for NullNavigator {
        fn navigate(&self, _to: Navigation) {}
    }

    fn controller() -> SuggestionController {
        let (tx, _rx) = mpsc::unbounded_channel();
        SuggestionController::new(Arc::new(ScriptedSource::default()), Arc::new(NullNavigator), DEBOUNCE, tx)
    }

    fn names(items: &[SuggestionItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_arriving_last_is_discarded() {
        let mut c = controller();
        c.on_input("fo");
        c.on_input("fone");
        assert_eq!(c.generation(), 2);

        assert_eq!(c.on_fetch_complete(2, Ok(vec![item("fone")])), FetchOutcome::Applied);
        assert_eq!(c.on_fetch_complete(1, Ok(vec![item("fo")])), FetchOutcome::Discarded);
        assert_eq!(names(c.suggestions()), ["fone"]);
        assert_eq!(c.query(), "fone");
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_arriving_first_is_discarded() {
        let mut c = controller();
        c.on_input("fo");
        c.on_input("fone");

        assert_eq!(c.on_fetch_complete(1, Ok(vec![item("fo")])), FetchOutcome::Discarded);
        assert!(c.suggestions().is_empty());
        assert_eq!(c.phase(), Phase::Debouncing);

        assert_eq!(c.on_fetch_complete(2, Ok(vec![item("fone")])), FetchOutcome::Applied);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_leaves_suggestions_untouched() {
        let mut c = controller();
        c.on_input("fone");
        c.on_fetch_complete(1, Ok(vec![item("fone")]));

        c.on_input("fones");
        let outcome = c.on_fetch_complete(2, Err(NetworkError::Status(500)));
        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(names(c.suggestions()), ["fone"]);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_issues_one_lookup_for_the_last_text() {
        let source = Arc::new(ScriptedSource::default());
        let search = spawn_search_box(source.clone(), Arc::new(NullNavigator), DEBOUNCE);

        search.input("fo");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.input("fon");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.input("fone");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(source.calls(), ["fone"]);
        let view = search.view();
        assert_eq!(view.query, "fone");
        assert_eq!(names(&view.suggestions), ["fone 1"]);
        assert_eq!(view.phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn single_character_never_hits_the_network() {
        let source = Arc::new(ScriptedSource::default());
        let search = spawn_search_box(source.clone(), Arc::new(NullNavigator), DEBOUNCE);

        search.input("fone");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(names(&search.view().suggestions), ["fone 1"]);

        search.input("f");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(source.calls(), ["fone"]);
        assert!(search.view().suggestions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_earlier_lookup_never_overwrites_newer_one() {
        let source = Arc::new(ScriptedSource {
            delays: HashMap::from([("fo".to_string(), Duration::from_secs(2))]),
            ..Default::default()
        });
        let search = spawn_search_box(source.clone(), Arc::new(NullNavigator), DEBOUNCE);

        search.input("fo");
        // "fo" já está em voo quando a próxima tecla chega
        tokio::time::sleep(Duration::from_millis(600)).await;
        search.input("fone");
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(source.calls(), ["fo", "fone"]);
        assert_eq!(names(&search.view().suggestions), ["fone 1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn network_failure_keeps_previous_list() {
        let source = Arc::new(ScriptedSource::default());
        let search = spawn_search_box(source, Arc::new(NullNavigator), DEBOUNCE);

        search.input("fone");
        tokio::time::sleep(Duration::from_millis(600)).await;
        search.input("erro");
        tokio::time::sleep(Duration::from_millis(600)).await;

        let view = search.view();
        assert_eq!(view.query, "erro");
        assert_eq!(names(&view.suggestions), ["fone 1"]);
        assert_eq!(view.phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_cancels_timer_and_navigates() {
        let source = Arc::new(ScriptedSource::default());
        let (navigator, mut navigations) = ChannelNavigator::new();
        let search = spawn_search_box(source.clone(), Arc::new(navigator), DEBOUNCE);

        search.input("fone azul");
        search.submit();

        let nav = navigations.recv().await.unwrap();
        assert_eq!(nav, Navigation::search_results("fone azul"));
        assert_eq!(nav.to_url(), "/shop?search=fone+azul");

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(source.calls().is_empty());
        assert!(search.view().suggestions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn picking_a_suggestion_sets_query_and_navigates() {
        let source = Arc::new(ScriptedSource::default());
        let (navigator, mut navigations) = ChannelNavigator::new();
        let search = spawn_search_box(source, Arc::new(navigator), DEBOUNCE);

        search.input("fone");
        tokio::time::sleep(Duration::from_millis(600)).await;
        let picked = search.view().suggestions[0].clone();
        search.pick(picked);

        let nav = navigations.recv().await.unwrap();
        assert_eq!(nav.search, "fone 1");

        tokio::time::sleep(Duration::from_millis(10)).await;
        let view = search.view();
        assert_eq!(view.query, "fone 1");
        assert!(view.suggestions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_server_keeps_box_usable() {
        let config = SuggestionConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            debounce: DEBOUNCE,
        };
        let search = connect_search_box_with(&config, Arc::new(NullNavigator)).unwrap();

        search.input("fone");
        tokio::time::sleep(Duration::from_millis(600)).await;
        search.close();
        assert_eq!(search.view().query, "fone");
    }

    #[tokio::test(start_paused = true)]
    async fn close_during_debounce_never_hits_the_network() {
        let source = Arc::new(ScriptedSource::default());
        let search = spawn_search_box(source.clone(), Arc::new(NullNavigator), DEBOUNCE);

        search.input("fone");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.close();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(source.calls().is_empty());
        assert_eq!(search.view().phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_box_during_debounce_never_hits_the_network() {
        let source = Arc::new(ScriptedSource::default());
        let search = spawn_search_box(source.clone(), Arc::new(NullNavigator), DEBOUNCE);

        search.input("fone");
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(search);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn close_during_slow_lookup_never_applies_its_result() {
        let source = Arc::new(ScriptedSource {
            delays: HashMap::from([("fone".to_string(), Duration::from_secs(2))]),
            ..Default::default()
        });
        let search = spawn_search_box(source.clone(), Arc::new(NullNavigator), DEBOUNCE);
        let mut updates = search.subscribe();

        search.input("fone");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(source.calls(), ["fone"]);
        assert_eq!(search.view().phase, Phase::Fetching);

        search.close();
        tokio::time::sleep(Duration::from_secs(3)).await;

        let view = updates.borrow_and_update().clone();
        assert!(view.suggestions.is_empty());
        assert_eq!(view.phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn padded_single_character_never_hits_the_network() {
        let source = Arc::new(ScriptedSource::default());
        let search = spawn_search_box(source.clone(), Arc::new(NullNavigator), DEBOUNCE);

        search.input(" f ");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(source.calls().is_empty());
        assert!(search.view().suggestions.is_empty());
    }

    proptest! {
        #[test]
        fn short_queries_always_clear_suggestions(text in "\\PC{0,1}") {
            let mut c = controller();
            c.on_fetch_complete(0, Ok(vec![item("antigo")]));
            prop_assert!(!c.suggestions().is_empty());

            c.on_timer_fire(0, text);
            prop_assert!(c.suggestions().is_empty());
            prop_assert_eq!(c.phase(), Phase::Idle);
        }

        #[test]
        fn only_latest_generation_mutates_suggestions(
            order in (2u64..8).prop_flat_map(|n| Just((1..=n).collect::<Vec<u64>>()).prop_shuffle())
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
            let _guard = rt.enter();

            let latest = order.len() as u64;
            let mut c = controller();
            for g in 1..=latest {
                c.on_input(format!("busca {g}"));
            }

            for g in order {
                let outcome = c.on_fetch_complete(g, Ok(vec![item(&format!("r{g}"))]));
                let expected = if g == latest { FetchOutcome::Applied } else { FetchOutcome::Discarded };
                prop_assert_eq!(outcome, expected);
            }
            let expected = format!("r{latest}");
            prop_assert_eq!(names(c.suggestions()), vec![expected.as_str()]);
        }
    }
}
