// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global du tableau de bord
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Option<ChartModal> : la fenêtre de détail n'existe que si elle est ouverte
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Le worker ne touche jamais App : il envoie des RefreshEvent que la
//   boucle principale applique ici
// ============================================================================

use chrono::{DateTime, Local};

use crate::api::NewsItem;
use crate::chart::{render_chart, ChartGeometry, ChartProfile, PlotPoint, Tooltip};
use crate::models::{IndexEntry, PriceSeries, Quote, SeriesStats, StockEntry};
use crate::refresh::{CardUpdate, RankedGainer, RefreshEvent};

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : indices, cartes, classement
    Dashboard,

    /// Fenêtre de détail : grand graphique, statistiques, news
    ChartModal,
}

// ============================================================================
// Cartes
// ============================================================================

/// Une carte d'action du tableau de bord
#[derive(Debug, Clone)]
pub struct StockCard {
    pub entry: StockEntry,
    pub quote: Option<Quote>,
    /// Série prête à dessiner (déjà complétée si l'historique était mince)
    pub chart: Option<PriceSeries>,
    /// Carte ajoutée par "voir plus"
    pub additional: bool,
    /// Faux tant que la première résolution n'est pas terminée
    pub loaded: bool,
}

impl StockCard {
    pub fn new(entry: StockEntry, additional: bool) -> Self {
        Self {
            entry,
            quote: None,
            chart: None,
            additional,
            loaded: false,
        }
    }

    /// Tendance de la dernière variation (stable compte comme hausse)
    pub fn is_positive(&self) -> bool {
        self.quote.as_ref().map(Quote::is_positive).unwrap_or(false)
    }

    /// Texte de remplacement quand il n'y a pas de prix à afficher
    pub fn placeholder(&self) -> &'static str {
        if self.loaded {
            "데이터 없음"
        } else {
            "로딩 중..."
        }
    }

    fn apply(&mut self, update: CardUpdate) {
        self.quote = update.quote;
        self.chart = update.chart;
        self.loaded = true;
    }
}

/// Un indice du résumé (KOSPI, KOSDAQ, DJI)
#[derive(Debug, Clone)]
pub struct IndexCard {
    pub entry: IndexEntry,
    pub quote: Option<Quote>,
    pub loaded: bool,
}

// ============================================================================
// Fenêtre de détail
// ============================================================================

/// État du chargement des news
#[derive(Debug, Clone, PartialEq)]
pub enum NewsState {
    Loading,
    Loaded(Vec<NewsItem>),
    Failed(String),
}

/// Fenêtre de détail d'un titre
#[derive(Debug, Clone)]
pub struct ChartModal {
    pub entry: StockEntry,
    pub series: PriceSeries,
    pub positive: bool,
    /// Géométrie du grand graphique, recalculée à chaque ouverture
    pub geometry: ChartGeometry,
    /// Point survolé par la souris
    pub hover: Option<PlotPoint>,
    pub news: NewsState,
}

impl ChartModal {
    pub fn new(entry: StockEntry, series: PriceSeries, positive: bool) -> Self {
        let geometry = render_chart(series.prices(), ChartProfile::Expanded, positive);
        Self {
            entry,
            series,
            positive,
            geometry,
            hover: None,
            news: NewsState::Loading,
        }
    }

    /// Met à jour le point survolé à partir d'une position en pixels du canevas
    pub fn hover_at(&mut self, x: f64, y: f64) {
        self.hover = self.geometry.hit_test(x, y).copied();
    }

    pub fn clear_hover(&mut self) {
        self.hover = None;
    }

    pub fn tooltip(&self) -> Option<Tooltip> {
        self.hover.as_ref().map(Tooltip::for_point)
    }

    pub fn stats(&self) -> Option<SeriesStats> {
        self.series.stats()
    }
}

// ============================================================================
// App
// ============================================================================

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    pub cards: Vec<StockCard>,
    pub indices: Vec<IndexCard>,
    pub gainers: Vec<RankedGainer>,

    /// Index de la carte sélectionnée
    pub selected_index: usize,

    pub current_screen: Screen,
    pub modal: Option<ChartModal>,

    /// Two-step quit : première pression de 'q' -> confirmation
    pub confirm_quit: bool,

    /// Une passe de rafraîchissement est en cours côté worker
    /// Une nouvelle passe (timer ou 'r') est ignorée tant qu'il est vrai.
    pub refresh_in_flight: bool,

    /// Les actions supplémentaires sont affichées ("voir plus")
    pub show_additional: bool,

    pub last_update: Option<DateTime<Local>>,

    /// Message affiché dans la barre d'état (erreurs d'export, URL, etc.)
    pub status_message: Option<String>,

    pub is_loading: bool,
    pub loading_message: Option<String>,
}

impl App {
    /// Crée une App vide
    pub fn new() -> Self {
        Self {
            running: true,
            cards: Vec::new(),
            indices: Vec::new(),
            gainers: Vec::new(),
            selected_index: 0,
            current_screen: Screen::Dashboard,
            modal: None,
            confirm_quit: false,
            refresh_in_flight: false,
            show_additional: false,
            last_update: None,
            status_message: None,
            is_loading: false,
            loading_message: None,
        }
    }

    /// Crée une App avec les cartes et indices de départ (pas encore chargés)
    pub fn with_catalogue(watchlist: &[StockEntry], indices: &[IndexEntry]) -> Self {
        Self {
            cards: watchlist
                .iter()
                .cloned()
                .map(|entry| StockCard::new(entry, false))
                .collect(),
            indices: indices
                .iter()
                .cloned()
                .map(|entry| IndexCard {
                    entry,
                    quote: None,
                    loaded: false,
                })
                .collect(),
            ..Self::new()
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tick : rien à faire, l'état avance au rythme des résultats du worker
    pub fn tick(&mut self) {}

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.cards.len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    pub fn selected_card(&self) -> Option<&StockCard> {
        self.cards.get(self.selected_index)
    }

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    pub fn is_on_modal(&self) -> bool {
        self.current_screen == Screen::ChartModal
    }

    // ========================================================================
    // Two-step quit
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Chargement et barre d'état
    // ========================================================================

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    // ========================================================================
    // Rafraîchissement
    // ========================================================================

    /// Réserve la passe de rafraîchissement
    ///
    /// Retourne false si une passe tourne déjà : l'appelant ne doit alors
    /// rien envoyer au worker.
    pub fn begin_refresh(&mut self) -> bool {
        if self.refresh_in_flight {
            return false;
        }
        self.refresh_in_flight = true;
        true
    }

    /// Libère la passe (fin normale ou "voir plus" terminé)
    pub fn finish_refresh(&mut self) {
        self.refresh_in_flight = false;
        self.stop_loading();
    }

    /// Applique une étape de la passe envoyée par le worker
    pub fn apply_refresh_event(&mut self, event: RefreshEvent) {
        match event {
            RefreshEvent::Started { cards } => {
                self.start_loading(Some(format!("Mise à jour de {} actions...", cards)));
            }
            RefreshEvent::CardUpdated(update) => {
                // La carte a pu être retirée par "masquer" entre-temps
                if let Some(card) = self.cards.iter_mut().find(|c| c.entry.symbol == update.symbol) {
                    card.apply(update);
                }
            }
            RefreshEvent::IndexUpdated { symbol, quote } => {
                if let Some(index) = self.indices.iter_mut().find(|i| i.entry.symbol == symbol) {
                    index.quote = quote;
                    index.loaded = true;
                }
            }
            RefreshEvent::GainersUpdated(gainers) => {
                self.gainers = gainers;
            }
            RefreshEvent::Finished { at } => {
                self.last_update = Some(at);
                self.finish_refresh();
            }
        }
    }

    /// Cartes actuellement affichées (toutes, dans l'ordre)
    pub fn card_entries(&self) -> Vec<StockEntry> {
        self.cards.iter().map(|c| c.entry.clone()).collect()
    }

    pub fn index_entries(&self) -> Vec<IndexEntry> {
        self.indices.iter().map(|i| i.entry.clone()).collect()
    }

    // ========================================================================
    // Voir plus / masquer
    // ========================================================================

    /// Ajoute les cartes supplémentaires
    ///
    /// Retourne les entrées à charger, vide si elles sont déjà affichées.
    pub fn show_more(&mut self, additional: &[StockEntry]) -> Vec<StockEntry> {
        if self.show_additional {
            return Vec::new();
        }

        self.show_additional = true;
        let added: Vec<StockEntry> = additional
            .iter()
            .filter(|entry| !self.cards.iter().any(|c| c.entry.symbol == entry.symbol))
            .cloned()
            .collect();

        self.cards
            .extend(added.iter().cloned().map(|entry| StockCard::new(entry, true)));
        added
    }

    /// Retire les cartes supplémentaires
    pub fn hide_more(&mut self) {
        self.cards.retain(|c| !c.additional);
        self.show_additional = false;

        let max_index = self.cards.len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);
    }

    // ========================================================================
    // Fenêtre de détail
    // ========================================================================

    /// Ouvre la fenêtre de détail de la carte sélectionnée
    ///
    /// Retourne le code court à utiliser pour charger les news, ou None si
    /// la carte n'a rien à dessiner.
    pub fn open_modal(&mut self) -> Option<String> {
        let card = self.selected_card()?;

        let Some(series) = card.chart.clone() else {
            let message = format!("{} : {}", card.entry.name, card.placeholder());
            self.set_status(message);
            return None;
        };

        let code = card.entry.code.clone();
        let modal = ChartModal::new(card.entry.clone(), series, card.is_positive());
        self.modal = Some(modal);
        self.current_screen = Screen::ChartModal;
        Some(code)
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.current_screen = Screen::Dashboard;
    }

    /// Range les news reçues si la fenêtre affiche toujours ce titre
    pub fn set_news(&mut self, code: &str, news: Result<Vec<NewsItem>, String>) {
        if let Some(modal) = self.modal.as_mut().filter(|m| m.entry.code == code) {
            modal.news = match news {
                Ok(items) => NewsState::Loaded(items),
                Err(error) => NewsState::Failed(error),
            };
        }
    }

    /// Titre concerné par les actions 'e' (export) et 'o' (page de cotation)
    pub fn focused_entry(&self) -> Option<&StockEntry> {
        match &self.modal {
            Some(modal) => Some(&modal.entry),
            None => self.selected_card().map(|c| &c.entry),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stock::{additional_stocks, default_indices, default_watchlist};

    fn app() -> App {
        App::with_catalogue(&default_watchlist(), &default_indices())
    }

    fn loaded_update(symbol: &str, price: f64, previous_close: f64) -> CardUpdate {
        CardUpdate {
            symbol: symbol.to_string(),
            quote: Quote::from_prices(Some(price), Some(previous_close), None),
            chart: Some(PriceSeries::new(vec![previous_close, (price + previous_close) / 2.0, price])),
        }
    }

    #[test]
    fn test_app_creation() {
        let app = app();
        assert!(app.is_running());
        assert_eq!(app.cards.len(), 6);
        assert_eq!(app.indices.len(), 3);
        assert_eq!(app.cards[0].placeholder(), "로딩 중...");
    }

    #[test]
    fn test_navigation() {
        let mut app = app();

        app.navigate_up();
        assert_eq!(app.selected_index, 0);

        for _ in 0..10 {
            app.navigate_down();
        }
        assert_eq!(app.selected_index, 5);
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new();

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_refresh_pass_is_skipped_while_in_flight() {
        let mut app = app();

        assert!(app.begin_refresh());
        assert!(!app.begin_refresh());

        app.apply_refresh_event(RefreshEvent::Finished { at: Local::now() });
        assert!(app.last_update.is_some());
        assert!(app.begin_refresh());
    }

    #[test]
    fn test_apply_card_and_index_updates() {
        let mut app = app();

        app.apply_refresh_event(RefreshEvent::CardUpdated(loaded_update("005930.KS", 71000.0, 70000.0)));
        app.apply_refresh_event(RefreshEvent::CardUpdated(CardUpdate {
            symbol: "000660.KS".to_string(),
            quote: None,
            chart: None,
        }));
        app.apply_refresh_event(RefreshEvent::IndexUpdated {
            symbol: "^KS11".to_string(),
            quote: Quote::from_prices(Some(2500.0), Some(2510.0), None),
        });

        assert!(app.cards[0].is_positive());
        assert_eq!(app.cards[1].placeholder(), "데이터 없음");
        assert!(app.indices[0].loaded);
        assert!(!app.indices[0].quote.as_ref().unwrap().is_positive());
    }

    #[test]
    fn test_show_and_hide_more() {
        let mut app = app();
        let extra = additional_stocks();

        let to_load = app.show_more(&extra);
        assert_eq!(to_load.len(), 6);
        assert_eq!(app.cards.len(), 12);
        assert!(app.show_more(&extra).is_empty());

        app.selected_index = 11;
        app.hide_more();
        assert_eq!(app.cards.len(), 6);
        assert_eq!(app.selected_index, 5);
        assert!(!app.show_additional);
    }

    #[test]
    fn test_open_modal_requires_chart() {
        let mut app = app();

        assert!(app.open_modal().is_none());
        assert!(app.is_on_dashboard());
        assert!(app.status_message.is_some());

        app.apply_refresh_event(RefreshEvent::CardUpdated(loaded_update("005930.KS", 71000.0, 70000.0)));
        assert_eq!(app.open_modal().as_deref(), Some("005930"));
        assert!(app.is_on_modal());

        let modal = app.modal.as_ref().unwrap();
        assert_eq!(modal.geometry.points.len(), 3);
        assert_eq!(modal.news, NewsState::Loading);

        app.close_modal();
        assert!(app.modal.is_none());
        assert!(app.is_on_dashboard());
    }

    #[test]
    fn test_modal_hover_and_news() {
        let mut app = app();
        app.apply_refresh_event(RefreshEvent::CardUpdated(loaded_update("005930.KS", 71000.0, 70000.0)));
        app.open_modal();

        let modal = app.modal.as_mut().unwrap();
        let last = *modal.geometry.points.last().unwrap();
        modal.hover_at(last.x - 5.0, last.y);
        assert_eq!(modal.tooltip().unwrap().label, "Jour 3");

        modal.hover_at(0.0, 0.0);
        assert!(modal.tooltip().is_none());

        // News d'un autre titre : ignorées
        app.set_news("000660", Ok(Vec::new()));
        assert_eq!(app.modal.as_ref().unwrap().news, NewsState::Loading);

        app.set_news("005930", Err("service indisponible".to_string()));
        assert_eq!(
            app.modal.as_ref().unwrap().news,
            NewsState::Failed("service indisponible".to_string())
        );
    }
}
