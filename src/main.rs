// ============================================================================
// StockBoard - Tableau de bord boursier dans le terminal
// ============================================================================
// Cartes d'actions, indices et meilleures progressions, rafraîchis toutes
// les 30 secondes. Entrée ouvre la fenêtre de détail (grand graphique avec
// survol à la souris, statistiques, news).
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Worker thread + runtime tokio : les appels réseau ne bloquent pas l'UI
// 4. Channels mpsc : commandes vers le worker, résultats vers l'UI
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{debug, error, info, warn};

use stockboard::api::{CompanionClient, NewsItem, QuoteResolver, ReqwestFetcher};
use stockboard::app::App;
use stockboard::config::AppConfig;
use stockboard::models::{IndexEntry, StockEntry};
use stockboard::refresh::{refresh_all, refresh_cards, RefreshEvent};
use stockboard::ui::chart::cell_to_canvas;
use stockboard::ui::events::Event;
use stockboard::ui::modal::chart_inner_area;
use stockboard::ui::{render, EventHandler};

// ============================================================================
// AppCommand / AppResult : dialogue avec le worker thread
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Passe complète : cartes, indices, classement
    RefreshAll {
        cards: Vec<StockEntry>,
        indices: Vec<IndexEntry>,
    },

    /// "Voir plus" : ne résout que les cartes ajoutées
    LoadMore { cards: Vec<StockEntry> },

    /// News d'un titre (code court, ex: "005930")
    LoadNews { code: String },

    /// Export PNG du graphique via le service compagnon
    ExportChart { symbol: String, name: String },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Une étape de la passe de rafraîchissement
    Refresh(RefreshEvent),

    /// Fin du chargement "voir plus"
    LoadMoreDone,

    NewsLoaded {
        code: String,
        result: Result<Vec<NewsItem>, String>,
    },

    /// Chemin du fichier écrit, ou message d'erreur
    ExportDone(Result<PathBuf, String>),
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier, avec rotation quotidienne.
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans :
/// - Linux/WSL : ~/.local/share/stockboard/logs/stockboard.log
/// - macOS : ~/Library/Application Support/stockboard/logs/stockboard.log
/// - Windows : C:\Users\<user>\AppData\Local\stockboard\logs\stockboard.log
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/stockboard/logs/stockboard.log
/// RUST_LOG=stockboard=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("stockboard").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "stockboard.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // RUST_LOG prend le dessus ; par défaut debug pour stockboard,
            // info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockboard=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("StockBoard starting up");

    let config = AppConfig::default();

    // Les clients HTTP sont construits avant le terminal : une erreur
    // s'affiche alors normalement sur stderr
    let resolver = QuoteResolver::new(ReqwestFetcher::new()?, config.resolver.clone());
    let companion = CompanionClient::new(&config.companion)?;

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, resolver, companion, config.clone());

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::with_catalogue(&config.watchlist, &config.indices);
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &config, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// Le worker possède le resolver, le client compagnon et son propre runtime
// tokio. Les commandes sont exécutées une par une (block_on) : deux passes
// ne peuvent jamais se chevaucher.
// ============================================================================

fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    resolver: QuoteResolver<ReqwestFetcher>,
    companion: CompanionClient,
    config: AppConfig,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime, worker exiting");
                return;
            }
        };

        // Channel fermé (UI terminée) : on quitte
        while let Ok(command) = command_rx.recv() {
            debug!(?command, "Worker received command");

            match command {
                AppCommand::RefreshAll { cards, indices } => {
                    runtime.block_on(refresh_all(&resolver, &config.refresh, &cards, &indices, |event| {
                        let _ = result_tx.send(AppResult::Refresh(event));
                    }));
                }

                AppCommand::LoadMore { cards } => {
                    info!(count = cards.len(), "Loading additional stocks");
                    let mut forward = |event| {
                        let _ = result_tx.send(AppResult::Refresh(event));
                    };
                    runtime.block_on(refresh_cards(&resolver, &config.refresh, &cards, &mut forward));
                    let _ = result_tx.send(AppResult::LoadMoreDone);
                }

                AppCommand::LoadNews { code } => {
                    let result = runtime
                        .block_on(companion.fetch_news(&code))
                        .map_err(|e| format!("{:#}", e));
                    if let Err(error) = &result {
                        warn!(%code, %error, "News unavailable");
                    }
                    let _ = result_tx.send(AppResult::NewsLoaded { code, result });
                }

                AppCommand::ExportChart { symbol, name } => {
                    let result = std::env::current_dir()
                        .context("Répertoire courant introuvable")
                        .and_then(|dir| runtime.block_on(companion.export_chart_to(&symbol, &name, &dir)))
                        .map_err(|e| format!("{:#}", e));
                    let _ = result_tx.send(AppResult::ExportDone(result));
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. appliquer les résultats du worker
//   1. lancer la passe périodique si l'intervalle est écoulé
//   2. dessiner l'interface
//   3. traiter l'événement clavier / souris
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &AppConfig,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    // Passe initiale au démarrage
    request_refresh(app, &command_tx);
    let mut last_refresh = Instant::now();

    while app.is_running() {
        // 0. Résultats du worker, sans bloquer
        loop {
            match result_rx.try_recv() {
                Ok(result) => apply_result(app, result),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // 1. Passe périodique (ignorée si une passe tourne encore)
        if last_refresh.elapsed() >= config.refresh.interval {
            last_refresh = Instant::now();
            request_refresh(app, &command_tx);
        }

        // 2. Rendu
        terminal.draw(|frame| render(frame, app))?;

        // 3. Événements
        match events.next() {
            Ok(event) => handle_event(app, config, event, &command_tx),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }

        app.tick();
    }

    Ok(())
}

/// Envoie une passe complète au worker, sauf si une passe est en cours
fn request_refresh(app: &mut App, command_tx: &mpsc::Sender<AppCommand>) {
    if !app.begin_refresh() {
        debug!("Refresh already in flight, skipped");
        return;
    }

    let command = AppCommand::RefreshAll {
        cards: app.card_entries(),
        indices: app.index_entries(),
    };
    if command_tx.send(command).is_err() {
        error!("Worker unavailable, refresh not sent");
        app.finish_refresh();
    }
}

fn apply_result(app: &mut App, result: AppResult) {
    match result {
        AppResult::Refresh(event) => app.apply_refresh_event(event),
        AppResult::LoadMoreDone => {
            info!("Additional stocks loaded");
            app.finish_refresh();
        }
        AppResult::NewsLoaded { code, result } => app.set_news(&code, result),
        AppResult::ExportDone(Ok(path)) => {
            info!(path = %path.display(), "Chart exported");
            app.set_status(format!("Graphique exporté : {}", path.display()));
        }
        AppResult::ExportDone(Err(error)) => {
            error!(%error, "Chart export failed");
            app.set_status(format!("Export impossible : {}", error));
        }
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================

fn handle_event(app: &mut App, config: &AppConfig, event: Event, command_tx: &mpsc::Sender<AppCommand>) {
    use stockboard::ui::events::{
        is_down_event, is_enter_event, is_escape_event, is_export_event, is_more_event,
        is_open_page_event, is_quit_event, is_refresh_event, is_up_event, mouse_position,
    };

    // Toute touche efface le message de statut précédent
    if matches!(event, Event::Key(_)) && !is_quit_event(&event) {
        app.status_message = None;
    }

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            // Première pression : confirmation ; deuxième : quit réel
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_up_event(&event) && app.is_on_dashboard() => {
            app.cancel_quit();
            app.navigate_up();
        }
        Event::Key(_) if is_down_event(&event) && app.is_on_dashboard() => {
            app.cancel_quit();
            app.navigate_down();
        }

        Event::Key(_) if is_enter_event(&event) && app.is_on_dashboard() => {
            app.cancel_quit();
            if let Some(code) = app.open_modal() {
                info!(%code, "User opened chart modal");
                let _ = command_tx.send(AppCommand::LoadNews { code });
            }
        }

        Event::Key(_) if is_escape_event(&event) && app.is_on_modal() => {
            app.cancel_quit();
            debug!("User closed chart modal");
            app.close_modal();
        }

        Event::Key(_) if is_refresh_event(&event) => {
            app.cancel_quit();
            info!("User requested manual refresh");
            request_refresh(app, command_tx);
        }

        Event::Key(_) if is_more_event(&event) && app.is_on_dashboard() => {
            app.cancel_quit();
            if app.show_additional {
                info!("User hid additional stocks");
                app.hide_more();
            } else if app.begin_refresh() {
                let cards = app.show_more(&config.additional_stocks);
                info!(count = cards.len(), "User requested additional stocks");
                app.start_loading(Some(format!("Chargement de {} actions...", cards.len())));
                if command_tx.send(AppCommand::LoadMore { cards }).is_err() {
                    app.finish_refresh();
                }
            } else {
                app.set_status("Mise à jour en cours, réessayez dans un instant");
            }
        }

        Event::Key(_) if is_export_event(&event) => {
            app.cancel_quit();
            if let Some(entry) = app.focused_entry().cloned() {
                info!(symbol = %entry.symbol, "User requested chart export");
                app.set_status(format!("Export du graphique de {}...", entry.name));
                let _ = command_tx.send(AppCommand::ExportChart {
                    symbol: entry.symbol,
                    name: entry.name,
                });
            }
        }

        Event::Key(_) if is_open_page_event(&event) => {
            app.cancel_quit();
            if let Some(url) = app.focused_entry().map(StockEntry::quote_page_url) {
                app.set_status(format!("Page de cotation : {}", url));
            }
        }

        Event::Mouse(_) => {
            if let Some((column, row)) = mouse_position(&event) {
                update_hover(app, column, row);
            }
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation si active
            app.cancel_quit();
        }

        Event::Tick => {}
    }
}

/// Met à jour le point survolé du grand graphique
fn update_hover(app: &mut App, column: u16, row: u16) {
    let Some(modal) = app.modal.as_mut() else {
        return;
    };

    let screen = match terminal::size() {
        Ok((width, height)) => Rect::new(0, 0, width, height),
        Err(_) => return,
    };

    let inner = chart_inner_area(screen);
    match cell_to_canvas(inner, column, row, &modal.geometry.spec) {
        Some((x, y)) => modal.hover_at(x, y),
        None => modal.clear_hover(),
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    // Écran secondaire + souris (survol du grand graphique)
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
