// ============================================================================
// Fenêtre de détail - grand graphique, statistiques, news
// ============================================================================
// S'ouvre par-dessus le tableau de bord (Entrée sur une carte) :
//
//   ┌ 삼성전자 (005930.KS) ─────────────────────────────┐
//   │ grand graphique 800x400 + infobulle au survol    │
//   ├──────────────────────────────────────────────────┤
//   │ min / max / moyenne / variation sur la période   │
//   ├──────────────────────────────────────────────────┤
//   │ news du titre (service compagnon)                │
//   └──────────────────────────────────────────────────┘
//
// Le découpage est exposé (modal_layout, chart_inner_area) pour que la
// boucle principale retrouve la zone du canevas et convertisse la position
// de la souris en pixels.
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{ChartModal, NewsState};
use crate::models::format::{format_change, format_price};
use crate::models::SeriesStats;
use crate::ui::chart::{chart_canvas, terminal_color};

/// Nombre maximal d'articles affichés
const MAX_NEWS: usize = 5;

/// Zones de la fenêtre de détail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalLayout {
    /// Cadre complet (effacé avant le rendu)
    pub frame: Rect,
    pub chart: Rect,
    pub stats: Rect,
    pub news: Rect,
    pub footer: Rect,
}

/// Découpe l'écran pour la fenêtre de détail
///
/// La fenêtre occupe 90 % de l'écran, centrée.
pub fn modal_layout(screen: Rect) -> ModalLayout {
    let frame = centered_rect(90, 90, screen);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),    // Graphique : tout le reste
            Constraint::Length(4),  // Statistiques
            Constraint::Length(8),  // News
            Constraint::Length(1),  // Raccourcis
        ])
        .split(frame);

    ModalLayout {
        frame,
        chart: chunks[0],
        stats: chunks[1],
        news: chunks[2],
        footer: chunks[3],
    }
}

/// Zone intérieure du canevas (sans la bordure du bloc)
pub fn chart_inner_area(screen: Rect) -> Rect {
    chart_block("").inner(modal_layout(screen).chart)
}

fn chart_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
}

/// Rect centré en pourcentage de la zone donnée
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

// ============================================================================
// Rendu
// ============================================================================

/// Dessine la fenêtre de détail par-dessus le tableau de bord
pub fn render_modal(frame: &mut Frame, modal: &ChartModal) {
    let layout = modal_layout(frame.size());

    // Efface le tableau de bord sous la fenêtre
    frame.render_widget(Clear, layout.frame);

    let title = format!(" {} ({}) - 30 jours ", modal.entry.name, modal.entry.symbol);
    let block = chart_block(&title).title_style(
        Style::default()
            .fg(terminal_color(modal.geometry.color))
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(
        chart_canvas(&modal.geometry, modal.hover.as_ref(), block),
        layout.chart,
    );

    render_stats(frame, modal.stats(), layout.stats);
    render_news(frame, &modal.news, layout.news);
    render_footer(frame, layout.footer);
}

fn render_stats(frame: &mut Frame, stats: Option<SeriesStats>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Statistiques ");

    let Some(stats) = stats else {
        frame.render_widget(Paragraph::new("데이터 없음").block(block), area);
        return;
    };

    let change_color = if stats.total_change > 0.0 {
        Color::Red
    } else {
        Color::Blue
    };
    let label = Style::default().fg(Color::Gray);

    let lines = vec![
        Line::from(vec![
            Span::styled("최저 ", label),
            Span::raw(format_price(stats.min)),
            Span::styled("   최고 ", label),
            Span::raw(format_price(stats.max)),
            Span::styled("   평균 ", label),
            Span::raw(format_price(stats.average.round())),
        ]),
        Line::from(vec![
            Span::styled("기간 변동 ", label),
            Span::styled(
                format_change(stats.total_change, stats.total_change_percent),
                Style::default().fg(change_color).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_news(frame: &mut Frame, news: &NewsState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📰 News ");

    let message = |text: String, color: Color| {
        Paragraph::new(Span::styled(text, Style::default().fg(color)))
            .block(block.clone())
            .wrap(Wrap { trim: true })
    };

    match news {
        NewsState::Loading => {
            frame.render_widget(message("뉴스를 불러오는 중...".to_string(), Color::Gray), area);
        }
        NewsState::Failed(error) => {
            frame.render_widget(message(format!("뉴스를 불러올 수 없습니다 : {}", error), Color::Red), area);
        }
        NewsState::Loaded(items) if items.is_empty() => {
            frame.render_widget(message("관련 뉴스가 없습니다".to_string(), Color::Gray), area);
        }
        NewsState::Loaded(items) => {
            let list: Vec<ListItem> = items
                .iter()
                .take(MAX_NEWS)
                .map(|item| {
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            item.title().to_string(),
                            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                        ),
                        Span::raw("  "),
                        Span::styled(item.meta_line(), Style::default().fg(Color::Gray)),
                    ]))
                })
                .collect();

            frame.render_widget(List::new(list).block(block), area);
        }
    }
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled("[Esc]", key),
        Span::raw(" Fermer  "),
        Span::styled("[e]", key),
        Span::raw(" Exporter PNG  "),
        Span::styled("[o]", key),
        Span::raw(" Page de cotation  "),
        Span::styled("Souris", key),
        Span::raw(" Survol des points"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}
