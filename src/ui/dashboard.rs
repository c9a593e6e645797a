// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine le tableau de bord avec les widgets de ratatui :
//
//   ┌ header : titre + heure de la dernière mise à jour ┐
//   │ indices : KOSPI | KOSDAQ | DJI                    │
//   │ cartes (liste)        │ petit graphique           │
//   │                       │ meilleures progressions   │
//   └ footer : raccourcis / confirmation / statut       ┘
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Canvas : petits graphiques (voir ui/chart.rs)
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, IndexCard, Screen, StockCard};
use crate::chart::profile::trend_color;
use crate::chart::{render_chart, ChartProfile};
use crate::models::format::{format_change, format_number, format_price};
use crate::refresh::RankedGainer;
use crate::ui::chart::{chart_canvas, terminal_color};
use crate::ui::modal::render_modal;

/// Dessine l'interface complète
///
/// La fenêtre de détail se dessine par-dessus le tableau de bord.
pub fn render(frame: &mut Frame, app: &App) {
    render_dashboard(frame, app);

    if app.current_screen == Screen::ChartModal {
        if let Some(modal) = &app.modal {
            render_modal(frame, modal);
        }
    }
}

fn render_dashboard(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(4), // Indices
            Constraint::Min(0),    // Cartes + panneau de droite
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    render_header(frame, app, chunks[0]);
    render_indices(frame, &app.indices, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);

    render_cards(frame, app, body[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(body[1]);

    render_selected_chart(frame, app.selected_card(), side[0]);
    render_gainers(frame, &app.gainers, side[1]);

    render_footer(frame, app, chunks[3]);
}

fn cyan_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = cyan_block(" StockBoard ").title_alignment(Alignment::Center);

    let update = match app.last_update {
        Some(at) => format!("마지막 업데이트 : {}", at.format("%H:%M:%S")),
        None => "업데이트 대기 중".to_string(),
    };

    let mut spans = vec![
        Span::styled(
            "📈 주식 대시보드",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(update, Style::default().fg(Color::Gray)),
    ];
    if app.refresh_in_flight {
        spans.push(Span::styled("  ⟳", Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Indices
// ============================================================================

fn render_indices(frame: &mut Frame, indices: &[IndexCard], area: Rect) {
    if indices.is_empty() {
        return;
    }

    let constraints: Vec<Constraint> = indices
        .iter()
        .map(|_| Constraint::Ratio(1, indices.len() as u32))
        .collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (index, column) in indices.iter().zip(columns.iter()) {
        let block = cyan_block(&index.entry.label);

        let lines = match &index.quote {
            Some(quote) => {
                let color = terminal_color(trend_color(quote.is_positive()));
                vec![
                    Line::from(Span::styled(
                        format_price(quote.price),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format_change(quote.change, quote.change_percent),
                        Style::default().fg(color),
                    )),
                ]
            }
            None => {
                let text = if index.loaded { "데이터 없음" } else { "로딩 중..." };
                vec![Line::from(Span::styled(text, Style::default().fg(Color::Gray)))]
            }
        };

        frame.render_widget(
            Paragraph::new(lines).block(block).alignment(Alignment::Center),
            *column,
        );
    }
}

// ============================================================================
// Cartes
// ============================================================================

fn card_line(card: &StockCard) -> (String, Style) {
    match &card.quote {
        Some(quote) => {
            let color = terminal_color(trend_color(card.is_positive()));
            let line = format!(
                " {:<12} {:>14}  {:<22} 거래량 {}",
                card.entry.name,
                format_price(quote.price),
                format_change(quote.change, quote.change_percent),
                format_number(quote.volume),
            );
            (line, Style::default().fg(color))
        }
        None => {
            let line = format!(" {:<12} {:>14}", card.entry.name, card.placeholder());
            (line, Style::default().fg(Color::Gray))
        }
    }
}

fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.show_additional {
        " 📊 관심 종목 (+ 추가 종목) "
    } else {
        " 📊 관심 종목 "
    };
    let block = cyan_block(title);

    if app.cards.is_empty() {
        let paragraph = Paragraph::new(Span::styled("종목 없음", Style::default().fg(Color::Gray)))
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .cards
        .iter()
        .enumerate()
        .map(|(index, card)| {
            let (line, style) = card_line(card);
            let style = if index == app.selected_index {
                style.add_modifier(Modifier::BOLD).add_modifier(Modifier::REVERSED)
            } else {
                style
            };
            ListItem::new(line).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Petit graphique de la carte sélectionnée
fn render_selected_chart(frame: &mut Frame, card: Option<&StockCard>, area: Rect) {
    let Some(card) = card else {
        frame.render_widget(cyan_block(" 차트 "), area);
        return;
    };

    let title = format!(" {} ({}) ", card.entry.name, card.entry.symbol);

    match &card.chart {
        Some(series) => {
            let geometry = render_chart(series.prices(), ChartProfile::Compact, card.is_positive());
            frame.render_widget(chart_canvas(&geometry, None, cyan_block(&title)), area);
        }
        None => {
            let paragraph = Paragraph::new(Span::styled(card.placeholder(), Style::default().fg(Color::Gray)))
                .block(cyan_block(&title))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
        }
    }
}

// ============================================================================
// Meilleures progressions
// ============================================================================

fn render_gainers(frame: &mut Frame, gainers: &[RankedGainer], area: Rect) {
    let block = cyan_block(" 🏆 한 달 상승률 TOP ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if gainers.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("계산 중...", Style::default().fg(Color::Gray)))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let constraints: Vec<Constraint> = gainers
        .iter()
        .map(|_| Constraint::Ratio(1, gainers.len() as u32))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (rank, (ranked, row)) in gainers.iter().zip(rows.iter()).enumerate() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(*row);

        let gainer = &ranked.gainer;
        let positive = gainer.change >= 0.0;
        let color = terminal_color(trend_color(positive));

        let lines = vec![
            Line::from(vec![
                Span::styled(format!("{}. ", rank + 1), Style::default().fg(Color::Yellow)),
                Span::styled(gainer.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!(" {}", gainer.code), Style::default().fg(Color::Gray)),
            ]),
            Line::from(vec![
                Span::raw(format_price(gainer.current_price)),
                Span::raw(" "),
                Span::styled(
                    format!("{:+.2}%", gainer.change_percent),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), columns[0]);

        let geometry = render_chart(ranked.chart.prices(), ChartProfile::Compact, positive);
        frame.render_widget(chart_canvas(&geometry, None, Block::default()), columns[1]);
    }
}

// ============================================================================
// Footer
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = cyan_block("");
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let warning = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", warning),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(" à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠", warning),
        ])
    } else if let Some(status) = &app.status_message {
        Line::from(Span::styled(status.clone(), Style::default().fg(Color::White)))
    } else if app.is_loading {
        let message = app.loading_message.as_deref().unwrap_or("Chargement...");
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray)))
    } else {
        let more = if app.show_additional { " Masquer  " } else { " Voir plus  " };
        Line::from(vec![
            Span::styled("[q]", key),
            Span::raw(" Quit  "),
            Span::styled("[↑↓ / j k]", key),
            Span::raw(" Navigate  "),
            Span::styled("[Enter]", key),
            Span::raw(" Détail  "),
            Span::styled("[r]", key),
            Span::raw(" Refresh  "),
            Span::styled("[m]", key),
            Span::raw(more),
            Span::styled("[e]", key),
            Span::raw(" Export  "),
            Span::styled("[o]", key),
            Span::raw(" Page"),
        ])
    };

    let paragraph = Paragraph::new(line)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
