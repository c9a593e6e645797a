// ============================================================================
// Chart - Peinture d'une ChartGeometry dans le terminal
// ============================================================================
// La géométrie est calculée en pixels (300x100 ou 800x400, origine en haut
// à gauche). Ici on la reporte sur un Canvas ratatui, dont l'origine est en
// bas à gauche : chaque ordonnée est retournée (y -> hauteur - y).
//
// Le terminal ne connaît pas la transparence : le dégradé est approché par
// des colonnes verticales dont la couleur est mélangée au fond.
//
// CONCEPTS RATATUI :
// 1. Canvas : dessin libre avec des formes (Line, Circle, Points)
// 2. Marker::Braille : 2x4 points par cellule, la meilleure résolution
// 3. ctx.layer() : superpose les couches (remplissage, ligne, marqueurs)
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker as CanvasMarker,
    text::{Line as TextLine, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line, Points},
        Block, Widget,
    },
};

use crate::chart::geometry::AreaFill;
use crate::chart::profile::{ProfileSpec, Rgba};
use crate::chart::{ChartGeometry, PlotPoint, Tooltip};

/// Fond supposé du terminal pour mélanger les couleurs translucides
const BACKGROUND: Rgba = Rgba::rgb(0, 0, 0);

/// Nombre de bandes de couleur par colonne du dégradé
const FILL_BANDS: usize = 4;

/// Segments par courbe quadratique lors de l'aplatissement
const CURVE_STEPS: usize = 8;

/// Convertit une couleur RGBA en couleur terminal (opaque)
pub fn terminal_color(color: Rgba) -> Color {
    let opaque = color.over(BACKGROUND);
    Color::Rgb(opaque.r, opaque.g, opaque.b)
}

/// Widget Canvas prêt à dessiner une géométrie
///
/// `hover` met en évidence le point survolé et affiche son infobulle.
pub fn chart_canvas<'a>(
    geometry: &'a ChartGeometry,
    hover: Option<&'a PlotPoint>,
    block: Block<'a>,
) -> impl Widget + 'a {
    let spec = geometry.spec;

    Canvas::default()
        .block(block)
        .marker(CanvasMarker::Braille)
        .x_bounds([0.0, spec.width])
        .y_bounds([0.0, spec.height])
        .paint(move |ctx| paint(ctx, geometry, hover))
}

fn paint(ctx: &mut Context, geometry: &ChartGeometry, hover: Option<&PlotPoint>) {
    let spec = geometry.spec;
    let flip = |y: f64| spec.height - y;

    // Grille et étiquettes de prix (grand graphique)
    for grid in &geometry.gridlines {
        ctx.draw(&Line::new(
            grid.x_start,
            flip(grid.y),
            grid.x_end,
            flip(grid.y),
            Color::DarkGray,
        ));
        ctx.print(
            0.0,
            flip(grid.y),
            TextLine::from(Span::styled(grid.label.clone(), Style::default().fg(Color::Gray))),
        );
    }
    ctx.layer();

    // Remplissage en dégradé sous la courbe
    if let Some(area) = &geometry.area {
        paint_fill(ctx, area, &spec);
        ctx.layer();
    }

    // Ligne (courbes aplaties en segments)
    let color = terminal_color(geometry.color);
    let polyline = geometry.line_polyline(CURVE_STEPS);
    for pair in polyline.windows(2) {
        let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
        ctx.draw(&Line::new(x1, flip(y1), x2, flip(y2), color));
    }
    ctx.layer();

    // Marqueurs
    for marker in &geometry.markers {
        let fill = terminal_color(marker.fill);
        ctx.draw(&Points {
            coords: &[(marker.x, flip(marker.y))],
            color: fill,
        });
        ctx.draw(&Circle {
            x: marker.x,
            y: flip(marker.y),
            radius: marker.radius,
            color: marker.stroke.map(|s| terminal_color(s.color)).unwrap_or(fill),
        });
    }

    // Point survolé + infobulle
    if let Some(point) = hover {
        ctx.layer();
        ctx.draw(&Circle {
            x: point.x,
            y: flip(point.y),
            radius: 10.0,
            color: Color::Yellow,
        });

        let tooltip = Tooltip::for_point(point);
        // L'infobulle passe à gauche du point près du bord droit
        let x = if point.x + 160.0 > spec.width {
            point.x - 160.0
        } else {
            point.x + 15.0
        };
        ctx.print(
            x.max(0.0),
            flip(point.y) + 20.0,
            TextLine::from(vec![
                Span::styled(tooltip.label, Style::default().fg(Color::Yellow)),
                Span::raw(" "),
                Span::styled(tooltip.price, Style::default().fg(Color::White)),
            ]),
        );
    }
}

/// Approche le dégradé par des colonnes verticales découpées en bandes
fn paint_fill(ctx: &mut Context, area: &AreaFill, spec: &ProfileSpec) {
    let flip = |y: f64| spec.height - y;
    let columns = fill_columns(area, (spec.chart_width() / 4.0).ceil() as usize);

    for (x, top) in columns {
        let bottom = area.gradient_bottom;
        let band_height = (bottom - top) / FILL_BANDS as f64;
        if band_height <= 0.0 {
            continue;
        }

        for band in 0..FILL_BANDS {
            let y1 = top + band as f64 * band_height;
            let y2 = y1 + band_height;
            let color = terminal_color(area.color_at((y1 + y2) / 2.0));
            ctx.draw(&Line::new(x, flip(y1), x, flip(y2), color));
        }
    }
}

/// Échantillonne le haut du polygone de remplissage en `count` colonnes
///
/// Retourne (x, y du haut) ; le polygone est parcouru sans ses deux points
/// de ligne de base.
pub fn fill_columns(area: &AreaFill, count: usize) -> Vec<(f64, f64)> {
    let outline = &area.outline;
    if outline.len() < 4 || count == 0 {
        return Vec::new();
    }

    let curve = &outline[1..outline.len() - 1];
    let (start, end) = (curve[0].0, curve[curve.len() - 1].0);
    let steps = count.max(2);

    (0..steps)
        .map(|i| {
            let x = start + (end - start) * i as f64 / (steps - 1) as f64;
            (x, interpolate(curve, x))
        })
        .collect()
}

/// Ordonnée de la polyligne `curve` (x croissants) à l'abscisse x
fn interpolate(curve: &[(f64, f64)], x: f64) -> f64 {
    for pair in curve.windows(2) {
        let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
        if x >= x1 && x <= x2 {
            if (x2 - x1).abs() <= f64::EPSILON {
                return y1;
            }
            return y1 + (y2 - y1) * (x - x1) / (x2 - x1);
        }
    }
    curve.last().map(|&(_, y)| y).unwrap_or(0.0)
}

/// Convertit une cellule du terminal en position pixel du canevas
///
/// `inner` est la zone intérieure du Canvas (sans bordure). Retourne None
/// si la cellule est en dehors.
pub fn cell_to_canvas(inner: Rect, column: u16, row: u16, spec: &ProfileSpec) -> Option<(f64, f64)> {
    let inside = column >= inner.x
        && column < inner.x + inner.width
        && row >= inner.y
        && row < inner.y + inner.height;
    if !inside {
        return None;
    }

    // Centre de la cellule
    let fx = (column - inner.x) as f64 + 0.5;
    let fy = (row - inner.y) as f64 + 0.5;

    Some((
        fx / inner.width as f64 * spec.width,
        fy / inner.height as f64 * spec.height,
    ))
}

// ============================================================================
// Tests unitaires
// ============================================================================
