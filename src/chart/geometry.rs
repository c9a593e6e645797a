// ============================================================================
// Géométrie d'un graphique de prix
// ============================================================================
// Fonction pure : (série de prix, profil, tendance) -> géométrie en pixels.
// Aucune dépendance à l'affichage : la couche ui peint le résultat sur un
// Canvas ratatui et gère les événements souris.
//
// Algorithme commun aux deux profils :
// 1. min / max de la série ; étendue = max - min, ou 1 pour une série plate
// 2. marge visuelle de 5 % de l'étendue en haut et en bas
// 3. x linéaire en fonction de l'index ; y inversé (prix haut -> y petit)
//
// CONCEPTS RUST :
// 1. Enum avec données : PathSegment décrit un chemin comme un canvas 2D
// 2. Iterator fold : min et max en un seul passage
// 3. Valeur immuable : chaque rendu produit une nouvelle ChartGeometry
// ============================================================================

use crate::chart::hit_test;
use crate::chart::profile::{trend_color, ChartProfile, ProfileSpec, Rgba, MARKER_STROKE_COLOR};
use crate::models::format::format_price;

/// Nombre de divisions de l'axe des prix (grand graphique)
pub const GRID_DIVISIONS: usize = 5;

/// Part de l'étendue ajoutée au-dessus et en dessous de la courbe
const PRICE_PADDING_RATIO: f64 = 0.05;

/// Un échantillon placé sur le canevas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub price: f64,
    /// Position dans la série d'origine (0 = plus ancien)
    pub index: usize,
}

/// Élément d'un chemin, sur le modèle d'un contexte canvas 2D
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    /// Courbe quadratique : point de contrôle (cx, cy), arrivée (x, y)
    QuadTo { cx: f64, cy: f64, x: f64, y: f64 },
}

impl PathSegment {
    pub fn end(&self) -> (f64, f64) {
        match *self {
            PathSegment::MoveTo { x, y }
            | PathSegment::LineTo { x, y }
            | PathSegment::QuadTo { x, y, .. } => (x, y),
        }
    }
}

/// Arrêt de dégradé vertical (offset 0 = haut de la zone de tracé)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba,
}

/// Zone remplie sous la courbe
#[derive(Debug, Clone, PartialEq)]
pub struct AreaFill {
    /// Polygone fermé : ligne de base gauche, chaque point, ligne de base droite
    pub outline: Vec<(f64, f64)>,
    pub gradient_top: f64,
    pub gradient_bottom: f64,
    pub stops: [GradientStop; 2],
}

impl AreaFill {
    /// Couleur du dégradé à une ordonnée donnée
    pub fn color_at(&self, y: f64) -> Rgba {
        let [top, bottom] = self.stops;
        let span = self.gradient_bottom - self.gradient_top;
        let t = if span.abs() <= f64::EPSILON {
            0.0
        } else {
            ((y - self.gradient_top) / span).clamp(0.0, 1.0)
        };
        let offset_span = bottom.offset - top.offset;
        let local = if offset_span.abs() <= f64::EPSILON {
            0.0
        } else {
            ((t - top.offset) / offset_span).clamp(0.0, 1.0)
        };
        top.color.with_alpha(top.color.a + (bottom.color.a - top.color.a) * local)
    }
}

/// Contour d'un marqueur
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
}

/// Cercle plein posé sur un échantillon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub fill: Rgba,
    pub stroke: Option<Stroke>,
}

/// Ligne horizontale de grille avec son libellé de prix
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub y: f64,
    pub x_start: f64,
    pub x_end: f64,
    pub price: f64,
    pub label: String,
}

/// Résultat complet d'un rendu
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub profile: ChartProfile,
    pub spec: ProfileSpec,
    pub color: Rgba,
    pub points: Vec<PlotPoint>,
    pub line: Vec<PathSegment>,
    pub area: Option<AreaFill>,
    pub markers: Vec<Marker>,
    pub gridlines: Vec<GridLine>,
}

// ============================================================================
// Normalisation des prix
// ============================================================================

/// Projection prix -> pixels pour une série et un profil donnés
#[derive(Debug, Clone, Copy)]
struct PriceScale {
    min: f64,
    max: f64,
    range: f64,
    padding: f64,
    spec: ProfileSpec,
    count: usize,
}

impl PriceScale {
    fn new(prices: &[f64], spec: ProfileSpec) -> Self {
        let (min, max) = prices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &p| {
                (min.min(p), max.max(p))
            });

        // Série plate : étendue arbitraire pour éviter la division par zéro
        let spread = max - min;
        let range = if spread > f64::EPSILON { spread } else { 1.0 };

        Self {
            min,
            max,
            range,
            padding: range * PRICE_PADDING_RATIO,
            spec,
            count: prices.len(),
        }
    }

    fn x(&self, index: usize) -> f64 {
        let steps = if self.count > 1 { self.count - 1 } else { 1 };
        self.spec.padding.left + (index as f64 / steps as f64) * self.spec.chart_width()
    }

    fn y(&self, price: f64) -> f64 {
        let normalized = (price - self.min + self.padding) / (self.range + self.padding * 2.0);
        self.spec.baseline() - normalized * self.spec.chart_height()
    }
}

// ============================================================================
// Rendu
// ============================================================================

/// Calcule la géométrie d'une série pour un profil
///
/// La série doit déjà être complétée par l'appelant si elle est mince :
/// le renderer dessine ce qu'il reçoit. Une série vide donne une géométrie
/// vide ; un seul échantillon donne un seul point, sans ligne.
pub fn render_chart(prices: &[f64], profile: ChartProfile, positive: bool) -> ChartGeometry {
    let spec = profile.spec();
    let color = trend_color(positive);

    let mut geometry = ChartGeometry {
        profile,
        spec,
        color,
        points: Vec::new(),
        line: Vec::new(),
        area: None,
        markers: Vec::new(),
        gridlines: Vec::new(),
    };

    if prices.is_empty() {
        return geometry;
    }

    let scale = PriceScale::new(prices, spec);

    geometry.points = prices
        .iter()
        .enumerate()
        .map(|(index, &price)| PlotPoint {
            x: scale.x(index),
            y: scale.y(price),
            price,
            index,
        })
        .collect();

    if geometry.points.len() > 1 {
        geometry.area = Some(area_fill(&geometry.points, &spec, color));
    }

    match profile {
        ChartProfile::Compact => {
            geometry.line = smoothed_path(&geometry.points);
            geometry.markers = compact_markers(&geometry.points, color);
        }
        ChartProfile::Expanded => {
            geometry.gridlines = gridlines(&scale);
            geometry.line = straight_path(&geometry.points);
            geometry.markers = geometry
                .points
                .iter()
                .map(|p| Marker {
                    x: p.x,
                    y: p.y,
                    radius: 6.0,
                    fill: color,
                    stroke: Some(Stroke {
                        color: MARKER_STROKE_COLOR,
                        width: 2.0,
                    }),
                })
                .collect();
        }
    }

    geometry
}

/// Polygone du remplissage et son dégradé vertical
fn area_fill(points: &[PlotPoint], spec: &ProfileSpec, color: Rgba) -> AreaFill {
    let baseline = spec.baseline();
    let mut outline = Vec::with_capacity(points.len() + 2);
    outline.push((spec.padding.left, baseline));
    outline.extend(points.iter().map(|p| (p.x, p.y)));
    outline.push((spec.width - spec.padding.right, baseline));

    AreaFill {
        outline,
        gradient_top: spec.padding.top,
        gradient_bottom: baseline,
        stops: [
            GradientStop {
                offset: 0.0,
                color: color.with_alpha(spec.fill_top_alpha),
            },
            GradientStop {
                offset: 1.0,
                color: color.with_alpha(spec.fill_bottom_alpha),
            },
        ],
    }
}

/// Ligne lissée : premier segment droit, puis courbes quadratiques dont
/// le point de contrôle est l'échantillon précédent
fn smoothed_path(points: &[PlotPoint]) -> Vec<PathSegment> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut path = vec![PathSegment::MoveTo {
        x: points[0].x,
        y: points[0].y,
    }];

    for i in 1..points.len() {
        let curr = points[i];
        if i == 1 {
            path.push(PathSegment::LineTo { x: curr.x, y: curr.y });
        } else {
            let prev = points[i - 1];
            path.push(PathSegment::QuadTo {
                cx: prev.x,
                cy: prev.y,
                x: curr.x,
                y: curr.y,
            });
        }
    }

    path
}

fn straight_path(points: &[PlotPoint]) -> Vec<PathSegment> {
    if points.len() < 2 {
        return Vec::new();
    }

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i == 0 {
                PathSegment::MoveTo { x: p.x, y: p.y }
            } else {
                PathSegment::LineTo { x: p.x, y: p.y }
            }
        })
        .collect()
}

/// Marqueurs du petit graphique : départ atténué, dernier prix appuyé
fn compact_markers(points: &[PlotPoint], color: Rgba) -> Vec<Marker> {
    let marker = |p: &PlotPoint, radius: f64, alpha: f64| Marker {
        x: p.x,
        y: p.y,
        radius,
        fill: color.with_alpha(alpha),
        stroke: None,
    };

    match points {
        [] => Vec::new(),
        [only] => vec![marker(only, 3.0, 1.0)],
        [first, .., last] => vec![marker(last, 5.0, 1.0), marker(first, 3.0, 0.7)],
    }
}

/// Lignes de grille de l'axe des prix, du max (en haut) au min (en bas)
fn gridlines(scale: &PriceScale) -> Vec<GridLine> {
    let spec = scale.spec;

    (0..=GRID_DIVISIONS)
        .map(|i| {
            let ratio = i as f64 / GRID_DIVISIONS as f64;
            let price = scale.max - ratio * scale.range;
            GridLine {
                y: spec.padding.top + ratio * spec.chart_height(),
                x_start: spec.padding.left,
                x_end: spec.width - spec.padding.right,
                price,
                label: format_price(price),
            }
        })
        .collect()
}

// ============================================================================
// Requêtes sur la géométrie
// ============================================================================

impl ChartGeometry {
    /// Point le plus proche du pointeur (grand graphique uniquement)
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&PlotPoint> {
        match self.profile {
            ChartProfile::Expanded => hit_test::hit_test(&self.points, x, y),
            ChartProfile::Compact => None,
        }
    }

    /// Aplatit la ligne en polyligne, chaque courbe découpée en `steps` segments
    pub fn line_polyline(&self, steps: usize) -> Vec<(f64, f64)> {
        let steps = steps.max(1);
        let mut polyline = Vec::new();
        let mut cursor = (0.0, 0.0);

        for segment in &self.line {
            match *segment {
                PathSegment::MoveTo { x, y } | PathSegment::LineTo { x, y } => {
                    polyline.push((x, y));
                }
                PathSegment::QuadTo { cx, cy, x, y } => {
                    let (x0, y0) = cursor;
                    for s in 1..=steps {
                        let t = s as f64 / steps as f64;
                        let u = 1.0 - t;
                        polyline.push((
                            u * u * x0 + 2.0 * u * t * cx + t * t * x,
                            u * u * y0 + 2.0 * u * t * cy + t * t * y,
                        ));
                    }
                }
            }
            cursor = segment.end();
        }

        polyline
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::series::chart_series_for_quote;
    use crate::models::Quote;

    #[test]
    fn test_constant_series_is_flat() {
        let geometry = render_chart(&[100.0; 5], ChartProfile::Compact, true);

        assert_eq!(geometry.points.len(), 5);
        let y0 = geometry.points[0].y;
        assert!(y0.is_finite());
        assert!(geometry.points.iter().all(|p| p.y == y0));
    }

    #[test]
    fn test_higher_price_is_higher_on_screen() {
        let geometry = render_chart(&[10.0, 20.0, 15.0], ChartProfile::Expanded, false);
        let p = &geometry.points;

        assert!(p[1].y < p[2].y && p[2].y < p[0].y);
        // 5 % de marge : ni le min ni le max ne touchent les bords
        assert!(p[0].y < geometry.spec.baseline());
        assert!(p[1].y > geometry.spec.padding.top);
        assert_eq!(p[0].x, 80.0);
        assert_eq!(p[2].x, 760.0);
    }

    #[test]
    fn test_compact_path_smoothing() {
        let geometry = render_chart(&[1.0, 3.0, 2.0, 4.0], ChartProfile::Compact, true);

        assert!(matches!(geometry.line[0], PathSegment::MoveTo { .. }));
        assert!(matches!(geometry.line[1], PathSegment::LineTo { .. }));
        match geometry.line[2] {
            PathSegment::QuadTo { cx, cy, .. } => {
                assert_eq!((cx, cy), (geometry.points[1].x, geometry.points[1].y));
            }
            other => panic!("expected a curve, got {:?}", other),
        }
        assert!(geometry.gridlines.is_empty());

        // Dernier point opaque r5, premier point r3 à 70 %
        assert_eq!(geometry.markers.len(), 2);
        assert_eq!(geometry.markers[0].radius, 5.0);
        assert_eq!(geometry.markers[1].radius, 3.0);
        assert_eq!(geometry.markers[1].fill.a, 0.7);
    }

    #[test]
    fn test_expanded_gridlines_and_markers() {
        let geometry = render_chart(&[100.0, 150.0, 200.0], ChartProfile::Expanded, true);

        assert_eq!(geometry.gridlines.len(), GRID_DIVISIONS + 1);
        assert_eq!(geometry.gridlines[0].price, 200.0);
        assert_eq!(geometry.gridlines[5].price, 100.0);
        assert_eq!(geometry.gridlines[0].label, "200원");
        assert_eq!(geometry.gridlines[0].y, 20.0);
        assert_eq!(geometry.gridlines[5].y, 360.0);

        assert!(geometry.line[1..].iter().all(|s| matches!(s, PathSegment::LineTo { .. })));
        assert_eq!(geometry.markers.len(), 3);
        assert!(geometry.markers.iter().all(|m| m.radius == 6.0 && m.stroke.is_some()));
        assert_eq!(geometry.color, crate::chart::profile::POSITIVE_COLOR);
    }

    #[test]
    fn test_single_sample_is_a_point() {
        let geometry = render_chart(&[42.0], ChartProfile::Compact, false);

        assert_eq!(geometry.points.len(), 1);
        assert!(geometry.line.is_empty());
        assert!(geometry.area.is_none());
        assert_eq!(geometry.markers.len(), 1);
        assert_eq!(geometry.points[0].x, 10.0);
    }

    #[test]
    fn test_empty_series() {
        let geometry = render_chart(&[], ChartProfile::Expanded, true);
        assert!(geometry.points.is_empty());
        assert!(geometry.gridlines.is_empty());
        assert!(geometry.hit_test(0.0, 0.0).is_none());
    }

    #[test]
    fn test_thin_series_padded_renders_a_line() {
        let quote = Quote::from_prices(Some(71000.0), Some(70000.0), None).unwrap();
        let single = crate::models::PriceSeries::new(vec![70500.0]);
        let padded = chart_series_for_quote(Some(&single), &quote);

        let geometry = render_chart(padded.prices(), ChartProfile::Compact, true);

        assert!(geometry.points.len() >= 3);
        assert!(geometry.line.len() >= 3);
        assert!(geometry.line_polyline(8).len() > geometry.points.len());
    }

    #[test]
    fn test_render_is_idempotent() {
        let prices = [70000.0, 70500.0, 69800.0, 71200.0];
        let first = render_chart(&prices, ChartProfile::Expanded, true);
        let second = render_chart(&prices, ChartProfile::Expanded, true);
        assert_eq!(first, second);
    }

    #[test]
    fn test_hit_test_only_on_expanded() {
        let prices = [1.0, 2.0, 3.0];
        let compact = render_chart(&prices, ChartProfile::Compact, true);
        let p = compact.points[0];
        assert!(compact.hit_test(p.x, p.y).is_none());

        let expanded = render_chart(&prices, ChartProfile::Expanded, true);
        let p = expanded.points[2];
        assert_eq!(expanded.hit_test(p.x + 3.0, p.y - 3.0).map(|h| h.index), Some(2));
    }

    #[test]
    fn test_gradient_fades_downwards() {
        let geometry = render_chart(&[1.0, 2.0], ChartProfile::Compact, true);
        let area = geometry.area.unwrap();

        assert_eq!(area.outline.len(), 4);
        assert_eq!(area.outline[0], (10.0, 90.0));
        assert_eq!(area.outline[3], (290.0, 90.0));
        assert!((area.color_at(area.gradient_top).a - 0.25).abs() < 1e-9);
        assert!((area.color_at(area.gradient_bottom).a - 0.05).abs() < 1e-9);
    }
}
