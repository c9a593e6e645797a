// ============================================================================
// Structure : PriceSeries
// ============================================================================
// Suite ordonnée de prix de clôture (un par jour de bourse, du plus ancien
// au plus récent). C'est l'entrée du Chart Renderer.
//
// CONCEPTS RUST :
// 1. Newtype : PriceSeries enveloppe un Vec<f64> sans null possible
// 2. Iterator fold : min/max/somme en un seul passage
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::Quote;

/// En dessous de ce nombre de points, une série est "mince"
pub const THIN_SERIES_LEN: usize = 3;

/// Série de prix ordonnée chronologiquement
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Crée une série à partir de prix déjà filtrés
    ///
    /// Les valeurs non finies (NaN, infini) sont écartées : aucun "trou"
    /// ne doit arriver jusqu'au renderer.
    pub fn new(prices: Vec<f64>) -> Self {
        Self {
            prices: prices.into_iter().filter(|p| p.is_finite()).collect(),
        }
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Moins de 3 points : l'appelant doit compléter avant de dessiner
    pub fn is_thin(&self) -> bool {
        self.prices.len() < THIN_SERIES_LEN
    }

    pub fn first(&self) -> Option<f64> {
        self.prices.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    /// Statistiques affichées dans la fenêtre de détail
    pub fn stats(&self) -> Option<SeriesStats> {
        SeriesStats::compute(&self.prices)
    }
}

// ============================================================================
// Synthèse des séries minces
// ============================================================================
// Le renderer ne complète jamais une série : c'est le rôle de l'appelant.
// Ces fonctions produisent toujours au moins 3 points.
// ============================================================================

/// Prépare la série à dessiner pour une carte à partir de l'historique
/// (éventuellement absent) et de la cotation courante
///
/// - historique >= 3 points : utilisé tel quel
/// - historique de 1 ou 2 points : complété par une petite rampe vers le prix
/// - pas d'historique : rampe synthétique clôture précédente -> prix actuel
pub fn chart_series_for_quote(history: Option<&PriceSeries>, quote: &Quote) -> PriceSeries {
    match history {
        Some(series) if !series.is_thin() => series.clone(),
        Some(series) if !series.is_empty() => {
            let price = quote.price;
            let mut prices = series.prices.clone();
            prices.extend([price * 0.998, price * 0.999, price]);
            PriceSeries::new(prices)
        }
        _ => {
            let previous_close = quote.previous_close.unwrap_or(quote.price);
            ramp(previous_close, quote.price)
        }
    }
}

/// Rampe en cinq points d'un prix de départ vers un prix d'arrivée
///
/// Utilisée aussi pour les meilleures progressions quand l'historique manque.
pub fn ramp(from: f64, to: f64) -> PriceSeries {
    PriceSeries::new(vec![from * 0.98, from * 0.99, from, to * 0.995, to])
}

// ============================================================================
// Statistiques
// ============================================================================

/// Statistiques d'une série (min, max, moyenne, variation sur la période)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub first: f64,
    pub last: f64,
    pub total_change: f64,
    pub total_change_percent: f64,
}

impl SeriesStats {
    fn compute(prices: &[f64]) -> Option<Self> {
        let first = *prices.first()?;
        let last = *prices.last()?;

        // CONCEPT RUST : fold pour min/max/somme en un seul passage
        let (min, max, sum) = prices.iter().fold(
            (f64::MAX, f64::MIN, 0.0),
            |(min, max, sum), &p| (min.min(p), max.max(p), sum + p),
        );

        let total_change = last - first;
        let total_change_percent = if first != 0.0 {
            total_change / first * 100.0
        } else {
            0.0
        };

        Some(Self {
            min,
            max,
            average: sum / prices.len() as f64,
            first,
            last,
            total_change,
            total_change_percent,
        })
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price: f64, previous_close: f64) -> Quote {
        Quote::from_prices(Some(price), Some(previous_close), None).unwrap()
    }

    #[test]
    fn test_new_drops_non_finite_values() {
        let series = PriceSeries::new(vec![1.0, f64::NAN, 2.0, f64::INFINITY, 3.0]);
        assert_eq!(series.prices(), &[1.0, 2.0, 3.0]);
        assert!(!series.is_thin());
    }

    #[test]
    fn test_long_history_used_as_is() {
        let history = PriceSeries::new(vec![10.0, 11.0, 12.0, 13.0]);
        let series = chart_series_for_quote(Some(&history), &quote(13.0, 12.0));
        assert_eq!(series, history);
    }

    #[test]
    fn test_single_point_history_is_extended() {
        let history = PriceSeries::new(vec![100.0]);
        let series = chart_series_for_quote(Some(&history), &quote(200.0, 190.0));

        assert_eq!(series.len(), 4);
        assert_eq!(series.first(), Some(100.0));
        assert_eq!(series.last(), Some(200.0));
        assert!(!series.is_thin());
    }

    #[test]
    fn test_missing_history_builds_ramp() {
        let series = chart_series_for_quote(None, &quote(105.0, 100.0));

        assert_eq!(series.len(), 5);
        assert!((series.prices()[0] - 98.0).abs() < 1e-9);
        assert!((series.prices()[2] - 100.0).abs() < 1e-9);
        assert_eq!(series.last(), Some(105.0));
    }

    #[test]
    fn test_empty_history_builds_ramp() {
        let empty = PriceSeries::default();
        let series = chart_series_for_quote(Some(&empty), &quote(105.0, 100.0));
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn test_stats() {
        let series = PriceSeries::new(vec![100.0, 120.0, 80.0, 110.0]);
        let stats = series.stats().unwrap();

        assert_eq!(stats.min, 80.0);
        assert_eq!(stats.max, 120.0);
        assert_eq!(stats.average, 102.5);
        assert_eq!(stats.total_change, 10.0);
        assert!((stats.total_change_percent - 10.0).abs() < 1e-9);

        assert!(PriceSeries::default().stats().is_none());
    }
}
