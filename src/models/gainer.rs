// ============================================================================
// Structure : Gainer
// ============================================================================
// Classement des meilleures progressions sur un mois
//
// CONCEPTS RUST :
// 1. sort_by avec total_cmp : tri de f64 sans unwrap (NaN-safe)
// 2. truncate : garde les N premiers éléments sans réallouer
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::series::ramp;
use crate::models::{PriceSeries, Quote, StockEntry};

/// Une action classée par sa progression sur un mois
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gainer {
    pub name: String,
    pub code: String,
    pub symbol: String,
    pub current_price: f64,
    pub one_month_ago_price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: Option<f64>,
}

impl Gainer {
    /// Construit un candidat à partir de la cotation actuelle et du premier
    /// prix de l'historique d'un mois
    ///
    /// Retourne None si l'un des deux prix n'est pas strictement positif.
    pub fn from_quote(entry: &StockEntry, quote: &Quote, one_month_ago_price: f64) -> Option<Self> {
        if !(one_month_ago_price > 0.0 && quote.price > 0.0) {
            return None;
        }

        let change = quote.price - one_month_ago_price;
        Some(Self {
            name: entry.name.clone(),
            code: entry.code.clone(),
            symbol: entry.symbol.clone(),
            current_price: quote.price,
            one_month_ago_price,
            change,
            change_percent: change / one_month_ago_price * 100.0,
            volume: quote.volume,
        })
    }

    /// Série à dessiner pour la carte du classement
    ///
    /// L'historique sert tel quel s'il a au moins 3 points, sinon rampe
    /// du prix d'il y a un mois vers le prix actuel.
    pub fn chart_series(&self, history: Option<&PriceSeries>) -> PriceSeries {
        match history {
            Some(series) if !series.is_thin() => series.clone(),
            _ => ramp(self.one_month_ago_price, self.current_price),
        }
    }
}

/// Trie par progression décroissante et garde les `limit` premiers
pub fn rank_top_gainers(mut candidates: Vec<Gainer>, limit: usize) -> Vec<Gainer> {
    candidates.sort_by(|a, b| b.change_percent.total_cmp(&a.change_percent));
    candidates.truncate(limit);
    candidates
}

// ============================================================================
// Tests unitaires
// ============================================================================
