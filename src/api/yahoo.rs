// ============================================================================
// Fournisseur principal : Yahoo Finance (API chart)
// ============================================================================
// Construit les URLs de l'API chart et convertit ses réponses JSON en
// Quote (range=1d) ou en PriceSeries (range=1mo).
//
// Le transport (proxy, direct) est géré par le resolver : ici on ne voit
// que le JSON déjà déballé.
//
// CONCEPTS RUST :
// 1. Serde : désérialisation dans des structures qui matchent le JSON
// 2. Option partout : Yahoo omet souvent des champs, rien n'est garanti
// 3. Iterators : zip timestamps/closes, filter_map des trous
// ============================================================================

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{PriceSeries, Quote};

// ============================================================================
// Structures pour parser la réponse JSON de Yahoo Finance
// ============================================================================
// CONCEPT RUST : #[serde(rename = "...")]
// - Permet de mapper un nom de champ JSON différent du nom Rust
// - Exemple : "regularMarketPrice" (JSON) -> "regular_market_price" (Rust)
// ============================================================================

/// Réponse complète de l'API Yahoo Finance
#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: Option<Chart>,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<Meta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

/// Métadonnées du ticker (prix courant, clôture précédente, volume)
///
/// Chaque valeur a un nom de repli selon le type d'actif.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    regular_market_price: Option<f64>,
    current_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    regular_market_volume: Option<f64>,
    #[serde(rename = "volume24Hr")]
    volume_24h: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Option<Vec<QuoteBlock>>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

/// Période demandée à l'API chart (l'intervalle est toujours journalier)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRange {
    /// Cotation du jour
    OneDay,
    /// Historique d'un mois
    OneMonth,
}

impl ChartRange {
    pub fn to_yahoo_string(&self) -> &'static str {
        match self {
            ChartRange::OneDay => "1d",
            ChartRange::OneMonth => "1mo",
        }
    }
}

/// Construit l'URL de l'API chart pour un symbole
pub fn chart_url(base_url: &str, symbol: &str, range: ChartRange) -> String {
    format!(
        "{}/chart/{}?interval=1d&range={}",
        base_url,
        symbol,
        range.to_yahoo_string()
    )
}

/// Premier Some non nul : reproduit le "a || b" des réponses Yahoo
fn first_present(values: &[Option<f64>]) -> Option<f64> {
    values
        .iter()
        .flatten()
        .copied()
        .find(|v| *v != 0.0 && !v.is_nan())
}

/// Extrait le premier ChartResult de la réponse
fn first_result(value: Value) -> Result<ChartResult> {
    let response: YahooResponse =
        serde_json::from_value(value).context("Structure chart Yahoo inattendue")?;

    response
        .chart
        .and_then(|chart| chart.result)
        .and_then(|results| results.into_iter().next())
        .context("Aucun résultat retourné par Yahoo Finance")
}

/// Convertit une réponse chart (range=1d) en Quote
///
/// Échoue si le prix courant ou la clôture précédente manque : le resolver
/// passe alors au transport suivant.
pub fn parse_quote(value: Value) -> Result<Quote> {
    let result = first_result(value)?;
    let meta = result.meta.context("Pas de métadonnées dans la réponse")?;

    let price = first_present(&[meta.regular_market_price, meta.current_price]);
    let previous_close = first_present(&[meta.previous_close, meta.chart_previous_close]);
    let volume = first_present(&[meta.regular_market_volume, meta.volume_24h]);

    debug!(?price, ?previous_close, ?volume, "Parsed Yahoo meta");

    Quote::from_prices(price, previous_close, volume)
        .context("Prix courant ou clôture précédente manquant")
}

/// Convertit une réponse chart (range=1mo) en PriceSeries
///
/// Associe chaque timestamp à sa clôture, écarte les clôtures manquantes,
/// trie chronologiquement et garde les `limit` points les plus récents.
pub fn parse_history(value: Value, limit: usize) -> Result<PriceSeries> {
    let result = first_result(value)?;

    let timestamps = result.timestamp.context("Pas de timestamps dans la réponse")?;
    let closes = result
        .indicators
        .and_then(|indicators| indicators.quote)
        .and_then(|quotes| quotes.into_iter().next())
        .and_then(|quote| quote.close)
        .context("Pas de clôtures dans la réponse")?;

    // CONCEPT RUST : Iterators et zip
    // - zip s'arrête au plus court des deux tableaux
    // - filter_map écarte les trous (null) et les timestamps invalides
    let mut valid: Vec<(i64, f64)> = timestamps
        .iter()
        .zip(closes.iter())
        .filter_map(|(&ts, &close)| {
            let close = close.filter(|c| c.is_finite())?;
            DateTime::from_timestamp(ts, 0)?;
            Some((ts, close))
        })
        .collect();

    let skipped = timestamps.len() - valid.len();
    if skipped > 0 {
        warn!(skipped, total = timestamps.len(), "Skipped history entries with missing close");
    }

    valid.sort_by_key(|&(ts, _)| ts);
    let start = valid.len().saturating_sub(limit);
    let prices: Vec<f64> = valid[start..].iter().map(|&(_, close)| close).collect();

    if prices.is_empty() {
        anyhow::bail!("Aucune clôture valide dans l'historique");
    }

    debug!(points = prices.len(), "Parsed Yahoo history");
    Ok(PriceSeries::new(prices))
}

// ============================================================================
// Tests unitaires
// ============================================================================
