// ============================================================================
// Fournisseur secondaire : Finnhub
// ============================================================================
// Endpoint /quote à clé, JSON plat : { c, pc, v, ... }
// Appelé en direct (sans proxy), jamais pour le marché domestique.
// ============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::config::KeyedEndpoint;
use crate::models::Quote;

/// Réponse de /quote
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Prix courant
    c: Option<f64>,
    /// Clôture précédente
    pc: Option<f64>,
    /// Volume
    v: Option<f64>,
}

/// URL de cotation pour un symbole déjà nettoyé de son suffixe
pub fn quote_url(endpoint: &KeyedEndpoint, symbol: &str) -> String {
    format!(
        "{}/quote?symbol={}&token={}",
        endpoint.base_url,
        urlencoding::encode(symbol),
        endpoint.api_key
    )
}

/// Convertit la réponse /quote en Quote
pub fn parse_quote(value: Value) -> Result<Quote> {
    let response: QuoteResponse =
        serde_json::from_value(value).context("Réponse Finnhub inattendue")?;

    Quote::from_prices(response.c, response.pc, response.v)
        .context("Finnhub : prix ou clôture précédente manquant")
}

// ============================================================================
// Tests unitaires
// ============================================================================
