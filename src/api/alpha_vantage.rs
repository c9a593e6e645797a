// ============================================================================
// Fournisseur tertiaire : Alpha Vantage (GLOBAL_QUOTE)
// ============================================================================
// Dernier recours, appelé en direct avec le symbole sans suffixe domestique.
// Les valeurs numériques arrivent sous forme de chaînes ("05. price").
// ============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::config::KeyedEndpoint;
use crate::models::Quote;

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
}

/// URL GLOBAL_QUOTE pour un symbole
pub fn quote_url(endpoint: &KeyedEndpoint, symbol: &str) -> String {
    format!(
        "{}?function=GLOBAL_QUOTE&symbol={}&apikey={}",
        endpoint.base_url,
        urlencoding::encode(symbol),
        endpoint.api_key
    )
}

fn parse_number(raw: Option<&String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
}

/// Convertit la réponse GLOBAL_QUOTE en Quote
pub fn parse_quote(value: Value) -> Result<Quote> {
    let response: GlobalQuoteResponse =
        serde_json::from_value(value).context("Réponse Alpha Vantage inattendue")?;
    let quote = response
        .global_quote
        .context("Alpha Vantage : pas de bloc Global Quote")?;

    Quote::from_prices(
        parse_number(quote.price.as_ref()),
        parse_number(quote.previous_close.as_ref()),
        parse_number(quote.volume.as_ref()),
    )
    .context("Alpha Vantage : prix ou clôture précédente manquant")
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_quote() {
        let value = json!({
            "Global Quote": {
                "01. symbol": "005930",
                "05. price": "71300.0000",
                "06. volume": "12000000",
                "08. previous close": "70000.0000"
            }
        });

        let quote = parse_quote(value).unwrap();
        assert_eq!(quote.price, 71300.0);
        assert_eq!(quote.change, 1300.0);
        assert_eq!(quote.volume, Some(12_000_000.0));
    }

    #[test]
    fn test_parse_quote_rate_limited() {
        // Réponse typique quand le quota est dépassé
        let value = json!({ "Note": "Thank you for using Alpha Vantage!" });
        assert!(parse_quote(value).is_err());

        let empty = json!({ "Global Quote": {} });
        assert!(parse_quote(empty).is_err());
    }
}
