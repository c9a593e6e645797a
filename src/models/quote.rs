// ============================================================================
// Structure : Quote
// ============================================================================
// Cotation canonique d'un ticker, quelle que soit la source qui l'a fournie
// (Yahoo via proxy, Finnhub, Alpha Vantage...)
//
// CONCEPTS RUST :
// 1. Smart constructor : Quote::from_prices() retourne Option<Quote>
//    - Impossible de construire une Quote sans prix ni clôture précédente
//    - L'invariant est garanti par le type, pas par les appelants
// 2. Option<f64> : volume absent plutôt que 0 "magique"
// ============================================================================

use serde::{Deserialize, Serialize};

/// Cotation normalisée d'un ticker
///
/// Invariant : `price > 0` et `previous_close > 0`, donc `change_percent`
/// est toujours défini.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Prix actuel
    pub price: f64,

    /// Variation absolue : price - previous_close
    pub change: f64,

    /// Variation en pourcentage : change / previous_close * 100
    pub change_percent: f64,

    /// Volume échangé (None si absent ou nul)
    pub volume: Option<f64>,

    /// Clôture de la séance précédente
    pub previous_close: Option<f64>,
}

impl Quote {
    /// Construit une Quote à partir du prix et de la clôture précédente
    ///
    /// Retourne None si l'un des deux est absent, nul, négatif ou NaN :
    /// l'appelant reçoit alors un "pas de données" explicite.
    ///
    /// # Exemple
    /// let quote = Quote::from_prices(Some(105.0), Some(100.0), None).unwrap();
    /// assert_eq!(quote.change, 5.0);
    pub fn from_prices(
        price: Option<f64>,
        previous_close: Option<f64>,
        volume: Option<f64>,
    ) -> Option<Self> {
        let price = price.filter(|p| p.is_finite() && *p > 0.0)?;
        let previous_close = previous_close.filter(|p| p.is_finite() && *p > 0.0)?;

        let change = price - previous_close;
        let change_percent = change / previous_close * 100.0;

        Some(Self {
            price,
            change,
            change_percent,
            volume: volume.filter(|v| v.is_finite() && *v > 0.0),
            previous_close: Some(previous_close),
        })
    }

    /// Retourne true si la variation est positive ou nulle
    ///
    /// C'est ce signe qui choisit la couleur des graphiques.
    pub fn is_positive(&self) -> bool {
        self.change >= 0.0
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_change_and_percent() {
        let quote = Quote::from_prices(Some(105.0), Some(100.0), Some(1234.0)).unwrap();

        assert_eq!(quote.price, 105.0);
        assert_eq!(quote.change, 5.0);
        assert!((quote.change_percent - 5.0).abs() < 1e-9);
        assert_eq!(format!("{:.2}", quote.change_percent), "5.00");
        assert_eq!(quote.volume, Some(1234.0));
        assert_eq!(quote.previous_close, Some(100.0));
        assert!(quote.is_positive());
    }

    #[test]
    fn test_quote_requires_price_and_previous_close() {
        assert!(Quote::from_prices(None, Some(100.0), None).is_none());
        assert!(Quote::from_prices(Some(105.0), None, None).is_none());
        assert!(Quote::from_prices(Some(105.0), Some(0.0), None).is_none());
        assert!(Quote::from_prices(Some(0.0), Some(100.0), None).is_none());
        assert!(Quote::from_prices(Some(f64::NAN), Some(100.0), None).is_none());
    }

    #[test]
    fn test_quote_negative_change() {
        let quote = Quote::from_prices(Some(95.0), Some(100.0), Some(0.0)).unwrap();

        assert_eq!(quote.change, -5.0);
        assert!(!quote.is_positive());
        // Un volume nul est traité comme absent
        assert_eq!(quote.volume, None);
    }
}
