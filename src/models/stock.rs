// ============================================================================
// Structure : StockEntry
// ============================================================================
// Représente une action suivie par le tableau de bord (symbole Yahoo, nom,
// code court utilisé par les pages de cotation et le service de news)
//
// CONCEPTS RUST :
// 1. String vs &str : StockEntry possède ses données (String)
// 2. &'static str : tables statiques compilées dans le binaire
// ============================================================================

use serde::{Deserialize, Serialize};

/// Suffixes des marchés coréens (KOSPI, KOSDAQ)
const MARKET_SUFFIXES: [&str; 2] = [".KS", ".KQ"];

/// Page de cotation externe d'un titre
const QUOTE_PAGE_URL: &str = "https://finance.naver.com/item/main.naver?code=";

/// Une action du tableau de bord
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    /// Symbole Yahoo Finance (ex: "005930.KS")
    pub symbol: String,

    /// Nom affiché (ex: "삼성전자")
    pub name: String,

    /// Code court sans suffixe de marché (ex: "005930")
    pub code: String,
}

impl StockEntry {
    /// Crée une entrée, le code court est déduit du symbole
    pub fn new(symbol: &str, name: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            code: stock_code(symbol),
        }
    }

    /// Vrai si le symbole porte le marqueur du marché domestique
    pub fn is_domestic(&self, suffix: &str) -> bool {
        is_domestic(&self.symbol, suffix)
    }

    /// URL de la page de cotation externe pour ce titre
    pub fn quote_page_url(&self) -> String {
        format!("{}{}", QUOTE_PAGE_URL, self.code)
    }
}

/// Vrai si `symbol` contient le marqueur du marché domestique
pub fn is_domestic(symbol: &str, suffix: &str) -> bool {
    !suffix.is_empty() && symbol.contains(suffix)
}

/// Retire les suffixes de marché pour obtenir le code court
pub fn stock_code(symbol: &str) -> String {
    MARKET_SUFFIXES
        .iter()
        .fold(symbol.to_string(), |acc, suffix| acc.replace(suffix, ""))
}

// ============================================================================
// Indices de marché
// ============================================================================

/// Un indice affiché dans le résumé (KOSPI, KOSDAQ, DJI)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Libellé court (ex: "KOSPI")
    pub label: String,

    /// Symbole Yahoo (ex: "^KS11")
    pub symbol: String,
}

impl IndexEntry {
    pub fn new(label: &str, symbol: &str) -> Self {
        Self {
            label: label.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

// ============================================================================
// Tables par défaut
// ============================================================================

/// Actions affichées au démarrage
pub fn default_watchlist() -> Vec<StockEntry> {
    [
        ("005930.KS", "삼성전자"),
        ("000660.KS", "SK하이닉스"),
        ("373220.KS", "LG에너지솔루션"),
        ("005380.KS", "현대차"),
        ("035420.KS", "NAVER"),
        ("035720.KS", "카카오"),
    ]
    .iter()
    .map(|&(symbol, name)| StockEntry::new(symbol, name))
    .collect()
}

/// Actions supplémentaires ajoutées par "voir plus"
pub fn additional_stocks() -> Vec<StockEntry> {
    [
        ("051910.KS", "LG화학"),
        ("006400.KS", "삼성SDI"),
        ("028260.KS", "삼성물산"),
        ("096770.KS", "SK이노베이션"),
        ("003670.KS", "포스코홀딩스"),
        ("032830.KS", "삼성생명"),
    ]
    .iter()
    .map(|&(symbol, name)| StockEntry::new(symbol, name))
    .collect()
}

/// Indices du résumé de marché
pub fn default_indices() -> Vec<IndexEntry> {
    vec![
        IndexEntry::new("KOSPI", "^KS11"),
        IndexEntry::new("KOSDAQ", "^KQ11"),
        IndexEntry::new("DJI", "^DJI"),
    ]
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_code_strips_market_suffix() {
        assert_eq!(stock_code("005930.KS"), "005930");
        assert_eq!(stock_code("091990.KQ"), "091990");
        assert_eq!(stock_code("AAPL"), "AAPL");
    }

    #[test]
    fn test_domestic_marker() {
        let samsung = StockEntry::new("005930.KS", "삼성전자");
        let apple = StockEntry::new("AAPL", "Apple Inc.");

        assert!(samsung.is_domestic(".KS"));
        assert!(!apple.is_domestic(".KS"));
        assert!(!is_domestic("005930.KS", ""));
    }

    #[test]
    fn test_quote_page_url() {
        let entry = StockEntry::new("051910.KS", "LG화학");
        assert_eq!(
            entry.quote_page_url(),
            "https://finance.naver.com/item/main.naver?code=051910"
        );
    }

    #[test]
    fn test_default_tables() {
        assert_eq!(additional_stocks().len(), 6);
        assert!(default_watchlist().iter().all(|s| s.is_domestic(".KS")));
        assert_eq!(default_indices()[0].symbol, "^KS11");
    }
}
