// ============================================================================
// Configuration de l'application
// ============================================================================
// Petite table statique (URLs, clés d'API, proxies, listes d'actions)
// construite une fois au démarrage puis injectée en lecture seule
//
// CONCEPTS RUST :
// 1. Trait Default : valeurs par défaut centralisées
// 2. Injection : le resolver reçoit sa config à la construction,
//    aucune variable globale mutable
// 3. Duration : délais typés plutôt que des millisecondes "nues"
// ============================================================================

use std::time::Duration;

use crate::api::transport::{default_proxies, Transport};
use crate::models::stock::{additional_stocks, default_indices, default_watchlist};
use crate::models::{IndexEntry, StockEntry};

/// Endpoint REST protégé par une clé d'API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedEndpoint {
    pub base_url: String,
    pub api_key: String,
}

/// Configuration du Quote Resolver
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Base de l'API chart Yahoo Finance (fournisseur principal)
    pub primary_base_url: String,

    /// Proxies essayés dans l'ordre pour le fournisseur principal
    pub proxies: Vec<Transport>,

    /// Fournisseur secondaire (Finnhub), ignoré pour le marché domestique
    pub secondary: KeyedEndpoint,

    /// Fournisseur tertiaire (Alpha Vantage)
    pub tertiary: KeyedEndpoint,

    /// Marqueur du marché domestique dans les symboles (".KS")
    pub domestic_suffix: String,

    /// Attente avant de réessayer le fournisseur principal (marché domestique)
    pub domestic_retry_delay: Duration,

    /// Nombre maximum de points d'historique conservés
    pub history_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            primary_base_url: "https://query1.finance.yahoo.com/v8/finance".to_string(),
            proxies: default_proxies(),
            secondary: KeyedEndpoint {
                base_url: "https://finnhub.io/api/v1".to_string(),
                // 'demo' ne donne que des données limitées
                api_key: "demo".to_string(),
            },
            tertiary: KeyedEndpoint {
                base_url: "https://www.alphavantage.co/query".to_string(),
                api_key: "demo".to_string(),
            },
            domestic_suffix: ".KS".to_string(),
            domestic_retry_delay: Duration::from_millis(1000),
            history_limit: 30,
        }
    }
}

/// Cadence du rafraîchissement périodique
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Intervalle entre deux passes complètes
    pub interval: Duration,

    /// Pause entre deux symboles (cartes et indices)
    pub symbol_delay: Duration,

    /// Pause entre deux symboles lors du calcul des progressions
    pub gainer_delay: Duration,

    /// Nombre de meilleures progressions affichées
    pub top_gainers: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            symbol_delay: Duration::from_millis(500),
            gainer_delay: Duration::from_millis(300),
            top_gainers: 3,
        }
    }
}

/// Service compagnon local (news et export d'image)
#[derive(Debug, Clone)]
pub struct CompanionConfig {
    pub base_url: String,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

/// Configuration complète, construite une fois dans main()
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub resolver: ResolverConfig,
    pub refresh: RefreshConfig,
    pub companion: CompanionConfig,
    pub watchlist: Vec<StockEntry>,
    pub additional_stocks: Vec<StockEntry>,
    pub indices: Vec<IndexEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            refresh: RefreshConfig::default(),
            companion: CompanionConfig::default(),
            watchlist: default_watchlist(),
            additional_stocks: additional_stocks(),
            indices: default_indices(),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.resolver.proxies.len(), 3);
        assert_eq!(config.resolver.domestic_retry_delay, Duration::from_millis(1000));
        assert_eq!(config.resolver.history_limit, 30);
        assert_eq!(config.refresh.interval, Duration::from_secs(30));
        assert_eq!(config.refresh.top_gainers, 3);
        assert_eq!(config.additional_stocks.len(), 6);
    }
}
