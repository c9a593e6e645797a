// ============================================================================
// Quote Resolver : chaîne de repli multi-fournisseurs / multi-transports
// ============================================================================
// Transforme un symbole en Quote (ou en "pas de données") en tolérant des
// transports peu fiables.
//
// Ordre de résolution d'une cotation :
// 1. Fournisseur principal via chaque proxy, puis une tentative directe
// 2. Marché domestique : attente fixe puis une seule relance du principal
//    Autres marchés     : fournisseur secondaire (direct)
// 3. Fournisseur tertiaire (direct, symbole sans suffixe domestique)
//
// CONCEPTS RUST :
// 1. Stratégies ordonnées : Vec<QuoteStrategy> parcouru jusqu'au premier
//    succès, au lieu de boucles imbriquées qui avalent les erreurs
// 2. Généricité : QuoteResolver<F: HttpFetch> pour injecter un faux client
// 3. Option comme valeur "pas de données" : aucune erreur ne sort d'ici
// ============================================================================

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::api::fetcher::HttpFetch;
use crate::api::transport::Transport;
use crate::api::yahoo::{self, ChartRange};
use crate::api::{alpha_vantage, finnhub};
use crate::config::ResolverConfig;
use crate::models::stock::is_domestic;
use crate::models::{PriceSeries, Quote};

/// Source de données externe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Yahoo Finance (API chart), via proxies
    Primary,
    /// Finnhub, en direct
    Secondary,
    /// Alpha Vantage, en direct
    Tertiary,
}

impl Provider {
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Primary => "yahoo",
            Provider::Secondary => "finnhub",
            Provider::Tertiary => "alpha_vantage",
        }
    }
}

/// Une étape de la chaîne de repli d'une cotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteStrategy {
    /// Fournisseur principal : proxies dans l'ordre, puis direct
    Primary,
    /// Attendre puis relancer une fois le fournisseur principal
    RetryPrimaryAfter(Duration),
    /// Fournisseur secondaire
    Secondary,
    /// Fournisseur tertiaire
    Tertiary,
}

/// Couple (fournisseur, transport) essayé pendant une résolution
///
/// Sert uniquement à piloter la boucle et les logs.
struct ProviderAttempt<'a> {
    provider: Provider,
    transport: &'a Transport,
    target: String,
}

impl fmt::Display for ProviderAttempt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {}", self.provider.label(), self.transport)
    }
}

/// Résout cotations et historiques pour un symbole
pub struct QuoteResolver<F> {
    fetcher: F,
    config: ResolverConfig,
    direct: Transport,
}

impl<F: HttpFetch> QuoteResolver<F> {
    /// Crée un resolver ; la configuration est en lecture seule ensuite
    pub fn new(fetcher: F, config: ResolverConfig) -> Self {
        Self {
            fetcher,
            config,
            direct: Transport::direct(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Chaîne de repli pour un symbole, dans l'ordre d'exécution
    pub fn plan(&self, symbol: &str) -> Vec<QuoteStrategy> {
        if is_domestic(symbol, &self.config.domestic_suffix) {
            vec![
                QuoteStrategy::Primary,
                QuoteStrategy::RetryPrimaryAfter(self.config.domestic_retry_delay),
                QuoteStrategy::Tertiary,
            ]
        } else {
            vec![
                QuoteStrategy::Primary,
                QuoteStrategy::Secondary,
                QuoteStrategy::Tertiary,
            ]
        }
    }

    /// Résout la cotation d'un symbole
    ///
    /// Retourne Some(Quote) dès qu'une stratégie réussit, None quand toutes
    /// ont échoué. Ne retourne jamais d'erreur : chaque échec est loggé et
    /// fait passer à la stratégie suivante.
    #[instrument(skip(self))]
    pub async fn resolve_quote(&self, symbol: &str) -> Option<Quote> {
        if symbol.trim().is_empty() {
            warn!("Empty symbol, nothing to resolve");
            return None;
        }

        for strategy in self.plan(symbol) {
            debug!(?strategy, "Trying quote strategy");
            if let Some(quote) = self.run_strategy(&strategy, symbol).await {
                info!(?strategy, price = quote.price, "Quote resolved");
                return Some(quote);
            }
        }

        warn!("All quote providers exhausted");
        None
    }

    /// Résout une cotation avec le seul fournisseur principal
    ///
    /// Proxies dans l'ordre, puis une tentative directe en dernier recours.
    /// Utilisé aussi tel quel pour les indices de marché.
    #[instrument(skip(self))]
    pub async fn resolve_primary(&self, symbol: &str) -> Option<Quote> {
        let target = yahoo::chart_url(&self.config.primary_base_url, symbol, ChartRange::OneDay);

        for transport in self.config.proxies.iter().chain(std::iter::once(&self.direct)) {
            let attempt = ProviderAttempt {
                provider: Provider::Primary,
                transport,
                target: target.clone(),
            };
            if let Some(quote) = self.attempt(&attempt, yahoo::parse_quote).await {
                return Some(quote);
            }
        }

        None
    }

    /// Résout l'historique d'un mois (clôtures journalières)
    ///
    /// Uniquement via les proxies : ni accès direct, ni relance différée.
    /// Retourne au plus `history_limit` points, du plus ancien au plus récent.
    #[instrument(skip(self))]
    pub async fn resolve_history(&self, symbol: &str) -> Option<PriceSeries> {
        if symbol.trim().is_empty() {
            return None;
        }

        let target = yahoo::chart_url(&self.config.primary_base_url, symbol, ChartRange::OneMonth);
        let limit = self.config.history_limit;

        for transport in &self.config.proxies {
            let attempt = ProviderAttempt {
                provider: Provider::Primary,
                transport,
                target: target.clone(),
            };
            if let Some(series) = self
                .attempt(&attempt, |value| yahoo::parse_history(value, limit))
                .await
            {
                info!(points = series.len(), "History resolved");
                return Some(series);
            }
        }

        warn!("No transport returned a usable history");
        None
    }

    /// Exécute une stratégie de la chaîne
    async fn run_strategy(&self, strategy: &QuoteStrategy, symbol: &str) -> Option<Quote> {
        match strategy {
            QuoteStrategy::Primary => self.resolve_primary(symbol).await,
            QuoteStrategy::RetryPrimaryAfter(delay) => {
                info!(delay_ms = delay.as_millis() as u64, "Retrying primary provider after delay");
                tokio::time::sleep(*delay).await;
                self.resolve_primary(symbol).await
            }
            QuoteStrategy::Secondary => {
                let target = finnhub::quote_url(&self.config.secondary, &self.stripped(symbol));
                let attempt = ProviderAttempt {
                    provider: Provider::Secondary,
                    transport: &self.direct,
                    target,
                };
                self.attempt(&attempt, finnhub::parse_quote).await
            }
            QuoteStrategy::Tertiary => {
                let target = alpha_vantage::quote_url(&self.config.tertiary, &self.stripped(symbol));
                let attempt = ProviderAttempt {
                    provider: Provider::Tertiary,
                    transport: &self.direct,
                    target,
                };
                self.attempt(&attempt, alpha_vantage::parse_quote).await
            }
        }
    }

    /// Symbole sans le marqueur domestique (forme attendue par les API à clé)
    fn stripped(&self, symbol: &str) -> String {
        if self.config.domestic_suffix.is_empty() {
            symbol.to_string()
        } else {
            symbol.replace(&self.config.domestic_suffix, "")
        }
    }

    /// Une tentative : fetch + déballage + parsing, échec replié en None
    async fn attempt<T>(
        &self,
        attempt: &ProviderAttempt<'_>,
        parse: impl FnOnce(Value) -> Result<T>,
    ) -> Option<T> {
        let result = match self.fetch_json(attempt).await {
            Ok(value) => parse(value),
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => {
                debug!(attempt = %attempt, "Attempt succeeded");
                Some(value)
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!(attempt = %attempt, error = %message, "Attempt failed, trying next");
                None
            }
        }
    }

    async fn fetch_json(&self, attempt: &ProviderAttempt<'_>) -> Result<Value> {
        let url = attempt.transport.wrap(&attempt.target);
        let body = self.fetcher.get_text(&url).await?;
        attempt.transport.unwrap_body(&body)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fetcher::fake::FakeFetcher;
    use serde_json::json;

    fn chart_body(price: f64, previous_close: f64) -> String {
        json!({
            "chart": { "result": [ { "meta": {
                "regularMarketPrice": price,
                "previousClose": previous_close,
                "regularMarketVolume": 1000
            } } ] }
        })
        .to_string()
    }

    fn enveloped(inner: &str) -> String {
        json!({ "contents": inner }).to_string()
    }

    fn resolver(fetcher: FakeFetcher) -> QuoteResolver<FakeFetcher> {
        QuoteResolver::new(fetcher, ResolverConfig::default())
    }

    #[test]
    fn test_plan_depends_on_domestic_marker() {
        let resolver = resolver(FakeFetcher::new());

        assert_eq!(
            resolver.plan("005930.KS"),
            vec![
                QuoteStrategy::Primary,
                QuoteStrategy::RetryPrimaryAfter(Duration::from_millis(1000)),
                QuoteStrategy::Tertiary,
            ]
        );
        assert_eq!(
            resolver.plan("AAPL"),
            vec![QuoteStrategy::Primary, QuoteStrategy::Secondary, QuoteStrategy::Tertiary]
        );
    }

    #[tokio::test]
    async fn test_first_proxy_success_short_circuits() {
        let fetcher = FakeFetcher::new().respond("allorigins", &enveloped(&chart_body(105.0, 100.0)));
        let resolver = resolver(fetcher);

        let quote = resolver.resolve_quote("AAPL").await.unwrap();
        assert_eq!(quote.change, 5.0);
        assert_eq!(format!("{:.2}", quote.change_percent), "5.00");
        assert_eq!(resolver.fetcher.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_proxy_falls_through_to_next() {
        let fetcher = FakeFetcher::new()
            .respond("allorigins", r#"{"status": {"http_code": 403}}"#)
            .respond("corsproxy", &chart_body(200.0, 190.0));
        let resolver = resolver(fetcher);

        let quote = resolver.resolve_quote("AAPL").await.unwrap();
        assert_eq!(quote.price, 200.0);

        let requested = resolver.fetcher.requested();
        assert_eq!(requested.len(), 2);
        assert!(requested[0].contains("allorigins"));
        assert!(requested[1].contains("corsproxy"));
    }

    #[tokio::test]
    async fn test_direct_attempt_after_all_proxies() {
        let fetcher = FakeFetcher::new()
            .respond("allorigins", "{}")
            .respond("corsproxy", r#"{"chart": {"result": []}}"#)
            .respond("codetabs", "<html>rate limited</html>")
            .respond("finance.yahoo.com", &chart_body(50.0, 40.0));
        let resolver = resolver(fetcher);

        let quote = resolver.resolve_quote("MSFT").await.unwrap();
        assert_eq!(quote.price, 50.0);

        let requested = resolver.fetcher.requested();
        assert_eq!(requested.len(), 4);
        assert!(requested[3].starts_with("https://query1.finance.yahoo.com/v8/finance/chart/MSFT"));
    }

    #[tokio::test]
    async fn test_missing_previous_close_moves_to_next_transport() {
        let no_previous_close = json!({
            "chart": { "result": [ { "meta": { "regularMarketPrice": 105.0 } } ] }
        })
        .to_string();
        let fetcher = FakeFetcher::new()
            .respond("allorigins", &enveloped(&no_previous_close))
            .respond("corsproxy", &chart_body(105.0, 100.0));
        let resolver = resolver(fetcher);

        let quote = resolver.resolve_quote("AAPL").await.unwrap();
        assert_eq!(quote.previous_close, Some(100.0));
        assert_eq!(resolver.fetcher.requested().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_domestic_symbol_retries_primary_once_after_delay() {
        let resolver = resolver(FakeFetcher::new());
        let start = tokio::time::Instant::now();

        let quote = resolver.resolve_quote("005930.KS").await;

        assert!(quote.is_none());
        assert!(start.elapsed() >= Duration::from_millis(1000));

        // 2 passes x (3 proxies + direct), jamais Finnhub, puis Alpha Vantage
        assert_eq!(resolver.fetcher.count("finance.yahoo.com"), 8);
        assert_eq!(resolver.fetcher.count("finnhub"), 0);

        let requested = resolver.fetcher.requested();
        assert_eq!(requested.len(), 9);
        assert!(requested[8].contains("alphavantage"));
        assert!(requested[8].contains("symbol=005930&"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreign_symbol_tries_secondary_before_tertiary() {
        let resolver = resolver(FakeFetcher::new());
        let start = tokio::time::Instant::now();

        assert!(resolver.resolve_quote("AAPL").await.is_none());

        // Pas de relance différée hors marché domestique
        assert!(start.elapsed() < Duration::from_millis(1000));
        assert_eq!(resolver.fetcher.count("finance.yahoo.com"), 4);

        let requested = resolver.fetcher.requested();
        let secondary = requested.iter().position(|u| u.contains("finnhub")).unwrap();
        let tertiary = requested.iter().position(|u| u.contains("alphavantage")).unwrap();
        assert!(secondary < tertiary);
        assert_eq!(requested.len(), 6);
    }

    #[tokio::test]
    async fn test_secondary_success_skips_tertiary() {
        let fetcher = FakeFetcher::new().respond("finnhub", r#"{"c": 190.0, "pc": 200.0, "v": 10}"#);
        let resolver = resolver(fetcher);

        let quote = resolver.resolve_quote("AAPL").await.unwrap();
        assert_eq!(quote.change, -10.0);
        assert_eq!(resolver.fetcher.count("alphavantage"), 0);
    }

    #[tokio::test]
    async fn test_empty_symbol_is_unavailable() {
        let resolver = resolver(FakeFetcher::new());
        assert!(resolver.resolve_quote("  ").await.is_none());
        assert!(resolver.fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_history_uses_proxies_only() {
        let resolver = resolver(FakeFetcher::new());

        assert!(resolver.resolve_history("005930.KS").await.is_none());

        let requested = resolver.fetcher.requested();
        assert_eq!(requested.len(), 3);
        assert!(requested.iter().all(|u| u.contains("range%3D1mo") || u.contains("range=1mo")));
        assert!(!requested.iter().any(|u| u.starts_with("https://query1")));
    }

    #[tokio::test]
    async fn test_history_from_enveloped_proxy() {
        let history = json!({
            "chart": { "result": [ {
                "timestamp": [1_700_000_000, 1_700_086_400, 1_700_172_800],
                "indicators": { "quote": [ { "close": [70000.0, null, 71000.0] } ] }
            } ] }
        })
        .to_string();
        let fetcher = FakeFetcher::new().respond("allorigins", &enveloped(&history));
        let resolver = resolver(fetcher);

        let series = resolver.resolve_history("005930.KS").await.unwrap();
        assert_eq!(series.prices(), &[70000.0, 71000.0]);
    }
}
