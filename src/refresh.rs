// ============================================================================
// Passe de rafraîchissement
// ============================================================================
// Met à jour tout le tableau de bord, strictement en séquence :
// 1. chaque carte : cotation -> historique -> série à dessiner, pause 500 ms
// 2. chaque indice : cotation via le fournisseur principal, pause 500 ms
// 3. meilleures progressions sur un mois, pause 300 ms par symbole
// 4. horodatage de la dernière mise à jour
//
// Pas de parallélisme : un symbole est entièrement résolu avant le suivant,
// pour ménager les limites de débit des API. La progression est remontée
// par un callback pour que l'interface se mette à jour carte par carte.
//
// CONCEPTS RUST :
// 1. impl FnMut(RefreshEvent) : callback appelé à chaque étape
// 2. Généricité sur HttpFetch : la passe tourne aussi avec un faux client
// ============================================================================

use std::collections::HashMap;

use chrono::{DateTime, Local};
use tracing::{debug, info, instrument};

use crate::api::fetcher::HttpFetch;
use crate::api::resolver::QuoteResolver;
use crate::config::RefreshConfig;
use crate::models::series::chart_series_for_quote;
use crate::models::{rank_top_gainers, Gainer, IndexEntry, PriceSeries, Quote, StockEntry};

/// Résultat de la mise à jour d'une carte
#[derive(Debug, Clone, PartialEq)]
pub struct CardUpdate {
    pub symbol: String,
    /// None : aucun fournisseur n'a répondu ("데이터 없음")
    pub quote: Option<Quote>,
    /// Série prête à dessiner (au moins 3 points), absente sans cotation
    pub chart: Option<PriceSeries>,
}

/// Une entrée du classement avec sa série à dessiner
#[derive(Debug, Clone, PartialEq)]
pub struct RankedGainer {
    pub gainer: Gainer,
    pub chart: PriceSeries,
}

/// Étapes d'une passe, dans l'ordre où elles sont émises
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshEvent {
    Started { cards: usize },
    CardUpdated(CardUpdate),
    IndexUpdated { symbol: String, quote: Option<Quote> },
    GainersUpdated(Vec<RankedGainer>),
    Finished { at: DateTime<Local> },
}

/// Met à jour une carte : cotation puis historique
///
/// Sans cotation, l'historique n'est pas demandé.
#[instrument(skip(resolver, entry), fields(symbol = %entry.symbol))]
pub async fn refresh_card<F: HttpFetch>(resolver: &QuoteResolver<F>, entry: &StockEntry) -> CardUpdate {
    let quote = resolver.resolve_quote(&entry.symbol).await;

    let chart = match &quote {
        Some(quote) => {
            let history = resolver.resolve_history(&entry.symbol).await;
            Some(chart_series_for_quote(history.as_ref(), quote))
        }
        None => {
            debug!("No quote, card shows placeholder");
            None
        }
    };

    CardUpdate {
        symbol: entry.symbol.clone(),
        quote,
        chart,
    }
}

/// Met à jour une liste de cartes, une par une
///
/// Sert à la passe complète et à "voir plus".
pub async fn refresh_cards<F: HttpFetch>(
    resolver: &QuoteResolver<F>,
    config: &RefreshConfig,
    cards: &[StockEntry],
    on_event: &mut impl FnMut(RefreshEvent),
) {
    for entry in cards {
        let update = refresh_card(resolver, entry).await;
        on_event(RefreshEvent::CardUpdated(update));
        tokio::time::sleep(config.symbol_delay).await;
    }
}

/// Calcule le classement des meilleures progressions sur un mois
///
/// Chaque symbole est résolu à nouveau (cotation + historique) : le premier
/// point de l'historique est le prix d'il y a un mois.
#[instrument(skip_all, fields(candidates = cards.len()))]
pub async fn top_gainers<F: HttpFetch>(
    resolver: &QuoteResolver<F>,
    config: &RefreshConfig,
    cards: &[StockEntry],
) -> Vec<RankedGainer> {
    let mut candidates = Vec::new();
    let mut histories: HashMap<String, PriceSeries> = HashMap::new();

    for entry in cards {
        let Some(quote) = resolver.resolve_quote(&entry.symbol).await else {
            debug!(symbol = %entry.symbol, "No quote, skipped from ranking");
            continue;
        };

        let history = resolver.resolve_history(&entry.symbol).await;
        let month_ago = history.as_ref().and_then(PriceSeries::first);

        match month_ago.and_then(|price| Gainer::from_quote(entry, &quote, price)) {
            Some(gainer) => candidates.push(gainer),
            None => debug!(symbol = %entry.symbol, "No one-month-ago price"),
        }
        if let Some(history) = history {
            histories.insert(entry.symbol.clone(), history);
        }

        tokio::time::sleep(config.gainer_delay).await;
    }

    rank_top_gainers(candidates, config.top_gainers)
        .into_iter()
        .map(|gainer| {
            let chart = gainer.chart_series(histories.get(&gainer.symbol));
            RankedGainer { gainer, chart }
        })
        .collect()
}

/// Passe complète : cartes, indices, classement, horodatage
#[instrument(skip_all, fields(cards = cards.len(), indices = indices.len()))]
pub async fn refresh_all<F: HttpFetch>(
    resolver: &QuoteResolver<F>,
    config: &RefreshConfig,
    cards: &[StockEntry],
    indices: &[IndexEntry],
    mut on_event: impl FnMut(RefreshEvent),
) {
    info!("Refresh pass started");
    on_event(RefreshEvent::Started { cards: cards.len() });

    refresh_cards(resolver, config, cards, &mut on_event).await;

    for index in indices {
        let quote = resolver.resolve_primary(&index.symbol).await;
        on_event(RefreshEvent::IndexUpdated {
            symbol: index.symbol.clone(),
            quote,
        });
        tokio::time::sleep(config.symbol_delay).await;
    }

    let gainers = top_gainers(resolver, config, cards).await;
    info!(count = gainers.len(), "Top gainers ranked");
    on_event(RefreshEvent::GainersUpdated(gainers));

    on_event(RefreshEvent::Finished { at: Local::now() });
    info!("Refresh pass finished");
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::api::fetcher::fake::FakeFetcher;
    use crate::config::ResolverConfig;

    fn quote_body(price: f64, previous_close: f64) -> String {
        let inner = json!({
            "chart": { "result": [ { "meta": {
                "regularMarketPrice": price,
                "previousClose": previous_close
            } } ] }
        });
        json!({ "contents": inner.to_string() }).to_string()
    }

    fn history_body(closes: &[f64]) -> String {
        let timestamps: Vec<i64> = (0..closes.len() as i64)
            .map(|i| 1_700_000_000 + i * 86_400)
            .collect();
        let inner = json!({
            "chart": { "result": [ {
                "timestamp": timestamps,
                "indicators": { "quote": [ { "close": closes } ] }
            } ] }
        });
        json!({ "contents": inner.to_string() }).to_string()
    }

    /// Fragment d'URL (encodée par allorigins) propre à un symbole et une période
    fn target(symbol: &str, range: &str) -> String {
        urlencoding::encode(&format!("chart/{}?interval=1d&range={}", symbol, range)).into_owned()
    }

    fn resolver(fetcher: FakeFetcher) -> QuoteResolver<FakeFetcher> {
        QuoteResolver::new(fetcher, ResolverConfig::default())
    }

    #[tokio::test]
    async fn test_refresh_card_uses_history() {
        let fetcher = FakeFetcher::new()
            .respond("range%3D1mo", &history_body(&[69000.0, 70000.0, 70500.0, 71000.0]))
            .respond("range%3D1d", &quote_body(71000.0, 70000.0));
        let resolver = resolver(fetcher);

        let update = refresh_card(&resolver, &StockEntry::new("005930.KS", "삼성전자")).await;

        assert_eq!(update.quote.as_ref().map(|q| q.price), Some(71000.0));
        assert_eq!(update.chart.unwrap().prices(), &[69000.0, 70000.0, 70500.0, 71000.0]);
    }

    #[tokio::test]
    async fn test_refresh_card_pads_thin_history() {
        let fetcher = FakeFetcher::new()
            .respond("range%3D1mo", &history_body(&[70000.0]))
            .respond("range%3D1d", &quote_body(71000.0, 70000.0));
        let resolver = resolver(fetcher);

        let update = refresh_card(&resolver, &StockEntry::new("005930.KS", "삼성전자")).await;

        let chart = update.chart.unwrap();
        assert_eq!(chart.len(), 4);
        assert_eq!(chart.last(), Some(71000.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_card_skips_history() {
        let resolver = resolver(FakeFetcher::new());

        let update = refresh_card(&resolver, &StockEntry::new("005930.KS", "삼성전자")).await;

        assert!(update.quote.is_none());
        assert!(update.chart.is_none());
        assert_eq!(resolver.fetcher().count("1mo"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_top_gainers_ranking() {
        let fetcher = FakeFetcher::new()
            .respond(&target("AAA", "1mo"), &history_body(&[100.0, 110.0, 120.0]))
            .respond(&target("BBB", "1mo"), &history_body(&[60.0, 90.0]))
            .respond(&target("CCC", "1mo"), &history_body(&[150.0, 130.0, 120.0]))
            .respond("range%3D1d", &quote_body(120.0, 118.0));
        let resolver = resolver(fetcher);
        let config = RefreshConfig {
            top_gainers: 2,
            ..RefreshConfig::default()
        };
        let cards = [
            StockEntry::new("AAA", "A"),
            StockEntry::new("BBB", "B"),
            StockEntry::new("CCC", "C"),
        ];

        let ranked = top_gainers(&resolver, &config, &cards).await;

        let symbols: Vec<&str> = ranked.iter().map(|r| r.gainer.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BBB", "AAA"]);
        assert!((ranked[0].gainer.change_percent - 100.0).abs() < 1e-9);

        // BBB n'a que 2 points : rampe de 5 points ; AAA garde son historique
        assert_eq!(ranked[0].chart.len(), 5);
        assert_eq!(ranked[1].chart.prices(), &[100.0, 110.0, 120.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_all_event_order_and_pacing() {
        let fetcher = FakeFetcher::new()
            .respond("range%3D1mo", &history_body(&[100.0, 110.0, 120.0]))
            .respond("range%3D1d", &quote_body(120.0, 110.0));
        let resolver = resolver(fetcher);
        let cards = [StockEntry::new("AAPL", "Apple")];
        let indices = [IndexEntry::new("KOSPI", "^KS11")];
        let start = tokio::time::Instant::now();

        let mut events = Vec::new();
        refresh_all(&resolver, &RefreshConfig::default(), &cards, &indices, |e| events.push(e)).await;

        assert!(start.elapsed() >= Duration::from_millis(500 + 500 + 300));
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], RefreshEvent::Started { cards: 1 });
        assert!(matches!(&events[1], RefreshEvent::CardUpdated(u) if u.symbol == "AAPL" && u.quote.is_some()));
        assert!(matches!(&events[2], RefreshEvent::IndexUpdated { symbol, quote: Some(_) } if symbol == "^KS11"));
        match &events[3] {
            RefreshEvent::GainersUpdated(gainers) => {
                assert_eq!(gainers.len(), 1);
                assert!((gainers[0].gainer.change_percent - 20.0).abs() < 1e-9);
            }
            other => panic!("expected gainers, got {:?}", other),
        }
        assert!(matches!(events[4], RefreshEvent::Finished { .. }));
    }
}
