// ============================================================================
// Module : api
// ============================================================================
// Ce module contient tous les clients API pour récupérer les données
// financières (Yahoo Finance via proxies CORS, Finnhub, Alpha Vantage)
// et le client du service compagnon local (news, export d'image)
// ============================================================================

pub mod alpha_vantage; // Fournisseur tertiaire
pub mod companion;     // Service compagnon local
pub mod fetcher;       // Trait HttpFetch + implémentation reqwest
pub mod finnhub;       // Fournisseur secondaire
pub mod resolver;      // Chaîne de repli cotation / historique
pub mod transport;     // Proxies CORS et accès direct
pub mod yahoo;         // Fournisseur principal (API chart)

// Re-export des types principaux
pub use companion::{CompanionClient, NewsItem};
pub use fetcher::{HttpFetch, ReqwestFetcher};
pub use resolver::{QuoteResolver, QuoteStrategy};
pub use transport::Transport;
