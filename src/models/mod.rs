// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod format;  // Formatage des prix, volumes et dates
pub mod gainer;  // Classement des meilleures progressions
pub mod quote;   // Cotation canonique
pub mod series;  // Série de prix + synthèse des séries minces
pub mod stock;   // Catalogue des actions et indices

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use stockboard::models::quote::Quote;
// On peut faire : use stockboard::models::Quote;
pub use gainer::{rank_top_gainers, Gainer};
pub use quote::Quote;
pub use series::{PriceSeries, SeriesStats};
pub use stock::{IndexEntry, StockEntry};
