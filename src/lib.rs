// ============================================================================
// StockBoard - Library
// ============================================================================
// Expose les modules publics au binaire et aux tests
// ============================================================================

pub mod api;     // Resolver multi-fournisseurs + service compagnon
pub mod app;     // État de l'application
pub mod chart;   // Géométrie des graphiques + hit-test
pub mod config;  // Configuration injectée au démarrage
pub mod models;  // Structures de données
pub mod refresh; // Passe de rafraîchissement séquentielle
pub mod ui;      // Interface utilisateur
