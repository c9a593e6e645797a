// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod chart;     // Peinture d'une ChartGeometry sur un Canvas
pub mod dashboard; // Rendu du tableau de bord
pub mod events;    // Gestion des événements clavier et souris
pub mod modal;     // Fenêtre de détail (grand graphique, news)

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
