// ============================================================================
// Module : chart
// ============================================================================
// Chart Renderer : série de prix -> géométrie en pixels (petit et grand
// profil) + hit-test pour les infobulles. Indépendant de ratatui.
// ============================================================================

pub mod geometry; // Normalisation, chemins, dégradé, grille
pub mod profile;  // Constantes des profils et couleurs

pub use geometry::{render_chart, ChartGeometry, PathSegment, PlotPoint};
pub use hit_test::{hit_test, Tooltip};
pub use profile::{ChartProfile, Rgba};
