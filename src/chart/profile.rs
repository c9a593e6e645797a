// ============================================================================
// Profils de graphique et couleurs
// ============================================================================
// Deux profils partagent le même algorithme de géométrie et ne diffèrent
// que par leurs constantes (taille du canevas, marges, épaisseurs).
// ============================================================================

/// Taille / variante du graphique
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartProfile {
    /// Petit graphique d'une carte (300x100)
    Compact,
    /// Grand graphique de la fenêtre de détail (800x400)
    Expanded,
}

/// Marges autour de la zone de tracé, en pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Padding {
    pub const fn uniform(value: f64) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
        }
    }
}

/// Constantes d'un profil
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSpec {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
    pub line_width: f64,
    /// Opacité du dégradé en haut de la zone de tracé
    pub fill_top_alpha: f64,
    /// Opacité du dégradé en bas
    pub fill_bottom_alpha: f64,
}

impl ProfileSpec {
    pub fn chart_width(&self) -> f64 {
        self.width - self.padding.left - self.padding.right
    }

    pub fn chart_height(&self) -> f64 {
        self.height - self.padding.top - self.padding.bottom
    }

    /// Ordonnée de la ligne de base (bas de la zone de tracé)
    pub fn baseline(&self) -> f64 {
        self.height - self.padding.bottom
    }
}

impl ChartProfile {
    pub fn spec(&self) -> ProfileSpec {
        match self {
            ChartProfile::Compact => ProfileSpec {
                width: 300.0,
                height: 100.0,
                padding: Padding::uniform(10.0),
                line_width: 3.0,
                fill_top_alpha: 0.25,
                fill_bottom_alpha: 0.05,
            },
            ChartProfile::Expanded => ProfileSpec {
                width: 800.0,
                height: 400.0,
                padding: Padding {
                    left: 80.0,
                    right: 40.0,
                    top: 20.0,
                    bottom: 40.0,
                },
                line_width: 4.0,
                fill_top_alpha: 0.3,
                fill_bottom_alpha: 0.05,
            },
        }
    }
}

// ============================================================================
// Couleurs
// ============================================================================

/// Couleur RGBA, alpha entre 0.0 et 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Mélange avec un fond opaque (le terminal n'a pas de transparence)
    pub fn over(self, background: Rgba) -> Rgba {
        let mix = |fg: u8, bg: u8| -> u8 {
            (fg as f64 * self.a + bg as f64 * (1.0 - self.a)).round() as u8
        };
        Rgba::rgb(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

/// Hausse : rouge (convention du marché coréen)
pub const POSITIVE_COLOR: Rgba = Rgba::rgb(231, 76, 60);
/// Baisse ou stable : bleu
pub const NON_POSITIVE_COLOR: Rgba = Rgba::rgb(52, 152, 219);
/// Contour des marqueurs du grand graphique
pub const MARKER_STROKE_COLOR: Rgba = Rgba::rgb(255, 255, 255);

/// Couleur d'accent selon le signe de la dernière variation
pub fn trend_color(positive: bool) -> Rgba {
    if positive {
        POSITIVE_COLOR
    } else {
        NON_POSITIVE_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_plot_area() {
        let compact = ChartProfile::Compact.spec();
        assert_eq!(compact.chart_width(), 280.0);
        assert_eq!(compact.chart_height(), 80.0);

        let expanded = ChartProfile::Expanded.spec();
        assert_eq!(expanded.chart_width(), 680.0);
        assert_eq!(expanded.chart_height(), 340.0);
        assert_eq!(expanded.baseline(), 360.0);
    }

    #[test]
    fn test_blend_over_background() {
        let black = Rgba::rgb(0, 0, 0);
        assert_eq!(POSITIVE_COLOR.with_alpha(1.0).over(black), POSITIVE_COLOR);
        assert_eq!(POSITIVE_COLOR.with_alpha(0.0).over(black), black);
    }
}
