// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier, souris et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : un helper par raccourci clavier
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind,
};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Mouvement ou clic de souris (survol du grand graphique)
    Mouse(MouseEvent),

    /// Tick régulier (pas d'événement pendant le timeout)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    timeout: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// Sans événement pendant le timeout, retourne Event::Tick.
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.timeout)? {
            return Ok(Event::Tick);
        }

        let event = match event::read()? {
            // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
            CrosstermEvent::Mouse(mouse) => Event::Mouse(mouse),
            _ => Event::Tick,
        };

        Ok(event)
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : convertir un événement en action
// ============================================================================

fn key_matches(event: &Event, predicate: impl Fn(KeyCode) -> bool) -> bool {
    match event {
        Event::Key(key) => predicate(key.code),
        _ => false,
    }
}

/// 'q' (quitter, à presser deux fois)
pub fn is_quit_event(event: &Event) -> bool {
    key_matches(event, |code| matches!(code, KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Échap (fermer la fenêtre de détail)
pub fn is_escape_event(event: &Event) -> bool {
    key_matches(event, |code| code == KeyCode::Esc)
}

/// Entrée (ouvrir la fenêtre de détail)
pub fn is_enter_event(event: &Event) -> bool {
    key_matches(event, |code| code == KeyCode::Enter)
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    key_matches(event, |code| {
        matches!(code, KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    })
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    key_matches(event, |code| {
        matches!(code, KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    })
}

/// 'r' : rafraîchissement manuel
pub fn is_refresh_event(event: &Event) -> bool {
    key_matches(event, |code| matches!(code, KeyCode::Char('r') | KeyCode::Char('R')))
}

/// 'm' : voir plus / masquer les actions supplémentaires
pub fn is_more_event(event: &Event) -> bool {
    key_matches(event, |code| matches!(code, KeyCode::Char('m') | KeyCode::Char('M')))
}

/// 'e' : exporter le graphique en image
pub fn is_export_event(event: &Event) -> bool {
    key_matches(event, |code| matches!(code, KeyCode::Char('e') | KeyCode::Char('E')))
}

/// 'o' : afficher l'URL de la page de cotation
pub fn is_open_page_event(event: &Event) -> bool {
    key_matches(event, |code| matches!(code, KeyCode::Char('o') | KeyCode::Char('O')))
}

/// Position (colonne, ligne) d'un mouvement de souris
pub fn mouse_position(event: &Event) -> Option<(u16, u16)> {
    match event {
        Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) => {
            Some((mouse.column, mouse.row))
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton};

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty()))
    }

    fn mouse(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 12,
            row: 7,
            modifiers: KeyModifiers::empty(),
        })
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key('q')));
        assert!(!is_quit_event(&key('a')));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_action_keys() {
        assert!(is_refresh_event(&key('r')));
        assert!(is_more_event(&key('m')));
        assert!(is_export_event(&key('e')));
        assert!(is_open_page_event(&key('o')));
        assert!(is_down_event(&key('j')));
        assert!(!is_up_event(&key('j')));
    }

    #[test]
    fn test_mouse_position() {
        assert_eq!(mouse_position(&mouse(MouseEventKind::Moved)), Some((12, 7)));
        assert_eq!(mouse_position(&mouse(MouseEventKind::Down(MouseButton::Left))), None);
        assert_eq!(mouse_position(&key('q')), None);
    }
}
