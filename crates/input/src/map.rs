//! Key mapping from terminal events to game actions.

use crate::types::{Direction, GameAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map keyboard input to game actions.
///
/// Arrows, `hjkl` and `wasd` slide; `r` restarts.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    let direction = match key.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Direction::Left
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Direction::Right
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Char('w') | KeyCode::Char('W') => {
            Direction::Up
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Direction::Down
        }

        // Restart
        KeyCode::Char('r') | KeyCode::Char('R') => return Some(GameAction::Restart),

        _ => return None,
    };
    Some(GameAction::Move(direction))
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn mv(direction: Direction) -> Option<GameAction> {
        Some(GameAction::Move(direction))
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Left)), mv(Direction::Left));
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Right)), mv(Direction::Right));
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Up)), mv(Direction::Up));
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Down)), mv(Direction::Down));
    }

    #[test]
    fn test_letter_keys() {
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('H'))), mv(Direction::Left));
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('l'))), mv(Direction::Right));
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('w'))), mv(Direction::Up));
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('J'))), mv(Direction::Down));
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('a'))), mv(Direction::Left));
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('D'))), mv(Direction::Right));
    }

    #[test]
    fn test_restart_and_unmapped_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('r'))),
            Some(GameAction::Restart)
        );
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char(' '))), None);
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::from(KeyCode::Esc)));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('c'))));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }
}
