use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keys the navigation state machine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    NextCommit,
    PreviousCommit,
    ToggleFocus,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    ToggleMode,
}

impl NavAction {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }

        let action = match key.code {
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => NavAction::NextCommit,
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => NavAction::PreviousCommit,
            KeyCode::Tab | KeyCode::BackTab => NavAction::ToggleFocus,
            KeyCode::Up | KeyCode::Char('k') => NavAction::Up,
            KeyCode::Down | KeyCode::Char('j') => NavAction::Down,
            KeyCode::PageUp => NavAction::PageUp,
            KeyCode::PageDown | KeyCode::Char(' ') => NavAction::PageDown,
            KeyCode::Home | KeyCode::Char('g') => NavAction::Home,
            KeyCode::End | KeyCode::Char('G') => NavAction::End,
            KeyCode::Char('m') => NavAction::ToggleMode,
            _ => return None,
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_commit_keys() {
        for code in [KeyCode::Right, KeyCode::Char('l'), KeyCode::Char('n')] {
            assert_eq!(NavAction::from_key(&key(code)), Some(NavAction::NextCommit));
        }
        for code in [KeyCode::Left, KeyCode::Char('h'), KeyCode::Char('p')] {
            assert_eq!(NavAction::from_key(&key(code)), Some(NavAction::PreviousCommit));
        }
    }

    #[test]
    fn test_scroll_keys() {
        assert_eq!(NavAction::from_key(&key(KeyCode::Char('j'))), Some(NavAction::Down));
        assert_eq!(NavAction::from_key(&key(KeyCode::Up)), Some(NavAction::Up));
        assert_eq!(NavAction::from_key(&key(KeyCode::Char('G'))), Some(NavAction::End));
        assert_eq!(
            NavAction::from_key(&KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Some(NavAction::End)
        );
        assert_eq!(NavAction::from_key(&key(KeyCode::PageDown)), Some(NavAction::PageDown));
    }

    #[test]
    fn test_unmapped_keys() {
        assert_eq!(NavAction::from_key(&key(KeyCode::Char('q'))), None);
        assert_eq!(
            NavAction::from_key(&KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL)),
            None
        );
    }
}
