use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::debug;

use super::PaneId;
use crate::ui::App;

/// Key handling result type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Key was handled, don't process further
    Handled,
    /// Key was not handled, continue processing
    NotHandled,
    /// Key was handled and application should quit
    Quit,
}

/// Global application key handler
pub struct GlobalKeyHandler;

impl GlobalKeyHandler {
    /// Handle a key press for the whole application
    pub fn handle_global_key(app: &mut App, key: &KeyEvent) -> KeyResult {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            log::info!("User requested quit via Ctrl+C");
            return KeyResult::Quit;
        }

        // The prompt swallows everything while it is open
        if app.is_prompt_open() {
            return Self::handle_prompt_keys(app, key);
        }

        if app.is_showing_help() {
            return Self::handle_help_keys(app, key);
        }

        Self::handle_main_keys(app, key)
    }

    fn handle_prompt_keys(app: &mut App, key: &KeyEvent) -> KeyResult {
        if key.code == KeyCode::Esc {
            debug!("User pressed Escape, closing file prompt");
            app.close_prompt();
            return KeyResult::Handled;
        }

        app.forward_key_to_pane(PaneId::FilePrompt, *key);
        if let Some(input) = app.take_prompt_submission() {
            app.close_prompt();
            app.submit_target(&input);
        }
        KeyResult::Handled
    }

    fn handle_help_keys(app: &mut App, key: &KeyEvent) -> KeyResult {
        match key.code {
            KeyCode::Char('q') => {
                log::info!("User requested quit from help");
                KeyResult::Quit
            }
            _ => {
                // The help pane closes itself on ? and Esc; everything else is ignored
                app.forward_key_to_pane(PaneId::Help, *key);
                KeyResult::Handled
            }
        }
    }

    fn handle_main_keys(app: &mut App, key: &KeyEvent) -> KeyResult {
        match key.code {
            KeyCode::Char('q') => {
                log::info!("User requested quit");
                KeyResult::Quit
            }
            KeyCode::Char('?') => {
                app.toggle_help();
                KeyResult::Handled
            }
            KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                debug!("User pressed Ctrl+T - toggling theme");
                app.toggle_theme();
                KeyResult::Handled
            }
            KeyCode::Char('f') if key.modifiers.is_empty() => {
                debug!("User pressed 'f', opening file prompt");
                app.open_prompt();
                KeyResult::Handled
            }
            KeyCode::Esc => {
                app.nav.clear_notice();
                KeyResult::Handled
            }
            _ => app.nav.handle_key(*key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::AlignMode;
    use crate::navigation::{LoadLimits, NavigationState};
    use crate::ui::Theme;
    use std::path::PathBuf;

    fn app() -> App {
        App::new(
            NavigationState::new(LoadLimits::default(), AlignMode::Inline),
            Theme::Dark,
            PathBuf::from("/repo"),
            PathBuf::from("/repo"),
        )
    }

    fn press(app: &mut App, code: KeyCode) -> KeyResult {
        GlobalKeyHandler::handle_global_key(app, &KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), KeyResult::Quit);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(GlobalKeyHandler::handle_global_key(&mut app, &ctrl_c), KeyResult::Quit);
    }

    #[test]
    fn test_ctrl_t_toggles_theme() {
        let mut app = app();
        let ctrl_t = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert_eq!(GlobalKeyHandler::handle_global_key(&mut app, &ctrl_t), KeyResult::Handled);
        assert_eq!(app.get_theme(), Theme::Light);
    }

    #[test]
    fn test_help_toggle_and_escape() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.is_showing_help());

        // Navigation keys are swallowed while help is shown
        assert_eq!(press(&mut app, KeyCode::Char('m')), KeyResult::Handled);
        assert_eq!(app.nav.mode(), AlignMode::Inline);

        press(&mut app, KeyCode::Esc);
        assert!(!app.is_showing_help());
    }

    #[test]
    fn test_prompt_captures_typing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('f'));
        assert!(app.is_prompt_open());

        // 'q' is text inside the prompt, not quit
        assert_eq!(press(&mut app, KeyCode::Char('q')), KeyResult::Handled);
        assert_eq!(app.prompt_input(), Some("q"));

        press(&mut app, KeyCode::Esc);
        assert!(!app.is_prompt_open());
    }

    #[test]
    fn test_navigation_keys_are_delegated() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('m')), KeyResult::Handled);
        assert_eq!(app.nav.mode(), AlignMode::SideBySide);
        assert_eq!(press(&mut app, KeyCode::Char('z')), KeyResult::NotHandled);
    }
}
