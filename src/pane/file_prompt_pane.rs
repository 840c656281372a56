use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{AppEvent, Pane};
use crate::ui::App;

/// Single-line input for choosing another file to follow.
pub struct FilePromptPane {
    visible: bool,
    input: String,
    submission: Option<String>,
}

impl Default for FilePromptPane {
    fn default() -> Self {
        Self::new()
    }
}

impl FilePromptPane {
    pub fn new() -> Self {
        Self {
            visible: false,
            input: String::new(),
            submission: None,
        }
    }

    /// Show the prompt pre-filled with `initial`.
    pub fn open(&mut self, initial: String) {
        self.input = initial;
        self.submission = None;
        self.visible = true;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Text entered with Enter, handed out once.
    pub fn take_submission(&mut self) -> Option<String> {
        self.submission.take()
    }
}

impl Pane for FilePromptPane {
    fn title(&self) -> String {
        "Open file (path relative to launch directory, . for repository)".to_string()
    }

    fn render(
        &self,
        f: &mut Frame,
        app: &App,
        area: Rect,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let theme = app.get_theme();

        // Keep the cursor end in view when the path is longer than the box
        let width = area.width.saturating_sub(3) as usize;
        let chars: Vec<char> = self.input.chars().collect();
        let shown: String = chars[chars.len().saturating_sub(width)..].iter().collect();

        let line = Line::from(vec![
            Span::styled(shown, Style::default().fg(theme.foreground_color())),
            Span::styled(
                "_",
                Style::default()
                    .fg(theme.secondary_color())
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ]);

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .title(self.title())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.focused_border_color())),
        );
        f.render_widget(paragraph, area);
        Ok(())
    }

    fn handle_event(&mut self, event: &AppEvent) -> bool {
        let AppEvent::Key(key) = event else {
            return false;
        };
        if !self.visible {
            return false;
        }

        match key.code {
            KeyCode::Enter => {
                self.submission = Some(std::mem::take(&mut self.input));
                true
            }
            KeyCode::Backspace => {
                self.input.pop();
                true
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
                true
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
                true
            }
            _ => false,
        }
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn as_file_prompt_pane(&self) -> Option<&FilePromptPane> {
        Some(self)
    }

    fn as_file_prompt_pane_mut(&mut self) -> Option<&mut FilePromptPane> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_typing_and_submit() {
        let mut pane = FilePromptPane::new();
        assert!(!pane.handle_event(&key(KeyCode::Char('a'))));

        pane.open("src/ma".to_string());
        assert!(pane.handle_event(&key(KeyCode::Char('x'))));
        assert!(pane.handle_event(&key(KeyCode::Backspace)));
        for c in "in.rs".chars() {
            pane.handle_event(&key(KeyCode::Char(c)));
        }
        assert_eq!(pane.input(), "src/main.rs");
        assert!(pane.take_submission().is_none());

        assert!(pane.handle_event(&key(KeyCode::Enter)));
        assert_eq!(pane.take_submission().as_deref(), Some("src/main.rs"));
        assert!(pane.take_submission().is_none());
        assert_eq!(pane.input(), "");
    }

    #[test]
    fn test_ctrl_u_clears_input() {
        let mut pane = FilePromptPane::new();
        pane.open("abc".to_string());
        let ctrl_u = AppEvent::Key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert!(pane.handle_event(&ctrl_u));
        assert_eq!(pane.input(), "");
    }
}
