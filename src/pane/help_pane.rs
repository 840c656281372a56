use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{AppEvent, Pane};
use crate::navigation::Focus;
use crate::ui::App;

pub struct HelpPane {
    visible: bool,
}

impl Default for HelpPane {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpPane {
    pub fn new() -> Self {
        Self { visible: false }
    }
}

impl Pane for HelpPane {
    fn title(&self) -> String {
        "Help".to_string()
    }

    fn render(
        &self,
        f: &mut Frame,
        app: &App,
        area: Rect,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let theme = app.get_theme();
        let heading = Style::default()
            .fg(theme.primary_color())
            .add_modifier(Modifier::BOLD);

        let mut help_text = vec![
            Line::from(Span::styled(
                "ghist - Help",
                Style::default()
                    .fg(theme.secondary_color())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        // Up/Down depend on which pane has focus
        let (pane_title, pane_hotkeys) = match app.nav.cursor().focus {
            Focus::List => (
                "Commit List",
                vec![
                    "  j / k / ↑ / ↓     - Next / previous commit",
                    "  PageDown / Space  - Scroll diff down a page",
                    "  PageUp            - Scroll diff up a page",
                ],
            ),
            Focus::Detail => (
                "Diff View",
                vec![
                    "  j / k / ↑ / ↓     - Scroll down / up",
                    "  PageDown / Space  - Page down",
                    "  PageUp            - Page up",
                    "  g / Home          - Go to top",
                    "  G / End           - Go to bottom",
                ],
            ),
        };

        help_text.push(Line::from(Span::styled(
            format!("{pane_title} Hotkeys:"),
            heading,
        )));
        for hotkey in pane_hotkeys {
            help_text.push(Line::from(hotkey));
        }
        help_text.push(Line::from(""));

        help_text.extend(vec![
            Line::from(Span::styled("Navigation:", heading)),
            Line::from("  → / l / n     - Next commit (loads more history at the end)"),
            Line::from("  ← / h / p     - Previous commit"),
            Line::from("  Tab           - Switch focus between list and diff"),
            Line::from("  m             - Toggle inline / side-by-side diff"),
            Line::from(""),
            Line::from(Span::styled("General:", heading)),
            Line::from("  f             - Open another file (. for the whole repository)"),
            Line::from("  ?             - Show/hide this help page"),
            Line::from("  Esc           - Close help or prompt, dismiss message"),
            Line::from("  Ctrl+t        - Toggle light/dark theme"),
            Line::from("  q / Ctrl+c    - Quit application"),
            Line::from(""),
            Line::from("Press ? or Esc to return"),
        ]);

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .title(self.title())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border_color())),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, area);
        Ok(())
    }

    fn handle_event(&mut self, event: &AppEvent) -> bool {
        match event {
            AppEvent::Key(key) => match key.code {
                KeyCode::Char('?') | KeyCode::Esc => {
                    self.set_visible(false);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
