use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

use super::{AppEvent, Pane};
use crate::navigation::{NavigationState, NoticeLevel, Phase};
use crate::ui::App;

pub struct StatusBarPane {
    visible: bool,
}

impl Default for StatusBarPane {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBarPane {
    pub fn new() -> Self {
        Self { visible: true }
    }
}

/// Status text shown when no notice is pending.
pub fn status_text(nav: &NavigationState) -> String {
    let target = nav
        .target()
        .map(ToString::to_string)
        .unwrap_or_else(|| "no target".to_string());

    let phase = match nav.phase() {
        Phase::Empty => "no history".to_string(),
        Phase::Retargeting => "loading history...".to_string(),
        Phase::LoadingMore => "loading more commits...".to_string(),
        Phase::Ready => match nav.position() {
            Some((index, total)) if nav.is_exhausted() => format!("{index}/{total}"),
            Some((index, total)) => format!("{index}/{total}+"),
            None => "no history".to_string(),
        },
    };

    format!(
        "📂 {target} | {phase} | {} | ? help, f open, q quit",
        nav.mode().label()
    )
}

impl Pane for StatusBarPane {
    fn title(&self) -> String {
        "".to_string()
    }

    fn render(
        &self,
        f: &mut Frame,
        app: &App,
        area: Rect,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let theme = app.get_theme();

        let (text, style) = match app.nav.notice() {
            Some(notice) => {
                let color = match notice.level {
                    NoticeLevel::Info => theme.secondary_color(),
                    NoticeLevel::Warning => theme.warning_color(),
                    NoticeLevel::Error => theme.error_color(),
                };
                (
                    notice.message.clone(),
                    Style::default()
                        .fg(color)
                        .bg(theme.background_color())
                        .add_modifier(Modifier::BOLD),
                )
            }
            None => (
                status_text(&app.nav),
                Style::default()
                    .fg(theme.foreground_color())
                    .bg(theme.background_color())
                    .add_modifier(Modifier::REVERSED),
            ),
        };

        let paragraph = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::NONE));

        f.render_widget(paragraph, area);
        Ok(())
    }

    fn handle_event(&mut self, _event: &AppEvent) -> bool {
        false
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::AlignMode;
    use crate::git::Target;
    use crate::navigation::LoadLimits;
    use std::path::PathBuf;

    #[test]
    fn test_status_text_while_loading() {
        let mut nav = NavigationState::new(LoadLimits::default(), AlignMode::SideBySide);
        assert!(status_text(&nav).contains("no history"));

        nav.retarget(Target::File {
            repo_root: PathBuf::from("/repo"),
            path: "src/lib.rs".to_string(),
        });
        let text = status_text(&nav);
        assert!(text.contains("src/lib.rs"));
        assert!(text.contains("loading history..."));
        assert!(text.contains("side-by-side"));
    }
}
