use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::{AppEvent, Pane};
use crate::navigation::{Focus, Phase};
use crate::ui::App;

pub struct CommitListPane {
    visible: bool,
}

impl Default for CommitListPane {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitListPane {
    pub fn new() -> Self {
        Self { visible: true }
    }
}

/// First row to draw so that `selected` stays inside a window of `height` rows.
fn window_start(selected: usize, height: usize) -> usize {
    if height == 0 {
        return selected;
    }
    selected.saturating_sub(height - 1)
}

impl Pane for CommitListPane {
    fn title(&self) -> String {
        "Commits".to_string()
    }

    fn render(
        &self,
        f: &mut Frame,
        app: &App,
        area: Rect,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let theme = app.get_theme();
        let nav = &app.nav;

        let border = if nav.cursor().focus == Focus::List {
            theme.focused_border_color()
        } else {
            theme.border_color()
        };
        let title = match nav.position() {
            Some((position, total)) if nav.is_exhausted() => {
                format!("{} ({position}/{total})", self.title())
            }
            Some((position, total)) => format!("{} ({position}/{total}+)", self.title()),
            None => self.title(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        if nav.history().is_empty() {
            let message = match nav.phase() {
                Phase::Retargeting => "Loading history...",
                _ => "No commits to display",
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .style(Style::default().fg(theme.secondary_color()));
            f.render_widget(paragraph, area);
            return Ok(());
        }

        let visible_height = area.height.saturating_sub(2) as usize;
        let selected = nav.cursor().selected_index;
        let start_index = window_start(selected, visible_height);

        let mut items: Vec<ListItem> = nav
            .history()
            .iter()
            .enumerate()
            .skip(start_index)
            .take(visible_height)
            .map(|(index, commit)| {
                let is_selected = index == selected;
                let marker = if is_selected {
                    Span::styled(
                        "-> ",
                        Style::default()
                            .fg(theme.secondary_color())
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw("   ")
                };

                let spans = vec![
                    marker,
                    Span::styled(
                        format!("{} ", commit.short_id),
                        Style::default()
                            .fg(theme.primary_color())
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        commit.timestamp.format("%Y-%m-%d ").to_string(),
                        Style::default().fg(theme.line_number_color()),
                    ),
                    Span::styled(
                        commit.summary.clone(),
                        Style::default().fg(theme.foreground_color()),
                    ),
                ];

                let line_style = if is_selected {
                    Style::default()
                        .fg(theme.foreground_color())
                        .bg(theme.highlight_color())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.foreground_color())
                };

                ListItem::new(Line::from(spans).style(line_style))
            })
            .collect();

        if nav.phase() == Phase::LoadingMore && items.len() < visible_height {
            items.push(ListItem::new(Line::from(Span::styled(
                "   loading more...",
                Style::default().fg(theme.secondary_color()),
            ))));
        }

        f.render_widget(List::new(items).block(block), area);
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

    #[test]
    fn test_window_keeps_selection_visible() {
        assert_eq!(window_start(0, 10), 0);
        assert_eq!(window_start(9, 10), 0);
        assert_eq!(window_start(10, 10), 1);
        assert_eq!(window_start(25, 10), 16);
        assert_eq!(window_start(3, 0), 3);
    }
}
