use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{AppEvent, Pane};
use crate::diff::{AlignMode, AlignedRow, DiffView, RowKind};
use crate::navigation::{DiffStatus, Focus};
use crate::ui::{App, Theme};

pub struct DiffPane {
    visible: bool,
}

impl Default for DiffPane {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffPane {
    pub fn new() -> Self {
        Self { visible: true }
    }
}

/// One of the three side-by-side columns: removed, unchanged and added text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Removed,
    Context,
    Added,
}

fn display_text(line: &str) -> String {
    line.trim_end_matches('\r').replace('\t', "    ")
}

fn number(n: Option<usize>) -> String {
    match n {
        Some(n) => format!("{n:>4} "),
        None => "     ".to_string(),
    }
}

/// Single-column rows: both line numbers, a sign and the colored text.
pub fn inline_lines(rows: &[AlignedRow], theme: &Theme) -> Vec<Line<'static>> {
    rows.iter()
        .map(|row| {
            let (sign, text, color) = match row.kind {
                RowKind::Removed => ('-', row.left.as_deref(), theme.removed_color()),
                RowKind::Added => ('+', row.right.as_deref(), theme.added_color()),
                RowKind::Context | RowKind::Changed => {
                    (' ', row.center.as_deref(), theme.unchanged_color())
                }
            };
            Line::from(vec![
                Span::styled(
                    format!("{}{}", number(row.old_number), number(row.new_number)),
                    Style::default().fg(theme.line_number_color()),
                ),
                Span::styled(
                    format!("{sign} {}", display_text(text.unwrap_or(""))),
                    Style::default().fg(color),
                ),
            ])
        })
        .collect()
}

/// Rows for one side-by-side column; empty slots become blank lines so the
/// three columns stay aligned.
pub fn column_lines(rows: &[AlignedRow], column: Column, theme: &Theme) -> Vec<Line<'static>> {
    rows.iter()
        .map(|row| {
            let (text, line_number, color) = match column {
                Column::Removed => (row.left.as_deref(), row.old_number, theme.removed_color()),
                Column::Context => (row.center.as_deref(), row.new_number, theme.unchanged_color()),
                Column::Added => (row.right.as_deref(), row.new_number, theme.added_color()),
            };
            match text {
                Some(text) => Line::from(vec![
                    Span::styled(number(line_number), Style::default().fg(theme.line_number_color())),
                    Span::styled(display_text(text), Style::default().fg(color)),
                ]),
                None => Line::from(""),
            }
        })
        .collect()
}

impl DiffPane {
    fn block(&self, app: &App, title: String) -> Block<'static> {
        let theme = app.get_theme();
        let border = if app.nav.cursor().focus == Focus::Detail {
            theme.focused_border_color()
        } else {
            theme.border_color()
        };
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
    }

    fn render_message(&self, f: &mut Frame, app: &App, area: Rect, message: String, color: Color) {
        let paragraph = Paragraph::new(message)
            .block(self.block(app, self.title()))
            .style(Style::default().fg(color));
        f.render_widget(paragraph, area);
    }

    fn render_rows(&self, f: &mut Frame, app: &App, area: Rect, view: &DiffView) {
        let theme = app.get_theme();
        let mode = app.nav.mode();

        let stats = view
            .stats()
            .map(|(additions, deletions)| format!(" (+{additions}, -{deletions})"))
            .unwrap_or_default();
        let title = format!("{}{stats} [{}]", self.title(), mode.label());
        let block = self.block(app, title);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let height = inner.height as usize;
        let rows = app.nav.current_rows();
        let start = app.nav.cursor().scroll_offset.min(rows.len());
        let end = (start + height).min(rows.len());
        let window = &rows[start..end];

        if rows.is_empty() {
            let paragraph = Paragraph::new("No textual changes")
                .style(Style::default().fg(theme.secondary_color()));
            f.render_widget(paragraph, inner);
            return;
        }

        match mode {
            AlignMode::Inline => {
                f.render_widget(Paragraph::new(inline_lines(window, &theme)), inner);
            }
            AlignMode::SideBySide => {
                let chunks = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([
                        Constraint::Percentage(33),
                        Constraint::Percentage(34),
                        Constraint::Percentage(33),
                    ])
                    .split(inner);

                for (chunk, column) in chunks
                    .iter()
                    .zip([Column::Removed, Column::Context, Column::Added])
                {
                    let borders = if column == Column::Removed {
                        Borders::NONE
                    } else {
                        Borders::LEFT
                    };
                    let paragraph = Paragraph::new(column_lines(window, column, &theme)).block(
                        Block::default()
                            .borders(borders)
                            .border_style(Style::default().fg(theme.border_color())),
                    );
                    f.render_widget(paragraph, *chunk);
                }
            }
        }
    }
}

impl Pane for DiffPane {
    fn title(&self) -> String {
        "Diff".to_string()
    }

    fn render(
        &self,
        f: &mut Frame,
        app: &App,
        area: Rect,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let theme = app.get_theme();

        match app.nav.current_diff() {
            DiffStatus::NoCommit => {
                let message = "No commit selected".to_string();
                self.render_message(f, app, area, message, theme.secondary_color());
            }
            DiffStatus::Loading => {
                let message = "Loading diff...".to_string();
                self.render_message(f, app, area, message, theme.secondary_color());
            }
            DiffStatus::Unavailable(err) => {
                self.render_message(
                    f,
                    app,
                    area,
                    format!("Diff unavailable: {err}\n\nSelect the commit again to retry."),
                    theme.error_color(),
                );
            }
            DiffStatus::Ready(view) => match view.as_ref() {
                DiffView::Unsupported { reason } => {
                    self.render_message(f, app, area, reason.clone(), theme.warning_color());
                }
                DiffView::Text(_) => self.render_rows(f, app, area, &view),
            },
        }
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
