use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{AppEvent, Pane};
use crate::git::{Commit, Target};
use crate::ui::{App, Theme};

pub struct CommitHeaderPane {
    visible: bool,
}

impl Default for CommitHeaderPane {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitHeaderPane {
    pub fn new() -> Self {
        Self { visible: true }
    }
}

fn field<'a>(label: &'a str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{label:<8}"),
            Style::default()
                .fg(theme.secondary_color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(theme.foreground_color())),
    ])
}

fn file_label(commit: &Commit, target: Option<&Target>) -> String {
    match (&commit.path, &commit.previous_path) {
        (Some(path), Some(previous)) if path != previous => format!("{previous} -> {path}"),
        (Some(path), _) => path.clone(),
        (None, _) => target
            .map(ToString::to_string)
            .unwrap_or_else(|| "(repository)".to_string()),
    }
}

/// Header lines for `commit`; the message body is wrapped to `width` columns.
pub fn header_lines<'a>(
    commit: &'a Commit,
    target: Option<&Target>,
    position: Option<(usize, usize)>,
    width: usize,
    theme: &Theme,
) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled(
            commit.id.clone(),
            Style::default()
                .fg(theme.primary_color())
                .add_modifier(Modifier::BOLD),
        )),
        field(
            "Author",
            format!("{} <{}>", commit.author, commit.author_email),
            theme,
        ),
        field(
            "Date",
            commit.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            theme,
        ),
        field("File", file_label(commit, target), theme),
    ];

    if let Some((index, total)) = position {
        lines.push(field("Commit", format!("{index}/{total} commits"), theme));
    }

    lines.push(Line::from(Span::styled(
        commit.summary.clone(),
        Style::default()
            .fg(theme.foreground_color())
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    )));

    let body_style = Style::default().fg(theme.unchanged_color());
    for paragraph in commit.body.lines() {
        if paragraph.trim().is_empty() {
            lines.push(Line::from(""));
            continue;
        }
        for wrapped in textwrap::wrap(paragraph, width.max(1)) {
            lines.push(Line::from(Span::styled(wrapped.into_owned(), body_style)));
        }
    }

    lines
}

impl Pane for CommitHeaderPane {
    fn title(&self) -> String {
        "Commit".to_string()
    }

    fn render(
        &self,
        f: &mut Frame,
        app: &App,
        area: Rect,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let theme = app.get_theme();
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_color()));

        let Some(commit) = app.nav.current_commit() else {
            let paragraph = Paragraph::new("No commit selected")
                .block(block)
                .style(Style::default().fg(theme.secondary_color()));
            f.render_widget(paragraph, area);
            return Ok(());
        };

        let width = area.width.saturating_sub(2) as usize;
        let lines = header_lines(
            commit,
            app.nav.target(),
            app.nav.position(),
            width,
            &theme,
        );

        f.render_widget(Paragraph::new(lines).block(block), area);
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
    use chrono::{FixedOffset, TimeZone};

    fn commit() -> Commit {
        Commit {
            id: "0123456789abcdef0123456789abcdef01234567".to_string(),
            short_id: "0123456".to_string(),
            parent_ids: vec![],
            author: "Ada".to_string(),
            author_email: "ada@example.com".to_string(),
            timestamp: FixedOffset::east_opt(3600)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
                .unwrap(),
            summary: "Rename config".to_string(),
            body: "A fairly long body line that needs wrapping\n\nSecond".to_string(),
            path: Some("new.toml".to_string()),
            previous_path: Some("old.toml".to_string()),
        }
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_fields() {
        let commit = commit();
        let lines = header_lines(&commit, None, Some((2, 7)), 20, &Theme::Dark);
        let rendered: Vec<String> = lines.iter().map(text).collect();

        assert_eq!(rendered[0], commit.id);
        assert_eq!(rendered[1], "Author  Ada <ada@example.com>");
        assert_eq!(rendered[2], "Date    2024-03-05 14:07:09");
        assert_eq!(rendered[3], "File    old.toml -> new.toml");
        assert_eq!(rendered[4], "Commit  2/7 commits");
        assert_eq!(rendered[5], "Rename config");
    }

    #[test]
    fn test_body_is_wrapped() {
        let commit = commit();
        let lines = header_lines(&commit, None, None, 20, &Theme::Dark);
        let body: Vec<String> = lines.iter().skip(5).map(text).collect();

        assert!(body.iter().all(|l| l.chars().count() <= 20));
        assert!(body.contains(&String::new()));
        assert_eq!(body.last().map(String::as_str), Some("Second"));
    }
}
