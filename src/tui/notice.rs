//! Privacy notice screen: the API terms notice plus a live consent panel.

use crate::privacy::types::SyncStatus;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub const NOTICE_TITLE: &str = "Gemini API Key Notice";

/// Numbered references shown under the notice, with their marker colors.
pub const NOTICE_LINKS: [(&str, Color); 4] = [
    ("https://ai.google.dev/docs/gemini_api_overview", Color::Red),
    ("https://aistudio.google.com/", Color::Blue),
    ("https://developers.google.com/terms", Color::Green),
    ("https://ai.google.dev/gemini-api/terms", Color::Magenta),
];

/// What the run loop should do in response to a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeAction {
    None,
    Dismiss,
    Refresh,
    Update(bool),
}

/// View state for the notice screen.
#[derive(Debug, Clone, Default)]
pub struct NoticeScreen {
    pub status: SyncStatus,
    /// Highlighted choice in the Yes/No selector.
    pub selected: bool,
}

impl NoticeScreen {
    pub fn new(status: SyncStatus) -> Self {
        let mut screen = Self::default();
        screen.apply_status(status);
        screen
    }

    /// Takes a new snapshot; a known preference resets the selector to it.
    pub fn apply_status(&mut self, status: SyncStatus) {
        if let Some(opt_in) = status.data_collection_opt_in {
            self.selected = opt_in;
        }
        self.status = status;
    }

    fn can_update(&self) -> bool {
        self.status.is_free_tier && !self.status.is_loading
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> NoticeAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return NoticeAction::Dismiss;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => NoticeAction::Dismiss,
            KeyCode::Char('r') => NoticeAction::Refresh,
            KeyCode::Char('y') if self.can_update() => {
                self.selected = true;
                NoticeAction::Update(true)
            }
            KeyCode::Char('n') if self.can_update() => {
                self.selected = false;
                NoticeAction::Update(false)
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab if self.can_update() => {
                self.selected = !self.selected;
                NoticeAction::None
            }
            KeyCode::Enter if self.can_update() => NoticeAction::Update(self.selected),
            _ => NoticeAction::None,
        }
    }
}

fn marker(index: usize) -> Span<'static> {
    let color = NOTICE_LINKS[index].1;
    Span::styled(format!("[{}]", index + 1), Style::default().fg(color))
}

pub fn build_notice_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            NOTICE_TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::from(""),
        Line::from(vec![
            Span::raw("By using the Gemini API"),
            marker(0),
            Span::raw(", Google AI Studio"),
            marker(1),
            Span::raw(
                ", and the other Google developer services that reference these terms \
                 (collectively, the \"APIs\" or \"Services\"), you are agreeing to Google \
                 APIs Terms of Service (the \"API Terms\")",
            ),
            marker(2),
            Span::raw(", and the Gemini API Additional Terms of Service (the \"Additional Terms\")"),
            marker(3),
            Span::raw("."),
        ]),
        Line::from(""),
    ];
    for (index, (url, _)) in NOTICE_LINKS.iter().enumerate() {
        lines.push(Line::from(vec![marker(index), Span::raw(format!(" {}", url))]));
    }
    lines
}

pub fn build_consent_lines(screen: &NoticeScreen) -> Vec<Line<'static>> {
    let status = &screen.status;
    let mut lines = Vec::new();

    if status.is_loading {
        lines.push(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )));
        return lines;
    }

    if let Some(error) = &status.error {
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    if status.is_free_tier {
        let current = match status.data_collection_opt_in {
            Some(true) => "Yes",
            Some(false) => "No",
            None => "Unknown",
        };
        lines.push(Line::from(vec![
            Span::raw("Allow Google to use this data to improve its products: "),
            Span::styled(current, Style::default().add_modifier(Modifier::BOLD)),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            selector_span("Yes", screen.selected),
            Span::raw("  "),
            selector_span("No", !screen.selected),
        ]));
    } else if status.last_synced_at.is_some() {
        lines.push(Line::from(Span::styled(
            "Data collection settings are not applicable for your account tier.",
            Style::default().fg(Color::DarkGray),
        )));
    } else if status.error.is_none() {
        lines.push(Line::from(Span::raw("Consent status not loaded yet.")));
    }

    if let Some(synced) = &status.last_synced_at {
        lines.push(Line::from(Span::styled(
            format!("Last synced: {}", synced),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

fn selector_span(label: &str, highlighted: bool) -> Span<'static> {
    if highlighted {
        Span::styled(
            format!("> {} <", label),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw(format!("  {}  ", label))
    }
}

fn instructions_line(screen: &NoticeScreen) -> Line<'static> {
    let mut spans = vec![
        Span::styled("  [Esc]", Style::default().fg(Color::Yellow)),
        Span::raw(" Close  "),
        Span::styled("[r]", Style::default().fg(Color::Yellow)),
        Span::raw(" Refresh"),
    ];
    if screen.can_update() {
        spans.extend([
            Span::raw("  "),
            Span::styled("[y/n]", Style::default().fg(Color::Yellow)),
            Span::raw(" Set  "),
            Span::styled("[←/→ Enter]", Style::default().fg(Color::Yellow)),
            Span::raw(" Choose"),
        ]);
    }
    Line::from(spans)
}

pub fn draw_notice(frame: &mut Frame, screen: &NoticeScreen) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Notice
            Constraint::Length(8), // Consent panel
            Constraint::Length(1), // Instructions
        ])
        .split(area);

    let notice = Paragraph::new(build_notice_lines())
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(notice, chunks[0]);

    draw_consent_panel(frame, screen, chunks[1]);
    frame.render_widget(Paragraph::new(instructions_line(screen)), chunks[2]);
}

fn draw_consent_panel(frame: &mut Frame, screen: &NoticeScreen, area: Rect) {
    let border = if screen.status.error.is_some() {
        Color::Red
    } else {
        Color::Cyan
    };
    let panel = Paragraph::new(build_consent_lines(screen))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" Data Collection "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

#[cfg(test)]
#[path = "tests/notice_tests.rs"]
mod tests;
