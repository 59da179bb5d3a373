//! Terminal rendering

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
    Frame,
};

use super::app::TerminalApp;
use super::keypad::{KeypadWidget, KEYPAD_WIDTH};
use crate::core::Selection;

/// Title of the outer frame
pub const TITLE: &str = " calc-widget ";

/// Key help shown in the sidebar
pub const HELP_SHORTCUTS: &[(&str, &str)] = &[
    ("Enter", "Evaluate"),
    ("Esc", "Clear"),
    ("⌫", "Delete"),
    ("←/→", "Move caret"),
    ("Shift", "Extend"),
    ("Home/End", "Jump"),
    ("Ctrl+A", "Select all"),
    ("Ctrl+C", "Quit"),
];

/// Where each panel goes for a given terminal size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiLayout {
    /// Expression field
    pub input: Rect,
    /// Result display
    pub result: Rect,
    /// Error display
    pub error: Rect,
    /// Status line (endpoint, requests in flight)
    pub status: Rect,
    /// Keypad panel
    pub keypad: Rect,
    /// Help sidebar
    pub help: Rect,
}

impl UiLayout {
    /// Splits `area` into panels
    #[must_use]
    pub fn new(area: Rect) -> Self {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .margin(1)
            .constraints([
                Constraint::Min(24),
                Constraint::Length(KEYPAD_WIDTH),
                Constraint::Length(24),
            ])
            .split(area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
            ])
            .split(columns[0]);
        let keypad = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(12), Constraint::Min(0)])
            .split(columns[1])[0];
        Self {
            input: rows[0],
            result: rows[1],
            error: rows[2],
            status: rows[3],
            keypad,
            help: columns[2],
        }
    }
}

/// Renders the app to the frame
pub fn render(app: &TerminalApp, frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(WidgetUi::new(app), area);
}

/// Whole-screen widget
#[derive(Debug)]
pub struct WidgetUi<'a> {
    app: &'a TerminalApp,
}

impl<'a> WidgetUi<'a> {
    /// Creates the UI widget for `app`
    #[must_use]
    pub fn new(app: &'a TerminalApp) -> Self {
        Self { app }
    }

    fn render_input(&self, area: Rect, buf: &mut Buffer) {
        let surface = self.app.surface();
        let selection = surface
            .selection
            .unwrap_or_else(|| Selection::caret(surface.value.chars().count()));
        let paragraph = Paragraph::new(field_line(&surface.value, selection)).block(
            Block::default()
                .title(" Expression ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        paragraph.render(area, buf);
    }

    fn render_result(&self, area: Rect, buf: &mut Buffer) {
        let paragraph = Paragraph::new(Span::styled(
            self.app.surface().result.as_str(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ))
        .block(
            Block::default()
                .title(" Result ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        paragraph.render(area, buf);
    }

    fn render_error(&self, area: Rect, buf: &mut Buffer) {
        let paragraph = Paragraph::new(Span::styled(
            self.app.surface().error.as_str(),
            Style::default().fg(Color::Red),
        ))
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
        paragraph.render(area, buf);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let busy = match self.app.in_flight() {
            0 => Span::styled("idle", Style::default().fg(Color::Gray)),
            n => Span::styled(format!("evaluating ({n})"), Style::default().fg(Color::Yellow)),
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("service ", Style::default().fg(Color::DarkGray)),
                Span::raw(self.app.endpoint()),
            ]),
            Line::from(vec![Span::styled("status  ", Style::default().fg(Color::DarkGray)), busy]),
        ];
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Status ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Blue)),
            )
            .render(area, buf);
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let items: Vec<ListItem> = HELP_SHORTCUTS
            .iter()
            .map(|(key, desc)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{key:>8}"), Style::default().fg(Color::Yellow)),
                    Span::raw(" "),
                    Span::styled(*desc, Style::default().fg(Color::Gray)),
                ]))
            })
            .collect();
        List::new(items)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .render(area, buf);
    }
}

/// The field text with the selection (or the caret cell) highlighted
fn field_line(value: &str, selection: Selection) -> Line<'static> {
    let chars: Vec<char> = value.chars().collect();
    let selection = selection.clamped(chars.len());
    let before: String = chars[..selection.start].iter().collect();
    let highlight = Style::default().bg(Color::White).fg(Color::Black);

    if selection.is_caret() {
        let at = chars.get(selection.start).copied().unwrap_or(' ');
        let after: String = chars.iter().skip(selection.start + 1).collect();
        Line::from(vec![
            Span::raw(before),
            Span::styled(at.to_string(), highlight),
            Span::raw(after),
        ])
    } else {
        let selected: String = chars[selection.start..selection.end].iter().collect();
        let after: String = chars[selection.end..].iter().collect();
        Line::from(vec![
            Span::raw(before),
            Span::styled(selected, highlight.bg(Color::Cyan)),
            Span::raw(after),
        ])
    }
}

impl Widget for WidgetUi<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Block::default()
            .title(TITLE)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .render(area, buf);

        let layout = UiLayout::new(area);
        self.render_input(layout.input, buf);
        self.render_result(layout.result, buf);
        self.render_error(layout.error, buf);
        self.render_status(layout.status, buf);
        KeypadWidget::new(self.app.keypad())
            .pressed(self.app.pressed())
            .render(layout.keypad, buf);
        self.render_help(layout.help, buf);
    }
}
