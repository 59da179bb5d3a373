//! Keypad rendering and mouse hit-testing for the terminal

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Widget},
};

use crate::keypad::{KeypadAction, KeypadButtonDef, WidgetKeypad};

/// Width of the keypad panel, borders included
pub const KEYPAD_WIDTH: u16 = 44;

/// Grid cell geometry inside a keypad panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Grid {
    inner: Rect,
    cell_width: u16,
    cell_height: u16,
}

impl Grid {
    fn new(keypad: &WidgetKeypad, area: Rect) -> Option<Self> {
        let inner = Rect {
            x: area.x + 1,
            y: area.y + 1,
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(2),
        };
        let (rows, cols) = keypad.dimensions();
        if rows == 0 || cols == 0 {
            return None;
        }
        let cell_width = inner.width / cols as u16;
        let cell_height = inner.height / rows as u16;
        (cell_width > 0 && cell_height > 0).then_some(Self {
            inner,
            cell_width,
            cell_height,
        })
    }

    fn origin(&self, def: &KeypadButtonDef) -> (u16, u16) {
        (
            self.inner.x + def.col as u16 * self.cell_width,
            self.inner.y + def.row as u16 * self.cell_height,
        )
    }
}

/// Finds the button under a click at (`x`, `y`) in a keypad drawn at `area`
#[must_use]
pub fn hit_test(
    keypad: &WidgetKeypad,
    area: Rect,
    x: u16,
    y: u16,
) -> Option<&KeypadButtonDef> {
    let grid = Grid::new(keypad, area)?;
    let inner = grid.inner;
    if x < inner.x || y < inner.y || x >= inner.x + inner.width || y >= inner.y + inner.height {
        return None;
    }
    let col = ((x - inner.x) / grid.cell_width) as usize;
    let row = ((y - inner.y) / grid.cell_height) as usize;
    keypad.get_button_at(row, col)
}

/// Screen cell at the middle of `def`'s button
#[must_use]
pub fn button_center(
    keypad: &WidgetKeypad,
    area: Rect,
    def: &KeypadButtonDef,
) -> Option<(u16, u16)> {
    let grid = Grid::new(keypad, area)?;
    let (x, y) = grid.origin(def);
    Some((x + grid.cell_width / 2, y + grid.cell_height / 2))
}

/// Keypad widget for rendering
#[derive(Debug)]
pub struct KeypadWidget<'a> {
    keypad: &'a WidgetKeypad,
    pressed: Option<&'a str>,
}

impl<'a> KeypadWidget<'a> {
    /// Creates a new keypad widget
    #[must_use]
    pub fn new(keypad: &'a WidgetKeypad) -> Self {
        Self {
            keypad,
            pressed: None,
        }
    }

    /// Highlights the button with element id `id`
    #[must_use]
    pub fn pressed(mut self, id: Option<&'a str>) -> Self {
        self.pressed = id;
        self
    }
}

fn button_style(action: &KeypadAction, pressed: bool) -> Style {
    if pressed {
        return Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
    }
    match action {
        KeypadAction::Equals => Style::default().fg(Color::Green),
        KeypadAction::Clear | KeypadAction::Back => Style::default().fg(Color::Red),
        KeypadAction::Insert(text) if text.chars().all(|c| c.is_ascii_digit() || c == '.') => {
            Style::default().fg(Color::White)
        }
        KeypadAction::Insert(text) if text.chars().count() == 1 => {
            Style::default().fg(Color::Yellow)
        }
        KeypadAction::Insert(_) => Style::default().fg(Color::Cyan),
    }
}

impl Widget for KeypadWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Block::default()
            .title(" Keypad ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .render(area, buf);

        let Some(grid) = Grid::new(self.keypad, area) else {
            return;
        };

        for def in self.keypad.buttons() {
            let (x, y) = grid.origin(def);
            let style = button_style(&def.action, self.pressed == Some(def.id.as_str()));
            let label = format!("[{}]", def.action.label());
            let label_width = label.chars().count() as u16;
            let label_x = x + grid.cell_width.saturating_sub(label_width) / 2;
            let label_y = y + grid.cell_height / 2;
            if label_y < grid.inner.y + grid.inner.height {
                buf.set_span(label_x, label_y, &Span::styled(label, style), grid.cell_width);
            }
        }
    }
}
