//! Keypad model shared by the browser and terminal front-ends
//!
//! Buttons are described the way the page marks them up: a `data-action`
//! of `clear`, `back` or `equals`, or a `data-insert` carrying the text to
//! splice into the field.

use crate::wasm::DomElement;

/// Attribute naming a control action
pub const ACTION_ATTR: &str = "data-action";
/// Attribute carrying text to insert
pub const INSERT_ATTR: &str = "data-insert";

/// What pressing a keypad button does
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeypadAction {
    /// Empty the field and both displays
    Clear,
    /// Delete the selection or the char before the caret
    Back,
    /// Evaluate the field
    Equals,
    /// Splice text over the selection
    Insert(String),
}

impl KeypadAction {
    /// Resolves a button's markers.
    ///
    /// A known `data-action` wins. Otherwise a non-empty `data-insert`
    /// inserts; anything else is not actionable.
    #[must_use]
    pub fn from_markers(action: Option<&str>, insert: Option<&str>) -> Option<Self> {
        match action {
            Some("clear") => Some(Self::Clear),
            Some("back") => Some(Self::Back),
            Some("equals") => Some(Self::Equals),
            _ => insert
                .filter(|text| !text.is_empty())
                .map(|text| Self::Insert(text.to_string())),
        }
    }

    /// Shorthand for an insert action
    #[must_use]
    pub fn insert(text: &str) -> Self {
        Self::Insert(text.to_string())
    }

    /// Value of the `data-action` marker, if this is a control action
    #[must_use]
    pub fn action_marker(&self) -> Option<&'static str> {
        match self {
            Self::Clear => Some("clear"),
            Self::Back => Some("back"),
            Self::Equals => Some("equals"),
            Self::Insert(_) => None,
        }
    }

    /// Value of the `data-insert` marker, if this inserts text
    #[must_use]
    pub fn insert_marker(&self) -> Option<&str> {
        match self {
            Self::Insert(text) => Some(text),
            _ => None,
        }
    }

    /// Button caption
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Clear => "C".to_string(),
            Self::Back => "⌫".to_string(),
            Self::Equals => "=".to_string(),
            Self::Insert(text) => text.strip_suffix('(').map_or_else(
                || text.clone(),
                |name| if name.is_empty() { "(".to_string() } else { name.to_string() },
            ),
        }
    }
}

/// A single keypad button definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadButtonDef {
    /// The action this button performs
    pub action: KeypadAction,
    /// The DOM element ID for this button
    pub id: String,
    /// Grid row (0-indexed)
    pub row: usize,
    /// Grid column (0-indexed)
    pub col: usize,
}

impl KeypadButtonDef {
    /// Creates a new button definition
    #[must_use]
    pub fn new(action: KeypadAction, row: usize, col: usize) -> Self {
        let id = match &action {
            KeypadAction::Clear => "btn-clear".to_string(),
            KeypadAction::Back => "btn-back".to_string(),
            KeypadAction::Equals => "btn-equals".to_string(),
            KeypadAction::Insert(text) => format!("btn-{}", insert_name(text)),
        };
        Self {
            action,
            id,
            row,
            col,
        }
    }

    /// Creates the `<button>` element carrying this button's markers
    #[must_use]
    pub fn to_dom_element(&self) -> DomElement {
        let mut button = DomElement::new("button")
            .with_id(&self.id)
            .with_text(&self.action.label())
            .with_class("keypad-btn")
            .with_class(&format!("keypad-row-{}", self.row))
            .with_class(&format!("keypad-col-{}", self.col));
        if let Some(marker) = self.action.action_marker() {
            button = button.with_attr(ACTION_ATTR, marker);
        }
        if let Some(marker) = self.action.insert_marker() {
            button = button.with_attr(INSERT_ATTR, marker);
        }
        button
    }
}

/// Element-id fragment for inserted text
fn insert_name(text: &str) -> String {
    match text {
        "+" => "plus".to_string(),
        "-" => "minus".to_string(),
        "*" => "times".to_string(),
        "/" => "divide".to_string(),
        "^" => "caret".to_string(),
        "." => "decimal".to_string(),
        "," => "comma".to_string(),
        "(" => "open-paren".to_string(),
        ")" => "close-paren".to_string(),
        other => {
            let name: String = other.chars().filter(char::is_ascii_alphanumeric).collect();
            if name.is_empty() {
                "insert".to_string()
            } else {
                name
            }
        }
    }
}

/// Scientific keypad layout
///
/// ```text
/// [ C ] [ ⌫ ] [ ( ] [ ) ] [ ^ ] [ / ]
/// [ 7 ] [ 8 ] [ 9 ] [ * ] [sqrt] [power]
/// [ 4 ] [ 5 ] [ 6 ] [ - ] [sin] [cos]
/// [ 1 ] [ 2 ] [ 3 ] [ + ] [tan] [ , ]
/// [ 0 ] [ . ] [pi ] [ e ] [ = ]
/// ```
#[derive(Debug, Clone)]
pub struct WidgetKeypad {
    buttons: Vec<KeypadButtonDef>,
}

impl Default for WidgetKeypad {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetKeypad {
    /// Class of the keypad container, matched by the default `.keys` selector
    pub const CONTAINER_CLASS: &'static str = "keys";

    /// Creates the standard scientific keypad
    #[must_use]
    pub fn new() -> Self {
        use KeypadAction::{Back, Clear, Equals};
        let ins = KeypadAction::insert;
        let rows: [Vec<KeypadAction>; 5] = [
            vec![Clear, Back, ins("("), ins(")"), ins("^"), ins("/")],
            vec![ins("7"), ins("8"), ins("9"), ins("*"), ins("sqrt("), ins("power(")],
            vec![ins("4"), ins("5"), ins("6"), ins("-"), ins("sin("), ins("cos(")],
            vec![ins("1"), ins("2"), ins("3"), ins("+"), ins("tan("), ins(",")],
            vec![ins("0"), ins("."), ins("pi"), ins("e"), Equals],
        ];
        Self::from_rows(rows)
    }

    /// Builds a keypad from rows of actions; rows may differ in length
    #[must_use]
    pub fn from_rows<R>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = KeypadAction>,
    {
        let buttons = rows
            .into_iter()
            .enumerate()
            .flat_map(|(row, actions)| {
                actions
                    .into_iter()
                    .enumerate()
                    .map(move |(col, action)| KeypadButtonDef::new(action, row, col))
            })
            .collect();
        Self { buttons }
    }

    /// Returns the number of buttons
    #[must_use]
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    /// Returns the grid dimensions (rows, widest row)
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        let rows = self.buttons.iter().map(|b| b.row + 1).max().unwrap_or(0);
        let cols = self.buttons.iter().map(|b| b.col + 1).max().unwrap_or(0);
        (rows, cols)
    }

    /// Number of buttons in `row`
    #[must_use]
    pub fn row_len(&self, row: usize) -> usize {
        self.buttons.iter().filter(|b| b.row == row).count()
    }

    /// Gets all button definitions
    #[must_use]
    pub fn buttons(&self) -> &[KeypadButtonDef] {
        &self.buttons
    }

    /// Gets a button by row and column
    #[must_use]
    pub fn get_button_at(&self, row: usize, col: usize) -> Option<&KeypadButtonDef> {
        self.buttons.iter().find(|b| b.row == row && b.col == col)
    }

    /// Finds a button by element ID
    #[must_use]
    pub fn find_button_by_id(&self, id: &str) -> Option<&KeypadButtonDef> {
        self.buttons.iter().find(|b| b.id == id)
    }

    /// Finds the button that inserts `text`
    #[must_use]
    pub fn find_button_by_insert(&self, text: &str) -> Option<&KeypadButtonDef> {
        self.buttons
            .iter()
            .find(|b| b.action.insert_marker() == Some(text))
    }

    /// Finds the button performing `action`
    #[must_use]
    pub fn find_button(&self, action: &KeypadAction) -> Option<&KeypadButtonDef> {
        self.buttons.iter().find(|b| &b.action == action)
    }

    /// Creates DOM elements for all keypad buttons
    #[must_use]
    pub fn create_dom_elements(&self) -> Vec<DomElement> {
        self.buttons
            .iter()
            .map(KeypadButtonDef::to_dom_element)
            .collect()
    }

    /// Creates the keypad container element with all buttons
    #[must_use]
    pub fn create_keypad_element(&self) -> DomElement {
        self.create_dom_elements().into_iter().fold(
            DomElement::new("div")
                .with_id("calc-keypad")
                .with_class(Self::CONTAINER_CLASS),
            DomElement::with_child,
        )
    }
}
