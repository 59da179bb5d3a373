//! Mock DOM for widget testing
//!
//! An in-memory page with the widget's markup. It implements
//! [`WidgetSurface`] so the same [`Widget`](crate::widget::Widget) code that
//! drives the browser runs against it natively.

use std::collections::HashMap;

use crate::config::WidgetConfig;
use crate::core::{ExpressionBuffer, Selection};
use crate::dispatch::WidgetEvent;
use crate::keypad::{WidgetKeypad, ACTION_ATTR, INSERT_ATTR};
use crate::widget::WidgetSurface;

/// Represents a DOM element for testing
#[derive(Debug, Clone, PartialEq)]
pub struct DomElement {
    /// Element ID
    pub id: String,
    /// Element tag name
    pub tag: String,
    /// Text content
    pub text_content: String,
    /// Element attributes
    pub attributes: HashMap<String, String>,
    /// CSS classes
    pub classes: Vec<String>,
    /// Child elements
    pub children: Vec<DomElement>,
}

impl Default for DomElement {
    fn default() -> Self {
        Self::new("div")
    }
}

impl DomElement {
    /// Creates a new DOM element with the given tag
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            id: String::new(),
            tag: tag.to_string(),
            text_content: String::new(),
            attributes: HashMap::new(),
            classes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an element with an ID
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Sets the text content
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text_content = text.to_string();
        self
    }

    /// Adds a class
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Sets an attribute
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Adds a child element
    #[must_use]
    pub fn with_child(mut self, child: DomElement) -> Self {
        self.children.push(child);
        self
    }

    /// Sets text content
    pub fn set_text(&mut self, text: &str) {
        self.text_content = text.to_string();
    }

    /// Checks if element has a class
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Gets an attribute value
    #[must_use]
    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Matches a simple `#id`, `.class` or tag selector
    #[must_use]
    pub fn matches(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            self.id == id
        } else if let Some(class) = selector.strip_prefix('.') {
            self.has_class(class)
        } else {
            self.tag.eq_ignore_ascii_case(selector)
        }
    }
}

/// DOM events recorded by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    /// Click on an element
    Click {
        /// The ID of the clicked element
        element_id: String,
    },
    /// Native text input into the field
    Input {
        /// The ID of the input element
        element_id: String,
        /// The field value afterwards
        value: String,
    },
    /// Keydown in the field
    KeyDown {
        /// The key that was pressed
        key: String,
    },
    /// Focus moved to an element
    Focus {
        /// The ID of the focused element
        element_id: String,
    },
}

impl DomEvent {
    /// Creates a click event
    #[must_use]
    pub fn click(element_id: &str) -> Self {
        Self::Click {
            element_id: element_id.to_string(),
        }
    }

    /// Creates an input event
    #[must_use]
    pub fn input(element_id: &str, value: &str) -> Self {
        Self::Input {
            element_id: element_id.to_string(),
            value: value.to_string(),
        }
    }

    /// Creates a keydown event
    #[must_use]
    pub fn key_down(key: &str) -> Self {
        Self::KeyDown {
            key: key.to_string(),
        }
    }

    /// Creates a focus event
    #[must_use]
    pub fn focus(element_id: &str) -> Self {
        Self::Focus {
            element_id: element_id.to_string(),
        }
    }
}

/// In-memory page hosting one widget
#[derive(Debug)]
pub struct MockDom {
    /// Elements by ID for quick lookup
    elements: HashMap<String, DomElement>,
    /// Event history for verification
    event_history: Vec<DomEvent>,
    /// Focused element ID
    focused_element: Option<String>,
    input_id: String,
    result_id: String,
    error_id: String,
    /// Selection of the input field, in chars
    selection: Option<Selection>,
}

impl Default for MockDom {
    fn default() -> Self {
        Self::widget()
    }
}

impl MockDom {
    /// Creates the widget page with default element ids
    #[must_use]
    pub fn widget() -> Self {
        Self::with_config(&WidgetConfig::default())
    }

    /// Creates the widget page using the ids and keypad selector in `config`
    #[must_use]
    pub fn with_config(config: &WidgetConfig) -> Self {
        let input = DomElement::new("input")
            .with_id(&config.input_id)
            .with_attr("type", "text")
            .with_attr("autocomplete", "off")
            .with_attr("value", "");
        let result = DomElement::new("div")
            .with_id(&config.result_id)
            .with_class("result");
        let error = DomElement::new("div")
            .with_id(&config.error_id)
            .with_class("error");

        let keypad = WidgetKeypad::new();
        let mut container = keypad.create_keypad_element();
        if let Some(id) = config.keypad_selector.strip_prefix('#') {
            container.id = id.to_string();
        } else if let Some(class) = config.keypad_selector.strip_prefix('.') {
            if !container.has_class(class) {
                container.classes.push(class.to_string());
            }
        }

        let mut dom = Self {
            elements: HashMap::new(),
            event_history: Vec::new(),
            focused_element: None,
            input_id: config.input_id.clone(),
            result_id: config.result_id.clone(),
            error_id: config.error_id.clone(),
            selection: None,
        };

        for button in &container.children {
            dom.register_element(button.clone());
        }
        dom.register_element(input);
        dom.register_element(result);
        dom.register_element(error);
        dom.register_element(container);
        dom
    }

    /// Registers an element for ID lookup
    pub fn register_element(&mut self, element: DomElement) {
        if !element.id.is_empty() {
            self.elements.insert(element.id.clone(), element);
        }
    }

    /// Gets an element by ID
    #[must_use]
    pub fn get_element(&self, id: &str) -> Option<&DomElement> {
        self.elements.get(id)
    }

    /// First registered element matching `selector`, in id order
    #[must_use]
    pub fn query_selector(&self, selector: &str) -> Option<&DomElement> {
        let mut ids: Vec<&String> = self.elements.keys().collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|id| self.elements.get(id))
            .find(|elem| elem.matches(selector))
    }

    /// Records an event and applies its effect on focus
    pub fn dispatch_event(&mut self, event: DomEvent) {
        if let DomEvent::Focus { element_id } = &event {
            self.focused_element = Some(element_id.clone());
        }
        self.event_history.push(event);
    }

    /// Gets the event history
    #[must_use]
    pub fn event_history(&self) -> &[DomEvent] {
        &self.event_history
    }

    /// Clears event history
    pub fn clear_event_history(&mut self) {
        self.event_history.clear();
    }

    /// Gets the currently focused element ID
    #[must_use]
    pub fn focused_element(&self) -> Option<&str> {
        self.focused_element.as_deref()
    }

    /// Updates element text by ID
    pub fn set_element_text(&mut self, id: &str, text: &str) {
        if let Some(elem) = self.elements.get_mut(id) {
            elem.set_text(text);
        }
    }

    /// Gets element text by ID
    #[must_use]
    pub fn get_element_text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.text_content.as_str())
    }

    // ===== Widget elements =====

    /// Current value of the input field
    #[must_use]
    pub fn input_text(&self) -> &str {
        self.get_element(&self.input_id)
            .and_then(|e| e.get_attr("value"))
            .unwrap_or_default()
    }

    /// Text of the result display
    #[must_use]
    pub fn result_text(&self) -> &str {
        self.get_element_text(&self.result_id).unwrap_or_default()
    }

    /// Text of the error display
    #[must_use]
    pub fn error_text(&self) -> &str {
        self.get_element_text(&self.error_id).unwrap_or_default()
    }

    /// Whether the input field has focus
    #[must_use]
    pub fn input_focused(&self) -> bool {
        self.focused_element() == Some(self.input_id.as_str())
    }

    /// Selection of the input field as the page sees it
    #[must_use]
    pub fn input_selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Moves the field's selection, as a mouse drag would
    pub fn select(&mut self, selection: Selection) {
        let len = self.input_text().chars().count();
        self.selection = Some(selection.clamped(len));
    }

    /// Types text natively: replaces the selection, caret after it
    pub fn type_text(&mut self, text: &str) {
        let mut buffer = ExpressionBuffer::from_text(self.input_text());
        let selection = self.selection.unwrap_or_else(|| buffer.end_caret());
        let caret = buffer.insert(text, selection);
        self.write_input(buffer.as_str());
        self.selection = Some(caret);
        let input_id = self.input_id.clone();
        self.dispatch_event(DomEvent::input(&input_id, buffer.as_str()));
    }

    /// Clicks element `id` and resolves the event the keypad listener sees.
    ///
    /// Clicks that do not land on a button carry no markers.
    pub fn click(&mut self, id: &str) -> WidgetEvent {
        self.dispatch_event(DomEvent::click(id));
        match self.get_element(id) {
            Some(elem) if elem.tag == "button" => {
                WidgetEvent::click(elem.get_attr(ACTION_ATTR), elem.get_attr(INSERT_ATTR))
            }
            _ => WidgetEvent::click(None, None),
        }
    }

    /// Presses a key in the input field
    pub fn key_down(&mut self, key: &str) -> WidgetEvent {
        self.dispatch_event(DomEvent::key_down(key));
        WidgetEvent::key_down(key)
    }

    fn write_input(&mut self, value: &str) {
        if let Some(input) = self.elements.get_mut(&self.input_id) {
            input
                .attributes
                .insert("value".to_string(), value.to_string());
        }
    }
}

impl WidgetSurface for MockDom {
    fn input_value(&self) -> String {
        self.input_text().to_string()
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_input(&mut self, value: &str, selection: Selection) {
        self.write_input(value);
        self.selection = Some(selection);
    }

    fn set_result_text(&mut self, text: &str) {
        let id = self.result_id.clone();
        self.set_element_text(&id, text);
    }

    fn set_error_text(&mut self, text: &str) {
        let id = self.error_id.clone();
        self.set_element_text(&id, text);
    }

    fn focus_input(&mut self) {
        let id = self.input_id.clone();
        self.dispatch_event(DomEvent::focus(&id));
    }
}
