//! Browser bindings
//!
//! Binds a [`Widget`] to the real page: looks up the configured elements,
//! attaches the delegated keypad click listener and the field keydown
//! listener, and runs evaluations with `spawn_local`.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, Document, Element, HtmlInputElement, KeyboardEvent, MouseEvent};

use crate::config::WidgetConfig;
use crate::controller::PendingEvaluation;
use crate::core::{char_offset_from_utf16, utf16_offset_from_char, Selection};
use crate::dispatch::WidgetEvent;
use crate::error::{WidgetError, WidgetResult};
use crate::keypad::{WidgetKeypad, ACTION_ATTR, INSERT_ATTR};
use crate::service::{Evaluator, FetchEvaluator};
use crate::widget::{Widget, WidgetSurface};

/// The widget's elements on a live page
#[derive(Debug)]
pub struct BrowserSurface {
    input: HtmlInputElement,
    result: Element,
    error: Element,
}

impl BrowserSurface {
    /// Looks up the configured elements in `document`
    pub fn locate(document: &Document, config: &WidgetConfig) -> WidgetResult<Self> {
        let input = document
            .get_element_by_id(&config.input_id)
            .ok_or_else(|| WidgetError::dom(format!("no element #{}", config.input_id)))?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| WidgetError::dom(format!("#{} is not an <input>", config.input_id)))?;
        let result = document
            .get_element_by_id(&config.result_id)
            .ok_or_else(|| WidgetError::dom(format!("no element #{}", config.result_id)))?;
        let error = document
            .get_element_by_id(&config.error_id)
            .ok_or_else(|| WidgetError::dom(format!("no element #{}", config.error_id)))?;
        Ok(Self {
            input,
            result,
            error,
        })
    }

    fn input(&self) -> &HtmlInputElement {
        &self.input
    }
}

impl WidgetSurface for BrowserSurface {
    fn input_value(&self) -> String {
        self.input.value()
    }

    fn selection(&self) -> Option<Selection> {
        let value = self.input.value();
        let start = self.input.selection_start().ok().flatten()?;
        let end = self.input.selection_end().ok().flatten()?;
        Some(Selection::new(
            char_offset_from_utf16(&value, start as usize),
            char_offset_from_utf16(&value, end as usize),
        ))
    }

    fn set_input(&mut self, value: &str, selection: Selection) {
        self.input.set_value(value);
        let start = utf16_offset_from_char(value, selection.start) as u32;
        let end = utf16_offset_from_char(value, selection.end) as u32;
        if self.input.set_selection_range(start, end).is_err() {
            console::warn_1(&"calc-widget: could not place the caret".into());
        }
    }

    fn set_result_text(&mut self, text: &str) {
        self.result.set_text_content(Some(text));
    }

    fn set_error_text(&mut self, text: &str) {
        self.error.set_text_content(Some(text));
    }

    fn focus_input(&mut self) {
        if self.input.focus().is_err() {
            console::warn_1(&"calc-widget: could not focus the field".into());
        }
    }
}

type SharedWidget = Rc<RefCell<Widget<BrowserSurface>>>;

/// A widget mounted on the page
#[derive(Debug)]
#[wasm_bindgen]
pub struct MountedWidget {
    widget: SharedWidget,
}

#[wasm_bindgen]
impl MountedWidget {
    /// Current field text, including native typing not yet seen by a command
    #[wasm_bindgen(getter)]
    pub fn input(&self) -> String {
        self.widget.borrow().surface().input_value()
    }

    /// Result display text
    #[wasm_bindgen(getter)]
    pub fn result(&self) -> String {
        self.widget.borrow().controller().result_text().to_string()
    }

    /// Error display text
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> String {
        self.widget.borrow().controller().error_text().to_string()
    }
}

/// Mounts the widget. `config_json` is a JSON [`WidgetConfig`]; missing
/// fields take their defaults.
#[wasm_bindgen]
pub fn mount(config_json: Option<String>) -> Result<MountedWidget, JsValue> {
    let config = match config_json.as_deref() {
        Some(json) => WidgetConfig::from_json_str(json),
        None => Ok(WidgetConfig::default()),
    }
    .map_err(to_js)?;
    mount_with(&config).map_err(to_js)
}

/// Mounts the widget with `config`
pub fn mount_with(config: &WidgetConfig) -> WidgetResult<MountedWidget> {
    config.validate()?;
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| WidgetError::dom("no document available"))?;

    let surface = BrowserSurface::locate(&document, config)?;
    let keypad = document
        .query_selector(&config.keypad_selector)
        .map_err(|_| WidgetError::dom(format!("bad selector {}", config.keypad_selector)))?
        .ok_or_else(|| WidgetError::dom(format!("no element {}", config.keypad_selector)))?;

    if config.populate_keypad && keypad.child_element_count() == 0 {
        populate_keypad(&document, &keypad)?;
    }

    let input = surface.input().clone();
    let widget: SharedWidget = Rc::new(RefCell::new(Widget::new(surface, config)));
    let evaluator = Rc::new(FetchEvaluator::from_config(config));

    let on_click = {
        let widget = Rc::clone(&widget);
        let evaluator = Rc::clone(&evaluator);
        Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let Some(event) = click_event(&event) else {
                return;
            };
            let pending = widget.borrow_mut().handle_event(&event).pending;
            if let Some(pending) = pending {
                spawn_evaluation(&widget, &evaluator, pending);
            }
        })
    };
    keypad
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .map_err(|_| WidgetError::dom("could not listen for keypad clicks"))?;
    on_click.forget();

    let on_keydown = {
        let widget = Rc::clone(&widget);
        let evaluator = Rc::clone(&evaluator);
        Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let outcome = widget
                .borrow_mut()
                .handle_event(&WidgetEvent::key_down(&event.key()));
            if outcome.prevent_default {
                event.prevent_default();
            }
            if let Some(pending) = outcome.pending {
                spawn_evaluation(&widget, &evaluator, pending);
            }
        })
    };
    input
        .add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())
        .map_err(|_| WidgetError::dom("could not listen for keydown"))?;
    on_keydown.forget();

    widget.borrow_mut().surface_mut().focus_input();
    console::log_1(&format!("calc-widget mounted (endpoint {})", config.endpoint).into());
    Ok(MountedWidget { widget })
}

/// Resolves a click to the nearest enclosing button's markers
fn click_event(event: &MouseEvent) -> Option<WidgetEvent> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let button = target.closest("button").ok()??;
    Some(WidgetEvent::click(
        button.get_attribute(ACTION_ATTR).as_deref(),
        button.get_attribute(INSERT_ATTR).as_deref(),
    ))
}

/// Awaits the service without holding the widget borrow
fn spawn_evaluation(
    widget: &SharedWidget,
    evaluator: &Rc<FetchEvaluator>,
    pending: PendingEvaluation,
) {
    let widget = Rc::clone(widget);
    let evaluator = Rc::clone(evaluator);
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = evaluator.evaluate(&pending.request).await;
        widget.borrow_mut().finish_evaluation(pending.ticket, outcome);
    });
}

fn populate_keypad(document: &Document, container: &Element) -> WidgetResult<()> {
    for def in WidgetKeypad::new().buttons() {
        let button = document
            .create_element("button")
            .map_err(|_| WidgetError::dom("could not create a keypad button"))?;
        let template = def.to_dom_element();
        button.set_id(&template.id);
        button.set_text_content(Some(&template.text_content));
        button.set_class_name(&template.classes.join(" "));
        for (name, value) in &template.attributes {
            button
                .set_attribute(name, value)
                .map_err(|_| WidgetError::dom(format!("could not set {name}")))?;
        }
        button
            .set_attribute("type", "button")
            .map_err(|_| WidgetError::dom("could not set type"))?;
        container
            .append_child(&button)
            .map_err(|_| WidgetError::dom("could not append a keypad button"))?;
    }
    Ok(())
}

fn to_js(err: WidgetError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Installs the panic hook when the module loads
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    console::log_1(&"calc-widget loaded".into());
}
