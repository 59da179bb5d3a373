//! Mock-DOM Driver
//!
//! Drives a [`Widget`] over a [`MockDom`] through the same path the browser
//! listeners take: element click or keydown, marker resolution, dispatch.

use std::sync::Arc;

use async_trait::async_trait;

use super::dom::MockDom;
use crate::config::WidgetConfig;
use crate::core::Selection;
use crate::driver::WidgetDriver;
use crate::keypad::{KeypadAction, WidgetKeypad};
use crate::service::{Evaluator, ScriptedEvaluator, ScriptedReply};
use crate::widget::{EventOutcome, Widget};

/// Driver wrapping a widget on the mock DOM
#[derive(Debug)]
pub struct DomDriver {
    widget: Widget<MockDom>,
    evaluator: Arc<ScriptedEvaluator>,
    prevented: usize,
}

impl Default for DomDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DomDriver {
    /// Creates a driver on the default widget page
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&WidgetConfig::default())
    }

    /// Creates a driver using `config` for ids, submit key and policy
    #[must_use]
    pub fn with_config(config: &WidgetConfig) -> Self {
        Self {
            widget: Widget::new(MockDom::with_config(config), config),
            evaluator: Arc::new(ScriptedEvaluator::new()),
            prevented: 0,
        }
    }

    /// Returns the widget
    #[must_use]
    pub fn widget(&self) -> &Widget<MockDom> {
        &self.widget
    }

    /// Returns the DOM
    #[must_use]
    pub fn dom(&self) -> &MockDom {
        self.widget.surface()
    }

    /// Returns the scripted service
    #[must_use]
    pub fn evaluator(&self) -> &Arc<ScriptedEvaluator> {
        &self.evaluator
    }

    /// Number of keydowns whose default action was suppressed
    #[must_use]
    pub fn prevented_defaults(&self) -> usize {
        self.prevented
    }

    /// Clicks an element by id
    pub async fn click_element(&mut self, id: &str) {
        let event = self.widget.surface_mut().click(id);
        let outcome = self.widget.handle_event(&event);
        self.settle(outcome).await;
    }

    async fn settle(&mut self, outcome: EventOutcome) {
        if outcome.prevent_default {
            self.prevented += 1;
        }
        if let Some(pending) = outcome.pending {
            let result = self.evaluator.evaluate(&pending.request).await;
            self.widget.finish_evaluation(pending.ticket, result);
        }
    }
}

#[async_trait(?Send)]
impl WidgetDriver for DomDriver {
    async fn type_text(&mut self, text: &str) {
        self.widget.surface_mut().type_text(text);
    }

    async fn set_selection(&mut self, selection: Selection) {
        self.widget.surface_mut().select(selection);
    }

    async fn click_button(&mut self, action: &KeypadAction) {
        let id = WidgetKeypad::new()
            .find_button(action)
            .map(|b| b.id.clone())
            .unwrap_or_default();
        self.click_element(&id).await;
    }

    async fn press_key(&mut self, key: &str) {
        let event = self.widget.surface_mut().key_down(key);
        let outcome = self.widget.handle_event(&event);
        self.settle(outcome).await;
    }

    fn script(&mut self, reply: ScriptedReply) {
        self.evaluator.push(reply);
    }

    fn sent_expressions(&self) -> Vec<String> {
        self.evaluator
            .requests()
            .into_iter()
            .map(|r| r.expression)
            .collect()
    }

    fn input_text(&self) -> String {
        self.dom().input_text().to_string()
    }

    fn selection(&self) -> Option<Selection> {
        self.dom().input_selection()
    }

    fn result_text(&self) -> String {
        self.dom().result_text().to_string()
    }

    fn error_text(&self) -> String {
        self.dom().error_text().to_string()
    }
}
