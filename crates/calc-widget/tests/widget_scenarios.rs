//! Widget scenarios run against every front-end

use calc_widget::driver::{run_full_specification, WidgetDriver};
use calc_widget::prelude::*;

#[tokio::test]
async fn test_full_specification_on_mock_dom() {
    run_full_specification(DomDriver::new).await;
}

#[tokio::test]
async fn test_full_specification_with_latest_request_policy() {
    let config = WidgetConfig::default().with_policy(ResponsePolicy::LatestRequest);
    run_full_specification(|| DomDriver::with_config(&config)).await;
}

/// A session mixing native typing, keypad clicks and evaluation
async fn session<D: WidgetDriver>(driver: &mut D) {
    driver.type_text("9").await;
    driver.click_button(&KeypadAction::insert("sqrt(")).await;
    driver.click_button(&KeypadAction::Back).await;
    driver.click_button(&KeypadAction::insert("*")).await;
    driver.click_button(&KeypadAction::insert("2")).await;
    driver.set_selection(Selection::caret(0)).await;
    driver.click_button(&KeypadAction::insert("1")).await;

    driver.script(ScriptedReply::value(388));
    driver.click_button(&KeypadAction::Equals).await;
}

#[tokio::test]
async fn test_scripted_session_on_mock_dom() {
    let mut driver = DomDriver::new();
    session(&mut driver).await;
    assert_eq!(driver.input_text(), "19sqrt*2");
    assert_eq!(driver.selection(), Some(Selection::caret(1)));
    assert_eq!(driver.sent_expressions(), ["19sqrt*2"]);
    assert_eq!(driver.result_text(), "388");
}

#[cfg(feature = "tui")]
mod terminal {
    use super::*;

    #[tokio::test]
    async fn test_full_specification_on_terminal() {
        run_full_specification(TerminalDriver::new).await;
    }

    #[tokio::test]
    async fn test_front_ends_agree() {
        let mut dom = DomDriver::new();
        let mut terminal = TerminalDriver::new();
        session(&mut dom).await;
        session(&mut terminal).await;

        assert_eq!(dom.input_text(), terminal.input_text());
        assert_eq!(dom.selection(), terminal.selection());
        assert_eq!(dom.sent_expressions(), terminal.sent_expressions());
        assert_eq!(dom.result_text(), terminal.result_text());
        assert_eq!(dom.error_text(), terminal.error_text());
    }
}

// ===== Overlapping evaluations =====

fn overlapping(policy: ResponsePolicy) -> (Widget<MockDom>, bool, bool) {
    let mut widget = Widget::with_policy(MockDom::widget(), policy);
    widget.surface_mut().type_text("1+1");
    let first = widget.run(Command::Evaluate).unwrap();
    widget.surface_mut().type_text("0");
    let second = widget.run(Command::Evaluate).unwrap();

    // The later request answers first
    let second_applied = widget.finish_evaluation(second.ticket, Ok(Evaluation::with_value(11)));
    let first_applied = widget.finish_evaluation(first.ticket, Ok(Evaluation::with_value(2)));
    (widget, first_applied, second_applied)
}

#[test]
fn test_last_arrival_wins_by_default() {
    let (widget, first_applied, second_applied) = overlapping(ResponsePolicy::LastArrival);
    assert!(first_applied && second_applied);
    assert_eq!(widget.surface().result_text(), "2");
}

#[test]
fn test_latest_request_discards_stale_reply() {
    let (widget, first_applied, second_applied) = overlapping(ResponsePolicy::LatestRequest);
    assert!(!first_applied);
    assert!(second_applied);
    assert_eq!(widget.surface().result_text(), "11");
}
