//! Property-based tests for cursor-aware editing

use calc_widget::controller::InputController;
use calc_widget::core::{char_offset_from_utf16, utf16_offset_from_char, Selection};
use calc_widget::service::Evaluation;
use proptest::prelude::*;

/// Field text including multi-byte and astral characters
fn field_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!['1', '2', '+', '(', ')', ' ', 'π', '√', '𝑥']),
        0..16,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// A field plus a selection inside it
fn field_and_selection() -> impl Strategy<Value = (String, Selection)> {
    field_strategy().prop_flat_map(|text| {
        let len = text.chars().count();
        (Just(text), 0..=len, 0..=len).prop_map(|(text, a, b)| (text, Selection::new(a, b)))
    })
}

fn fragment_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["7", "+", "sqrt(", "pi", "π", ","]).prop_map(str::to_string)
}

fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

proptest! {
    /// insert replaces [start, end) and leaves the caret after the fragment
    #[test]
    fn prop_insert_splices_at_selection(
        (text, sel) in field_and_selection(),
        fragment in fragment_strategy(),
    ) {
        let mut controller = InputController::new();
        controller.set_field(&text, Some(sel));
        controller.insert(&fragment);

        let before = chars(&text);
        let expected: String = before[..sel.start]
            .iter()
            .chain(fragment.chars().collect::<Vec<_>>().iter())
            .chain(before[sel.end..].iter())
            .collect();
        prop_assert_eq!(controller.text(), expected.as_str());
        prop_assert_eq!(
            controller.selection(),
            Selection::caret(sel.start + fragment.chars().count())
        );
    }

    /// backspace deletes the selection, or one char before the caret
    #[test]
    fn prop_backspace_deletes_one_unit((text, sel) in field_and_selection()) {
        let mut controller = InputController::new();
        controller.set_field(&text, Some(sel));
        controller.backspace();

        let before = chars(&text);
        let (from, to) = if sel.is_caret() {
            (sel.start.saturating_sub(1), sel.start)
        } else {
            (sel.start, sel.end)
        };
        let expected: String = before[..from].iter().chain(before[to..].iter()).collect();
        prop_assert_eq!(controller.text(), expected.as_str());
        prop_assert_eq!(controller.selection(), Selection::caret(from));
    }

    /// Editing never touches the result display
    #[test]
    fn prop_editing_keeps_result(
        (text, sel) in field_and_selection(),
        fragment in fragment_strategy(),
    ) {
        let mut controller = InputController::new();
        controller.set_field("6*7", None);
        let pending = controller.begin_evaluation().unwrap();
        controller.complete_evaluation(pending.ticket, Ok(Evaluation::with_value(42)));

        controller.set_field(&text, Some(sel));
        controller.insert(&fragment);
        controller.backspace();
        prop_assert_eq!(controller.result_text(), "42");
    }

    /// clear always yields an empty field with the caret at the origin
    #[test]
    fn prop_clear_resets((text, sel) in field_and_selection()) {
        let mut controller = InputController::new();
        controller.set_field(&text, Some(sel));
        controller.clear();
        prop_assert_eq!(controller.text(), "");
        prop_assert_eq!(controller.selection(), Selection::caret(0));
        prop_assert_eq!(controller.result_text(), "");
        prop_assert_eq!(controller.error_text(), "");
    }

    /// Whitespace-only fields never produce a request
    #[test]
    fn prop_blank_field_sends_nothing(spaces in " {0,8}") {
        let mut controller = InputController::new();
        controller.set_field(&spaces, None);
        prop_assert!(controller.begin_evaluation().is_none());
        prop_assert_eq!(controller.latest_ticket(), None);
    }

    /// Requests carry the trimmed field
    #[test]
    fn prop_request_is_trimmed(text in field_strategy()) {
        let mut controller = InputController::new();
        controller.set_field(&text, None);
        match controller.begin_evaluation() {
            Some(pending) => prop_assert_eq!(pending.request.expression.as_str(), text.trim()),
            None => prop_assert!(text.trim().is_empty()),
        }
    }

    /// Browser offsets map back to the same char offset
    #[test]
    fn prop_utf16_offsets_round_trip((text, sel) in field_and_selection()) {
        let utf16 = utf16_offset_from_char(&text, sel.start);
        prop_assert_eq!(char_offset_from_utf16(&text, utf16), sel.start);
    }
}
