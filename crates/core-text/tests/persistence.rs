//! Property tests: text operations return new values and never disturb the input.

use core_text::{Line, Text};
use proptest::prelude::*;

fn text_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zé\t ]{0,12}", 0..24)
}

proptest! {
    #[test]
    fn edits_leave_source_intact(lines in text_strategy(), row in 0usize..30, word in "[a-z]{0,6}") {
        let t = Text::from_lines(lines.iter().map(String::as_str));
        let before: Vec<String> = t.iter().map(|l| l.to_string()).collect();

        let inserted = t.insert(row, Line::from(word.as_str()));
        let removed = t.remove(row);
        let replaced = t.set(row, Line::from(word.as_str()));

        let after: Vec<String> = t.iter().map(|l| l.to_string()).collect();
        prop_assert_eq!(&before, &after);
        prop_assert_eq!(inserted.len(), t.len() + 1);
        prop_assert_eq!(removed.len(), t.len() - usize::from(row < t.len()));
        prop_assert_eq!(replaced.len(), t.len());
    }

    #[test]
    fn take_then_skip_reassembles(lines in text_strategy(), at in 0usize..30) {
        let t = Text::from_lines(lines.iter().map(String::as_str));
        let joined = t.take(at).concat(&t.skip(at));
        prop_assert_eq!(joined, t);
    }

    #[test]
    fn display_matches_joined_lines(lines in text_strategy()) {
        let t = Text::from_lines(lines.iter().map(String::as_str));
        let expected: String = lines.iter().map(|l| format!("{l}\n")).collect();
        prop_assert_eq!(t.to_string(), expected.clone());
        prop_assert_eq!(Text::parse(&expected), t);
    }
}
