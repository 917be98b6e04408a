mod common;
use common::app;

use core_actions::{Action, CommandArg, update};
use core_state::{FileState, LoadingFile, SavingFile};
use core_text::Text;
use proptest::prelude::*;
use std::path::Path;
use std::sync::Arc;

fn busy_file(loading: bool, lines: &[String], progress: u64) -> FileState {
    let name: Arc<Path> = Arc::from(Path::new("busy.txt"));
    let content = Text::from_lines(lines.iter().map(String::as_str));
    if loading {
        FileState::Loading(LoadingFile {
            name,
            content,
            loaded_bytes: progress,
            total_bytes: progress * 2 + 1,
        })
    } else {
        FileState::Saving(SavingFile {
            name,
            content,
            saved_lines: progress as usize,
        })
    }
}

proptest! {
    #[test]
    fn io_commands_are_refused_while_busy(
        loading in any::<bool>(),
        lines in proptest::collection::vec("[a-z ]{0,8}", 0..6),
        progress in 0u64..1000,
        use_load in any::<bool>(),
    ) {
        let mut start = app();
        start.current.file = busy_file(loading, &lines, progress);
        start.current.content = Text::from_lines(lines.iter().map(String::as_str));
        let action = if use_load {
            Action::command_with("load", CommandArg::Text("other.txt".into()))
        } else {
            Action::command("save")
        };
        let (after, effect) = update(start.clone(), action);
        prop_assert!(effect.is_none());
        prop_assert_eq!(&after.current.content, &start.current.content);
        prop_assert_eq!(&after.current.file, &start.current.file);
        let expected = if use_load {
            "can't load while saving or loading the file"
        } else {
            "can't save while saving or loading the file"
        };
        prop_assert_eq!(after.last_message(), Some(expected));
    }
}
