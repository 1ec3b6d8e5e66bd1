//! End-to-end typing through the trigger engine, the way an editor drives it:
//! every character is offered to the engine first and inserted normally when
//! it is not handled.

use autoformat_engine::{
    BlockType, DocumentStore, EditorState, InlineStyle, Outcome, RichText, StyleSet, UndoHistory,
    on_before_insert,
};
use pretty_assertions::assert_eq;
use relative_path::RelativePath;
use rstest::rstest;

fn type_text(mut state: EditorState, text: &str) -> EditorState {
    for ch in text.chars() {
        let inserted = ch.to_string();
        state = match on_before_insert(&state, &inserted).unwrap() {
            Outcome::Handled(next) => next,
            Outcome::NotHandled => state.insert_text(&inserted).unwrap(),
        };
    }
    state
}

fn styles_of(state: &EditorState) -> Vec<StyleSet> {
    state.blocks()[0].styles().to_vec()
}

#[test]
fn scenario_heading_on_empty_block() {
    let state = type_text(EditorState::new(), "# ");
    assert_eq!(state.blocks().len(), 1);
    assert_eq!(state.blocks()[0].block_type(), BlockType::HeaderOne);
    assert_eq!(state.blocks()[0].text(), "");
}

#[test]
fn scenario_redline_after_text() {
    let state = type_text(EditorState::new(), "hello ** ");
    assert_eq!(state.blocks()[0].text(), "hello ");
    assert_eq!(
        state.current_inline_style(),
        StyleSet::from([InlineStyle::Redline])
    );
}

#[test]
fn scenario_bold_after_word() {
    let state = type_text(EditorState::new(), "foo* ");
    assert_eq!(state.blocks()[0].text(), "foo");
    assert_eq!(
        state.current_inline_style(),
        StyleSet::from([InlineStyle::Bold])
    );
}

#[test]
fn scenario_code_marker() {
    let state = type_text(EditorState::new(), "``` ");
    assert_eq!(state.blocks()[0].text(), "");
    assert_eq!(
        state.current_inline_style(),
        StyleSet::from([InlineStyle::Code])
    );
}

#[test]
fn scenario_plain_space() {
    let state = type_text(EditorState::new(), "hello ");
    assert_eq!(state.blocks()[0].text(), "hello ");
    assert_eq!(state.blocks()[0].block_type(), BlockType::Unstyled);
    assert!(styles_of(&state).iter().all(|s| s.is_empty()));
}

#[test]
fn scenario_save_then_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path());
    let name = RelativePath::new("editorContent.json");

    let mut state = type_text(EditorState::new(), "# Title");
    state = state.split_block(&state.selection()).unwrap();
    state = type_text(state, "plain * strong");

    store.save(name, &state).unwrap();
    let reloaded = store.load(name).unwrap().unwrap();

    assert_eq!(reloaded.blocks(), state.blocks());
    assert_eq!(reloaded.blocks()[0].block_type(), BlockType::HeaderOne);
    assert_eq!(reloaded.blocks()[1].text(), "plain strong");
    assert!(
        reloaded.blocks()[1]
            .style_at(6)
            .unwrap()
            .contains(&InlineStyle::Bold)
    );
}

#[rstest]
#[case("* text", "text", InlineStyle::Bold)]
#[case("** text", "text", InlineStyle::Redline)]
#[case("*** text", "text", InlineStyle::Underline)]
#[case("``` text", "text", InlineStyle::Code)]
fn styled_text_after_marker(
    #[case] typed: &str,
    #[case] expected_text: &str,
    #[case] style: InlineStyle,
) {
    let state = type_text(EditorState::new(), typed);
    assert_eq!(state.blocks()[0].text(), expected_text);
    assert!(styles_of(&state).iter().all(|s| s == &StyleSet::from([style])));
}

#[test]
fn toggling_twice_ends_the_style() {
    let state = type_text(EditorState::new(), "a* b* c");
    assert_eq!(state.blocks()[0].text(), "abc");
    let bold: Vec<bool> = styles_of(&state)
        .iter()
        .map(|s| s.contains(&InlineStyle::Bold))
        .collect();
    assert_eq!(bold, vec![false, true, false]);
}

#[test]
fn no_marker_characters_survive() {
    let state = type_text(EditorState::new(), "x*** y** z* w``` ");
    assert!(!state.plain_text().contains('*'));
    assert!(!state.plain_text().contains('`'));
}

#[test]
fn autoformat_is_one_undo_step() {
    let mut history = UndoHistory::new(EditorState::new());
    let typed = type_text(history.current().clone(), "#");
    history.push(typed);

    let Outcome::Handled(next) = on_before_insert(history.current(), " ").unwrap() else {
        panic!("expected heading trigger");
    };
    history.push(next);
    assert_eq!(history.current().blocks()[0].block_type(), BlockType::HeaderOne);

    let restored = history.undo().unwrap();
    assert_eq!(restored.blocks()[0].text(), "#");
    assert_eq!(restored.blocks()[0].block_type(), BlockType::Unstyled);

    let redone = history.redo().unwrap();
    assert_eq!(redone.blocks()[0].block_type(), BlockType::HeaderOne);
}
