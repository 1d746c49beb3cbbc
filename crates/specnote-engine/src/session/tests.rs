use std::path::PathBuf;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use rstest::rstest;
use specnote_config::{Settings, SettingsPatch};
use tempfile::TempDir;

use super::*;
use crate::model::Document;
use crate::persistence::MemoryStore;
use crate::tests::{ScriptedIo, paragraph_update, saved};

fn session_at(now: Instant) -> Session<MemoryStore> {
    Session::restore(Settings::default(), MemoryStore::new(), now)
}

fn session() -> Session<MemoryStore> {
    session_at(Instant::now())
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[test]
fn test_fresh_session() {
    let session = session();

    assert_eq!(session.document(Pane::Left).name(), "Untitled");
    assert_eq!(session.document(Pane::Right).name(), "Untitled 2");
    assert_eq!(session.save_state(Pane::Left), SaveState::Saved);
    assert_eq!(session.split_mode(), SplitMode::Single);
    assert_eq!(session.active_pane(), Pane::Left);
    assert!(!session.scroll_sync_enabled());
    assert!(session.autosave().is_running());
}

#[test]
fn test_session_survives_restart() {
    let mut first = session();
    first.set_split_mode(SplitMode::DualDoc);
    first.edit(Pane::Left, paragraph_update("left text"));
    first.edit(Pane::Right, paragraph_update("right text"));
    let json = first.store().json().unwrap().to_string();

    let second = Session::restore(
        Settings::default(),
        MemoryStore::with_json(json),
        Instant::now(),
    );

    assert_eq!(second.document(Pane::Left), first.document(Pane::Left));
    assert_eq!(
        second.documents[1].document(),
        first.documents[1].document()
    );
    assert_eq!(second.save_state(Pane::Left), SaveState::Saved);
}

#[test]
fn test_unreadable_store_starts_fresh() {
    let session = Session::restore(
        Settings::default(),
        MemoryStore::with_json("{ nope"),
        Instant::now(),
    );
    assert_eq!(session.document(Pane::Left).name(), "Untitled");
}

#[test]
fn test_edit_marks_unsaved_and_persists() {
    let mut session = session();
    session.edit(Pane::Left, paragraph_update("hello"));

    assert_eq!(session.save_state(Pane::Left), SaveState::Unsaved);
    assert_eq!(session.document(Pane::Left).content().text_content(), "hello");
    assert_eq!(session.store().writes(), 1);
}

#[rstest]
#[case(SplitMode::Single, SplitMode::SameDoc)]
#[case(SplitMode::SameDoc, SplitMode::DualDoc)]
#[case(SplitMode::DualDoc, SplitMode::Single)]
fn test_split_cycle(#[case] from: SplitMode, #[case] to: SplitMode) {
    assert_eq!(from.next(), to);
}

#[test]
fn test_focus_follows_visibility() {
    let mut session = session();
    assert!(!session.focus(Pane::Right));
    assert_eq!(session.active_pane(), Pane::Left);

    session.toggle_split_mode();
    assert!(session.focus(Pane::Right));
    assert_eq!(session.active_pane(), Pane::Right);

    session.toggle_split_mode();
    session.toggle_split_mode();
    assert_eq!(session.split_mode(), SplitMode::Single);
    assert_eq!(session.active_pane(), Pane::Left);
}

#[test]
fn test_same_doc_panes_share_one_document() {
    let mut session = session();
    session.set_split_mode(SplitMode::SameDoc);

    session.edit(Pane::Right, paragraph_update("typed on the right"));

    assert_eq!(session.document(Pane::Left).id(), session.document(Pane::Right).id());
    assert_eq!(
        session.document(Pane::Left).content().text_content(),
        "typed on the right"
    );
    assert_eq!(session.save_state(Pane::Left), SaveState::Unsaved);
    assert_eq!(session.save_state(Pane::Right), SaveState::Unsaved);
    assert_eq!(session.open_slots(), vec![Pane::Left]);
}

#[test]
fn test_dual_doc_panes_are_independent() {
    let mut session = session();
    session.set_split_mode(SplitMode::DualDoc);

    session.edit(Pane::Right, paragraph_update("right only"));

    assert_ne!(session.document(Pane::Left).id(), session.document(Pane::Right).id());
    assert_eq!(session.save_state(Pane::Left), SaveState::Saved);
    assert_eq!(session.save_state(Pane::Right), SaveState::Unsaved);
    assert_eq!(session.open_slots(), vec![Pane::Left, Pane::Right]);
}

#[test]
fn test_new_document_is_unsaved() {
    let mut session = session();
    let before = session.document(Pane::Left).id();

    session.new_document(Pane::Left);

    assert_ne!(session.document(Pane::Left).id(), before);
    assert_eq!(session.save_state(Pane::Left), SaveState::Unsaved);
    assert!(session.document(Pane::Left).file_path().is_none());
}

#[test]
fn test_open_binds_location_and_skips_dialog_on_save() {
    let stored = Document::new("whatever").to_json().unwrap();
    let mut io = ScriptedIo::new().open("/notes/plan.specnote", stored);
    let mut session = session();

    assert!(session.open_document(Pane::Left, &mut io).unwrap());
    assert_eq!(session.document(Pane::Left).name(), "plan");
    assert_eq!(session.save_state(Pane::Left), SaveState::Saved);

    session.edit(Pane::Left, paragraph_update("more"));
    let outcome = session.save(Pane::Left, &mut io).unwrap();

    assert_eq!(outcome, SaveOutcome::Saved);
    assert_eq!(
        io.save_requests[0].file_path,
        Some(PathBuf::from("/notes/plan.specnote"))
    );
    assert_eq!(session.save_state(Pane::Left), SaveState::Saved);
}

#[test]
fn test_open_cancel_is_noop() {
    let mut session = session();
    let before = session.document(Pane::Left).clone();

    assert!(!session.open_document(Pane::Left, &mut ScriptedIo::new()).unwrap());
    assert_eq!(session.document(Pane::Left), &before);
}

#[test]
fn test_open_malformed_keeps_current_document() {
    let mut io = ScriptedIo::new()
        .open("/a.json", "[1, 2, 3]")
        .open("/b.json", r#"{"id": "x"}"#);
    let mut session = session();
    let before = session.document(Pane::Left).clone();

    let err = session.open_document(Pane::Left, &mut io).unwrap_err();
    assert!(matches!(err, SessionError::InvalidDocument(_)));
    let err = session.open_document(Pane::Left, &mut io).unwrap_err();
    assert!(matches!(err, SessionError::InvalidDocument(_)));

    assert_eq!(session.document(Pane::Left), &before);
}

#[test]
fn test_first_save_prompts_with_default_name() {
    let mut io = ScriptedIo::new().save_to("/docs/essay.specnote");
    let mut session = session();
    session.edit(Pane::Left, paragraph_update("draft"));

    assert_eq!(session.save(Pane::Left, &mut io).unwrap(), SaveOutcome::Saved);

    assert_eq!(io.save_requests[0].file_path, None);
    assert_eq!(io.save_requests[0].default_name, "Untitled.specnote");
    assert_eq!(session.document(Pane::Left).name(), "essay");
    assert_eq!(session.save_state(Pane::Left), SaveState::Saved);
}

#[test]
fn test_failed_save_keeps_content() {
    let mut io = ScriptedIo::new().fail_save("read-only volume");
    let mut session = session();
    session.edit(Pane::Left, paragraph_update("keep me"));

    let outcome = session.save(Pane::Left, &mut io).unwrap();

    assert_eq!(outcome, SaveOutcome::Failed("read-only volume".to_string()));
    assert_eq!(session.save_state(Pane::Left), SaveState::Unsaved);
    assert_eq!(session.document(Pane::Left).content().text_content(), "keep me");
}

#[test]
fn test_save_requested_while_saving_follows_up() {
    let mut session = session();
    session.edit(Pane::Left, paragraph_update("one"));
    let job = session.begin_save(Pane::Left).unwrap().unwrap();

    session.edit(Pane::Left, paragraph_update("two"));
    assert!(session.begin_save(Pane::Left).unwrap().is_none());
    assert_eq!(session.save_state(Pane::Left), SaveState::Saving);

    let done = session.finish_save(job, Ok(saved("/x/one.specnote")));
    let next = done.next.unwrap();
    assert_eq!(
        Document::from_json(&next.request.content)
            .unwrap()
            .content()
            .text_content(),
        "two"
    );

    let mut io = ScriptedIo::new();
    assert_eq!(session.run_save(next, &mut io), SaveOutcome::Saved);
    assert_eq!(session.save_state(Pane::Left), SaveState::Saved);
}

#[test]
fn test_save_while_in_flight_is_queued() {
    let mut session = session();
    session.edit(Pane::Left, paragraph_update("one"));
    let job = session.begin_save(Pane::Left).unwrap().unwrap();
    session.edit(Pane::Left, paragraph_update("two"));

    let mut io = ScriptedIo::new();
    assert_eq!(session.save(Pane::Left, &mut io).unwrap(), SaveOutcome::Queued);
    assert!(io.save_requests.is_empty());

    let done = session.finish_save(job, Err(FileIoError::Canceled));
    assert_eq!(done.outcome, SaveOutcome::Canceled);
    assert_eq!(done.next, None);
    assert_eq!(session.save_state(Pane::Left), SaveState::Unsaved);
}

#[test]
fn test_dual_doc_right_failure_does_not_block_left() {
    let mut session = session();
    session.set_split_mode(SplitMode::DualDoc);
    session.edit(Pane::Left, paragraph_update("left"));
    session.edit(Pane::Right, paragraph_update("right"));

    let left_job = session.begin_save(Pane::Left).unwrap().unwrap();
    let right_job = session.begin_save(Pane::Right).unwrap().unwrap();
    assert_eq!(session.save_state(Pane::Left), SaveState::Saving);
    assert_eq!(session.save_state(Pane::Right), SaveState::Saving);

    let right = session.finish_save(right_job, Err(FileIoError::Failed("disk full".into())));
    assert_eq!(right.outcome, SaveOutcome::Failed("disk full".to_string()));
    assert_eq!(session.save_state(Pane::Right), SaveState::Unsaved);
    assert_eq!(session.save_state(Pane::Left), SaveState::Saving);

    let left = session.finish_save(left_job, Ok(saved("/x/left.specnote")));
    assert_eq!(left.outcome, SaveOutcome::Saved);
    assert_eq!(session.save_state(Pane::Left), SaveState::Saved);
    assert_eq!(session.save_state(Pane::Right), SaveState::Unsaved);
    assert_eq!(
        session.document(Pane::Left).file_path(),
        Some(PathBuf::from("/x/left.specnote").as_path())
    );
    assert!(session.document(Pane::Right).file_path().is_none());
    assert_eq!(session.document(Pane::Right).content().text_content(), "right");
}

#[test]
fn test_dual_doc_left_edits_during_save_survive_right_failure() {
    let mut session = session();
    session.set_split_mode(SplitMode::DualDoc);
    session.edit(Pane::Left, paragraph_update("left v1"));
    session.edit(Pane::Right, paragraph_update("right"));

    let left_job = session.begin_save(Pane::Left).unwrap().unwrap();
    let right_job = session.begin_save(Pane::Right).unwrap().unwrap();

    session.edit(Pane::Left, paragraph_update("left v2"));
    assert!(session.begin_save(Pane::Left).unwrap().is_none());

    session.finish_save(right_job, Err(FileIoError::Failed("disk full".into())));
    assert_eq!(session.save_state(Pane::Left), SaveState::Saving);

    let left = session.finish_save(left_job, Ok(saved("/x/left.specnote")));
    assert_eq!(left.outcome, SaveOutcome::Saved);
    // written content predates the edit
    assert_eq!(session.save_state(Pane::Left), SaveState::Unsaved);
    assert_eq!(session.document(Pane::Left).content().text_content(), "left v2");

    let mut io = ScriptedIo::new();
    assert_eq!(session.run_save(left.next.unwrap(), &mut io), SaveOutcome::Saved);
    assert_eq!(io.save_requests.len(), 1);
    assert_eq!(
        io.save_requests[0].file_path,
        Some(PathBuf::from("/x/left.specnote"))
    );
    assert_eq!(
        Document::from_json(&io.save_requests[0].content)
            .unwrap()
            .content()
            .text_content(),
        "left v2"
    );
    assert_eq!(session.save_state(Pane::Left), SaveState::Saved);
    assert_eq!(session.save_state(Pane::Right), SaveState::Unsaved);
}

#[test]
fn test_scroll_to_where_the_other_pane_is_mirrors_nothing() {
    let mut session = session();
    session.set_split_mode(SplitMode::SameDoc);
    session.set_scroll_sync(true);
    session.set_viewport(Pane::Right, ScrollMetrics::new(250.0, 600.0, 100.0));

    assert_eq!(
        session.scroll(Pane::Left, ScrollMetrics::new(400.0, 1000.0, 200.0)),
        None
    );

    // the right pane's next genuine scroll is mirrored, not swallowed
    let back = session
        .scroll(Pane::Right, ScrollMetrics::new(251.0, 600.0, 100.0))
        .unwrap();
    assert!((back - 401.6).abs() < 1e-9);
}

#[test]
fn test_save_result_after_new_document_is_discarded() {
    let mut session = session();
    session.edit(Pane::Left, paragraph_update("old"));
    let job = session.begin_save(Pane::Left).unwrap().unwrap();

    session.new_document(Pane::Left);
    let done = session.finish_save(job, Ok(saved("/x/old.specnote")));

    assert_eq!(done.outcome, SaveOutcome::Discarded);
    assert!(session.document(Pane::Left).file_path().is_none());
}

#[test]
fn test_export_leaves_save_state_alone() {
    let mut io = ScriptedIo::new().export_to("/out/Untitled.md");
    let mut session = session();
    session.edit(Pane::Left, paragraph_update("exported"));

    let path = session
        .export(Pane::Left, ExportFormat::Markdown, &mut io)
        .unwrap();

    assert_eq!(path, Some(PathBuf::from("/out/Untitled.md")));
    assert_eq!(io.export_requests[0].content, "exported");
    assert_eq!(io.export_requests[0].default_name, "Untitled.md");
    assert_eq!(session.save_state(Pane::Left), SaveState::Unsaved);
}

#[test]
fn test_export_cancel() {
    let mut session = session();
    let path = session
        .export(Pane::Left, ExportFormat::PlainText, &mut ScriptedIo::new())
        .unwrap();
    assert_eq!(path, None);
}

#[test]
fn test_autosave_only_picks_unsaved_open_slots() {
    let t0 = Instant::now();
    let mut session = session_at(t0);
    session.set_split_mode(SplitMode::DualDoc);
    session.edit(Pane::Right, paragraph_update("hidden soon"));
    session.set_split_mode(SplitMode::Single);

    // nothing unsaved in the left slot, the right slot is closed
    assert!(session.tick(t0 + secs(30)).is_empty());

    session.edit(Pane::Left, paragraph_update("left"));
    assert!(session.tick(t0 + secs(45)).is_empty());
    let jobs = session.tick(t0 + secs(60));
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].slot(), Pane::Left);
    assert_eq!(session.save_state(Pane::Left), SaveState::Saving);
}

#[test]
fn test_autosave_covers_both_slots_in_dual_mode() {
    let t0 = Instant::now();
    let mut session = session_at(t0);
    session.set_split_mode(SplitMode::DualDoc);
    session.edit(Pane::Left, paragraph_update("a"));
    session.edit(Pane::Right, paragraph_update("b"));

    let mut io = ScriptedIo::new()
        .save_to("/x/a.specnote")
        .save_to("/x/b.specnote");
    let outcomes = session.tick_with(t0 + secs(30), &mut io);

    assert_eq!(
        outcomes,
        vec![(Pane::Left, SaveOutcome::Saved), (Pane::Right, SaveOutcome::Saved)]
    );
    assert_eq!(session.document(Pane::Right).name(), "b");
}

#[test]
fn test_disabling_autosave_stops_ticks() {
    let t0 = Instant::now();
    let mut session = session_at(t0);
    session.edit(Pane::Left, paragraph_update("a"));

    session.update_settings(
        SettingsPatch {
            autosave_enabled: Some(false),
            ..Default::default()
        },
        t0 + secs(1),
    );

    assert!(!session.autosave().is_running());
    assert!(session.tick(t0 + secs(600)).is_empty());
}

#[test]
fn test_settings_are_written_when_a_path_is_set() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    let mut session = session().with_settings_path(&path);

    session.update_settings(
        SettingsPatch {
            autosave_interval: Some(2),
            ..Default::default()
        },
        Instant::now(),
    );

    let written = Settings::load_from_path(&path).unwrap().unwrap();
    assert_eq!(written.autosave_interval, 5);
    assert_eq!(session.settings(), &written);
}

#[test]
fn test_scroll_sync_mirrors_in_same_doc_mode() {
    let mut session = session();
    session.set_split_mode(SplitMode::SameDoc);
    session.set_scroll_sync(true);
    session.set_viewport(Pane::Right, ScrollMetrics::new(0.0, 600.0, 100.0));

    let target = session
        .scroll(Pane::Left, ScrollMetrics::new(400.0, 1000.0, 200.0))
        .unwrap();
    assert!((target - 250.0).abs() < 1e-9);

    // the mirrored write comes back as a scroll event and stops there
    assert_eq!(
        session.scroll(Pane::Right, ScrollMetrics::new(250.0, 600.0, 100.0)),
        None
    );

    let back = session
        .scroll(Pane::Right, ScrollMetrics::new(100.0, 600.0, 100.0))
        .unwrap();
    assert!((back - 160.0).abs() < 1e-9);
}

#[rstest]
#[case(SplitMode::DualDoc, true)]
#[case(SplitMode::SameDoc, false)]
fn test_scroll_sync_inactive(#[case] mode: SplitMode, #[case] sync: bool) {
    let mut session = session();
    session.set_split_mode(mode);
    session.set_scroll_sync(sync);
    session.set_viewport(Pane::Right, ScrollMetrics::new(0.0, 600.0, 100.0));

    assert_eq!(
        session.scroll(Pane::Left, ScrollMetrics::new(400.0, 1000.0, 200.0)),
        None
    );
    assert_eq!(
        session.scroll_metrics(Pane::Left),
        Some(ScrollMetrics::new(400.0, 1000.0, 200.0))
    );
}

#[test]
fn test_execute_targets_active_pane() {
    let mut session = session();
    let mut io = ScriptedIo::new();

    session.execute(Command::ToggleSplit, &mut io).unwrap();
    session.execute(Command::ToggleSplit, &mut io).unwrap();
    session.execute(Command::FocusRight, &mut io).unwrap();
    session.execute(Command::New, &mut io).unwrap();

    assert_eq!(session.split_mode(), SplitMode::DualDoc);
    assert_eq!(session.save_state(Pane::Right), SaveState::Unsaved);
    assert_eq!(session.save_state(Pane::Left), SaveState::Saved);

    session.execute(Command::ToggleScrollSync, &mut io).unwrap();
    assert!(session.scroll_sync_enabled());
}

#[test]
fn test_execute_save_failure_is_an_error() {
    let mut session = session();
    session.edit(Pane::Left, paragraph_update("a"));
    let mut io = ScriptedIo::new().fail_save("no space");

    let err = session.execute(Command::Save, &mut io).unwrap_err();
    assert_eq!(err.to_string(), "Save failed: no space");
}
