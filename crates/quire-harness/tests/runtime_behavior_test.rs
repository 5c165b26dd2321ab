//! End-to-end tests for the runtime loop.
//!
//! # Test Strategy
//!
//! Each test scripts what a user does at the terminal and runs the real
//! [`Runtime`] against a [`SimBackend`]:
//! 1. Wait for the controller to reach a state or show some text
//! 2. Press keys
//! 3. Let background tasks deliver their results
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks on the returned controller, the backend's
//! call counters and the sequence of rendered states. Every frame is also
//! checked against the standard invariant registry.

use std::time::Duration;

use quire_app::{AppError, AppState, Controller, Geometry, KeyInput, PAGE_SIZE, Runtime};
use quire_harness::{
    BootstrapOutcome, InvariantRegistry, Recording, SimBackend, SimDriver, SimError, Step,
};

const DEADLINE: Duration = Duration::from_secs(5);
const TICK: Duration = Duration::from_millis(10);

/// Run the script to completion and check invariants on every frame.
async fn run(
    backend: &SimBackend,
    script: impl IntoIterator<Item = Step>,
) -> (Result<Controller, SimError>, Recording) {
    let driver = SimDriver::new(script).with_invariants(InvariantRegistry::standard());
    let recording = driver.recording();
    let runtime = Runtime::new(driver, backend.clone()).with_tick_interval(TICK);

    let result = tokio::time::timeout(DEADLINE, runtime.run()).await.expect("runtime hung");
    assert!(recording.violations().is_empty(), "violations: {:?}", recording.violations());
    (result, recording)
}

fn key(c: char) -> Step {
    Step::Key(KeyInput::Char(c))
}

fn wait(state: AppState) -> Step {
    Step::WaitForState(state)
}

#[tokio::test]
async fn open_third_item_and_back_keeps_selection() {
    let backend = SimBackend::new().with_documents(5);
    let script = [
        Step::WaitForView("doc-5".into()),
        key('j'),
        key('j'),
        Step::Key(KeyInput::Enter),
        wait(AppState::ShowingDocument),
        Step::WaitForView("# doc-3".into()),
        key('q'),
        wait(AppState::ShowingList),
        key('q'),
    ];

    let (result, recording) = run(&backend, script).await;
    let app = result.unwrap();

    assert!(app.error().is_none());
    assert_eq!(app.state(), AppState::ShowingList);
    assert_eq!(app.stash().cursor(), 2);
    assert_eq!(app.stash().selected().unwrap().title, "doc-3");
    assert!(app.pager().document().is_none());
    assert_eq!(
        recording.states(),
        vec![
            AppState::InitializingClient,
            AppState::ShowingList,
            AppState::ShowingDocument,
            AppState::ShowingList,
        ]
    );
    assert!(recording.stopped());
}

#[tokio::test]
async fn back_from_reader_keeps_scrolled_position() {
    // Four list rows at this height
    let backend =
        SimBackend::new().with_documents(12).with_geometries([Geometry::new(80, 8)]);
    let mut script = vec![Step::WaitForView("doc-4".into())];
    script.extend(std::iter::repeat_n(key('j'), 7));
    script.extend([
        Step::WaitForView("> doc-8".into()),
        Step::Key(KeyInput::Enter),
        wait(AppState::ShowingDocument),
        key('q'),
        wait(AppState::ShowingList),
        key('q'),
    ]);

    let (result, recording) = run(&backend, script).await;
    let app = result.unwrap();

    assert_eq!(app.stash().cursor(), 7);
    assert_eq!(app.stash().offset(), 4);
    assert!(app.pager().document().is_none());
    let last = recording.last_frame().unwrap();
    assert!(last.contains("  doc-5") && last.contains("> doc-8"));
    assert!(!last.contains("doc-4"));
}

#[tokio::test]
async fn missing_auth_generates_keys_once_then_lists() {
    let backend =
        SimBackend::new().with_bootstrap([BootstrapOutcome::MissingAuth]).with_documents(1);

    let (result, recording) = run(&backend, [wait(AppState::ShowingList), key('q')]).await;

    assert!(result.unwrap().credentials_generated());
    assert_eq!(backend.keygen_calls(), 1);
    assert_eq!(backend.bootstrap_calls(), 2);
    assert_eq!(
        recording.states(),
        vec![
            AppState::InitializingClient,
            AppState::GeneratingCredentials,
            AppState::CredentialsReady,
            AppState::ShowingList,
        ]
    );
}

#[tokio::test]
async fn second_missing_auth_is_fatal_without_second_generation() {
    let backend = SimBackend::new()
        .with_bootstrap([BootstrapOutcome::MissingAuth, BootstrapOutcome::MissingAuth]);

    // Never satisfied: the runtime quits on its own.
    let (result, recording) = run(&backend, [wait(AppState::ShowingList)]).await;
    let app = result.unwrap();

    assert_eq!(app.error(), Some(&AppError::AuthenticationFailed));
    assert_eq!(backend.keygen_calls(), 1);
    assert_eq!(backend.bootstrap_calls(), 2);
    assert!(recording.last_frame().unwrap().contains("SSH authentication failed"));
}

#[tokio::test]
async fn bootstrap_failure_waits_for_quit() {
    let backend = SimBackend::new().with_bootstrap([BootstrapOutcome::Fail("no route".into())]);
    let script = [
        Step::WaitForView("Press q to exit.".into()),
        key('j'),
        Step::Key(KeyInput::Enter),
        Step::Sleep(Duration::from_millis(30)),
        key('q'),
    ];

    let (result, recording) = run(&backend, script).await;
    let app = result.unwrap();

    assert_eq!(app.error(), Some(&AppError::Bootstrap("no route".into())));
    assert_eq!(app.state(), AppState::InitializingClient);
    assert_eq!(backend.bootstrap_calls(), 1);
    assert_eq!(recording.remaining_steps(), 0);
}

#[tokio::test]
async fn keygen_failure_is_fatal() {
    let backend = SimBackend::new()
        .with_bootstrap([BootstrapOutcome::MissingAuth])
        .with_keygen_failure("disk full");

    let (result, _) = run(&backend, [Step::WaitForView("disk full".into()), key('q')]).await;

    assert_eq!(result.unwrap().error(), Some(&AppError::Keygen("disk full".into())));
    assert_eq!(backend.bootstrap_calls(), 1);
}

#[tokio::test]
async fn remote_error_is_fatal() {
    let backend = SimBackend::new().with_list_failure("stash offline");

    let (result, _) = run(&backend, [Step::WaitForView("stash offline".into()), key('q')]).await;

    assert_eq!(result.unwrap().error(), Some(&AppError::Remote("stash offline".into())));
}

#[tokio::test]
async fn quit_in_delete_confirmation_only_closes_the_prompt() {
    let backend = SimBackend::new().with_documents(2);
    let script = [
        Step::WaitForView("doc-2".into()),
        key('x'),
        Step::WaitForView("Delete this document?".into()),
        key('q'),
        Step::Sleep(Duration::from_millis(30)),
        key('q'),
    ];

    let (result, recording) = run(&backend, script).await;
    let app = result.unwrap();

    assert_eq!(app.state(), AppState::ShowingList);
    assert_eq!(app.stash().documents().len(), 2);
    assert_eq!(backend.document_count(), 2);
    let frames = recording.frames();
    let prompt = frames.iter().rposition(|f| f.contains("Delete this document?")).unwrap();
    assert!(!frames[prompt + 1].contains("Delete this document?"));
}

#[tokio::test]
async fn confirmed_delete_reaches_the_backend() {
    let backend = SimBackend::new().with_documents(3);
    let script = [
        Step::WaitForView("doc-3".into()),
        key('x'),
        key('y'),
        Step::Sleep(Duration::from_millis(30)),
        key('q'),
    ];

    let (result, _) = run(&backend, script).await;

    let titles: Vec<_> =
        result.unwrap().stash().documents().iter().map(|d| d.title.clone()).collect();
    assert_eq!(titles, ["doc-2", "doc-3"]);
    assert!(backend.document(1).is_none());
}

#[tokio::test]
async fn note_saved_from_reader_updates_the_list() {
    let backend = SimBackend::new().with_documents(2);
    let script = [
        Step::WaitForView("doc-2".into()),
        Step::Key(KeyInput::Enter),
        wait(AppState::ShowingDocument),
        key('n'),
    ]
    .into_iter()
    .chain(Step::type_text("read later"))
    .chain([
        Step::Key(KeyInput::Enter),
        Step::WaitForView("Note saved".into()),
        Step::Key(KeyInput::Esc),
        wait(AppState::ShowingList),
        key('q'),
    ]);

    let (result, _) = run(&backend, script).await;
    let app = result.unwrap();

    assert_eq!(backend.document(1).unwrap().note, "read later");
    assert_eq!(app.stash().documents()[0].note, "read later");
    assert!(app.view().contains("doc-1 · read later"));
}

#[tokio::test]
async fn cancelled_open_discards_the_late_fetch() {
    let backend = SimBackend::new().with_documents(2).with_fetch_delay(Duration::from_millis(50));
    let script = [
        Step::WaitForView("doc-2".into()),
        Step::Key(KeyInput::Enter),
        Step::Key(KeyInput::Esc),
        Step::Sleep(Duration::from_millis(150)),
        key('q'),
    ];

    let (result, recording) = run(&backend, script).await;
    let app = result.unwrap();

    assert_eq!(backend.fetch_calls(), 1);
    assert!(!recording.states().contains(&AppState::ShowingDocument));
    assert!(app.pager().document().is_none());
    assert!(!app.pager().is_loading());
}

#[tokio::test]
async fn ctrl_c_quits_from_the_reader() {
    let backend = SimBackend::new().with_documents(1);
    let script = [
        Step::WaitForView("doc-1".into()),
        Step::Key(KeyInput::Enter),
        wait(AppState::ShowingDocument),
        Step::Key(KeyInput::Ctrl('c')),
    ];

    let (result, _) = run(&backend, script).await;

    assert_eq!(result.unwrap().state(), AppState::ShowingDocument);
}

#[tokio::test]
async fn resizes_reprobe_and_propagate() {
    let backend =
        SimBackend::new().with_geometries([Geometry::new(80, 24), Geometry::new(120, 40)]);
    let script = [
        wait(AppState::ShowingList),
        Step::Resize,
        Step::Resize,
        Step::Sleep(Duration::from_millis(30)),
        key('q'),
    ];

    let (result, _) = run(&backend, script).await;
    let app = result.unwrap();

    assert_eq!(app.geometry(), Geometry::new(120, 40));
    assert_eq!(app.stash().geometry(), Geometry::new(120, 40));
    assert_eq!(app.keygen().geometry(), Geometry::new(120, 40));
    assert_eq!(backend.probe_calls(), 3);
}

#[tokio::test]
async fn repaint_key_reprobes_geometry() {
    let backend = SimBackend::new();
    let script = [
        wait(AppState::ShowingList),
        Step::Key(KeyInput::Ctrl('l')),
        Step::Sleep(Duration::from_millis(30)),
        key('q'),
    ];

    let (result, _) = run(&backend, script).await;

    assert!(result.is_ok());
    assert_eq!(backend.probe_calls(), 2);
}

#[tokio::test]
async fn delete_then_next_page_keeps_every_document() {
    let total = PAGE_SIZE as u64 + 1;
    let backend = SimBackend::new().with_documents(total);
    let script = [
        Step::WaitForView("> doc-1".into()),
        key('x'),
        key('y'),
        Step::Key(KeyInput::End),
        Step::Sleep(Duration::from_millis(50)),
        Step::Key(KeyInput::End),
        Step::WaitForView(format!("> doc-{total}")),
        key('q'),
    ];

    let (result, _) = run(&backend, script).await;
    let app = result.unwrap();

    let ids: Vec<_> = app.stash().documents().iter().map(|d| d.id).collect();
    assert_eq!(ids, (2..=total).collect::<Vec<_>>());
    assert_eq!(backend.document_count(), PAGE_SIZE);
}
