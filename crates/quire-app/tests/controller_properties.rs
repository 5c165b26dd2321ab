//! Property-based tests for the Controller state machine.
//!
//! Arbitrary message sequences are fed through a synchronous loopback that
//! answers commands the way the runtime would, and invariants are checked
//! after every step.

use std::collections::VecDeque;

use proptest::prelude::*;
use quire_app::{
    AppState, Command, Component, Controller, Document, Geometry, KeyDecision, KeyInput, Message,
    Session, decide_key,
};

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        Just(KeyInput::Char('j')),
        Just(KeyInput::Char('k')),
        Just(KeyInput::Char('m')),
        Just(KeyInput::Char('x')),
        Just(KeyInput::Char('y')),
        Just(KeyInput::Char('n')),
        Just(KeyInput::Char('a')),
        Just(KeyInput::Enter),
        Just(KeyInput::Esc),
        Just(KeyInput::Down),
        Just(KeyInput::End),
        Just(KeyInput::Ctrl('l')),
    ]
}

/// Generate random messages.
fn message_strategy() -> impl Strategy<Value = Message> {
    prop_oneof![
        4 => key_strategy().prop_map(Message::Key),
        1 => Just(Message::Tick),
        1 => (1u16..200, 1u16..100).prop_map(|(w, h)| Message::TerminalSize(Geometry::new(w, h))),
        1 => Just(Message::TerminalResized),
        1 => Just(Message::MissingAuth),
        1 => Just(Message::KeygenDone),
        1 => Just(Message::ClientReady(Session { endpoint: "sim".into(), user: None })),
        1 => (1u64..6).prop_map(|id| Message::ContentRendered { id, text: "stale".into() }),
        1 => (1u64..6, "[a-z]{0,8}").prop_map(|(id, note)| Message::NoteSaved { id, note }),
    ]
}

fn documents() -> Vec<Document> {
    (1..=5).map(|i| Document::new(i, format!("doc-{i}"))).collect()
}

/// Answer commands synchronously, as a well-behaved runtime would.
fn loopback(command: Command) -> Option<Message> {
    match command {
        Command::Emit(msg) => Some(msg),
        Command::LoadDocuments { after: None } => {
            Some(Message::DocumentsLoaded { after: None, documents: documents() })
        },
        Command::FetchContent { id } => Some(Message::ContentFetched { id, body: "# t".into() }),
        Command::RenderContent { id, .. } => {
            Some(Message::ContentRendered { id, text: "t\n=".into() })
        },
        Command::SaveNote { id, note } => Some(Message::NoteSaved { id, note }),
        Command::DeleteDocument { id } => Some(Message::DocumentDeleted { id }),
        _ => None,
    }
}

/// Dispatch `msg` and everything it causes. Returns all commands produced.
fn settle(mut app: Controller, msg: Message) -> (Controller, Vec<Command>) {
    let mut queue = VecDeque::from([msg]);
    let mut produced = Vec::new();
    while let Some(msg) = queue.pop_front() {
        let (next, commands) = app.update(msg);
        app = next;
        for command in commands {
            produced.push(command.clone());
            if let Some(reply) = loopback(command) {
                queue.push_back(reply);
            }
        }
    }
    (app, produced)
}

fn assert_invariants(app: &Controller) -> Result<(), TestCaseError> {
    if app.error().is_some() {
        prop_assert!(app.view().contains("Error:"));
        return Ok(());
    }
    let view = app.view();
    match app.state() {
        AppState::ShowingList => prop_assert_eq!(view, app.stash().view()),
        AppState::ShowingDocument => {
            prop_assert_eq!(view, app.pager().view());
            prop_assert!(app.pager().document().is_some());
            prop_assert!(!app.pager().is_loading());
        },
        AppState::GeneratingCredentials => prop_assert!(view.contains("generating")),
        AppState::InitializingClient | AppState::CredentialsReady => {
            prop_assert!(view.contains("nitializing"));
        },
    }

    let geometry = app.geometry();
    prop_assert_eq!(app.keygen().geometry(), geometry);
    prop_assert_eq!(app.stash().geometry(), geometry);
    prop_assert_eq!(app.pager().geometry(), geometry);
    Ok(())
}

proptest! {
    #[test]
    fn prop_controller_invariants_hold(messages in prop::collection::vec(message_strategy(), 0..80)) {
        let (mut app, _) = Controller::init();
        for msg in messages {
            // Keep the program alive: drop keys that would terminate it
            if let Message::Key(key) = &msg {
                let decision =
                    decide_key(app.state(), app.stash().is_modal(), app.pager().is_modal(), *key);
                if decision == KeyDecision::Quit {
                    continue;
                }
            }
            let (next, commands) = settle(app, msg);
            app = next;
            if commands.contains(&Command::Quit) {
                prop_assert!(app.error().is_some());
                break;
            }
            assert_invariants(&app)?;
        }
    }

    #[test]
    fn prop_keygen_runs_at_most_once(messages in prop::collection::vec(
        prop_oneof![Just(Message::MissingAuth), Just(Message::KeygenDone), Just(Message::Tick)],
        1..40,
    )) {
        let (mut app, _) = Controller::init();
        let mut generations = 0;
        for msg in messages {
            let (next, commands) = app.update(msg);
            app = next;
            generations += commands.iter().filter(|c| **c == Command::GenerateKeys).count();
        }
        prop_assert!(generations <= 1);
    }

    #[test]
    fn prop_resize_is_idempotent(width in 1u16..300, height in 1u16..120, cursor in 0usize..5) {
        let (app, _) = Controller::init();
        let (mut app, _) = settle(app, Message::ClientReady(Session { endpoint: "sim".into(), user: None }));
        for _ in 0..cursor {
            (app, _) = settle(app, Message::Key(KeyInput::Down));
        }
        let size = Message::TerminalSize(Geometry::new(width, height));

        let (once, _) = settle(app, size.clone());
        let (twice, _) = settle(once.clone(), size);

        prop_assert_eq!(once.geometry(), twice.geometry());
        prop_assert_eq!(once.stash(), twice.stash());
        prop_assert_eq!(once.pager(), twice.pager());
        prop_assert_eq!(once.keygen(), twice.keygen());
        prop_assert_eq!(once.view(), twice.view());
    }
}

#[test]
fn keygen_component_is_pluggable() {
    let (model, commands) = quire_app::KeygenModel::init(&quire_app::Context::default());
    assert_eq!(commands, vec![Command::GenerateKeys]);
    assert!(model.view().contains("Generating keys"));
}
