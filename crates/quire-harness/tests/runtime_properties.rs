//! Property-based tests for the full runtime.
//!
//! Arbitrary key and resize scripts are replayed through the real runtime,
//! so background results interleave with input in whatever order the
//! executor produces. Invariants are checked on every rendered frame.

use std::time::Duration;

use proptest::prelude::*;
use quire_app::{AppState, KeyInput, Runtime};
use quire_harness::{BootstrapOutcome, InvariantRegistry, SimBackend, SimDriver, SimError, Step};

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        4 => prop::sample::select(vec!['j', 'k', 'g', 'G', 'm', 'n', 'x', 'y', 'f', 'b', 'a'])
            .prop_map(KeyInput::Char),
        2 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Esc),
        1 => Just(KeyInput::Char('q')),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Ctrl('l')),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        8 => key_strategy().prop_map(Step::Key),
        1 => Just(Step::Resize),
        1 => (1u64..20).prop_map(|ms| Step::Sleep(Duration::from_millis(ms))),
    ]
}

fn bootstrap_strategy() -> impl Strategy<Value = Vec<BootstrapOutcome>> {
    prop_oneof![
        4 => Just(vec![]),
        1 => Just(vec![BootstrapOutcome::MissingAuth]),
        1 => Just(vec![BootstrapOutcome::MissingAuth, BootstrapOutcome::MissingAuth]),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Invariants hold on every frame, whatever the interleaving.
    #[test]
    fn prop_runtime_preserves_invariants(
        bootstrap in bootstrap_strategy(),
        documents in 0u64..8,
        steps in prop::collection::vec(step_strategy(), 0..40),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let backend = SimBackend::new().with_bootstrap(bootstrap).with_documents(documents);
        let script = std::iter::once(Step::WaitForView("Stash".into())).chain(steps);
        let driver = SimDriver::new(script).with_invariants(InvariantRegistry::standard());
        let recording = driver.recording();

        let result = rt.block_on(async {
            let runtime = Runtime::new(driver, backend.clone())
                .with_tick_interval(Duration::from_millis(5));
            tokio::time::timeout(Duration::from_secs(5), runtime.run()).await
        });

        let result = result.expect("runtime hung");
        prop_assert!(recording.violations().is_empty(), "{:?}", recording.violations());
        prop_assert!(backend.keygen_calls() <= 1);
        match result {
            Ok(app) => {
                let browsing = matches!(app.state(), AppState::ShowingList | AppState::ShowingDocument);
                prop_assert!(app.error().is_some() || browsing);
            },
            Err(e) => prop_assert_eq!(e, SimError::ScriptExhausted),
        }
    }
}
