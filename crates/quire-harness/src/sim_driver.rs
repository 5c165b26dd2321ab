//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but replays
//! a script of [`Step`]s instead of reading a terminal. It implements
//! [`Driver`] so the same [`quire_app::Runtime`] orchestration code runs in
//! both production and simulation. Every rendered frame is recorded and,
//! when a registry is attached, checked against invariants.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use quire_app::{AppState, Controller, Driver, KeyInput, TerminalInput};
use tokio::time::Instant;

use crate::{ControllerSnapshot, InvariantRegistry, SimError, Violation};

/// How long an unsatisfied wait step yields before checking again.
const WAIT_POLL: Duration = Duration::from_millis(1);

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Press a key.
    Key(KeyInput),
    /// Report a terminal resize.
    Resize,
    /// Hold input until the controller reaches this state.
    WaitForState(AppState),
    /// Hold input until the rendered view contains this text.
    WaitForView(String),
    /// Hold input for a while.
    Sleep(Duration),
}

impl Step {
    /// Press each character of `text` in turn.
    pub fn type_text(text: &str) -> impl Iterator<Item = Step> + '_ {
        text.chars().map(|c| Step::Key(KeyInput::Char(c)))
    }
}

/// Shared state between the driver and its [`Recording`].
#[derive(Debug, Default)]
struct Shared {
    script: VecDeque<Step>,
    frames: Vec<String>,
    states: Vec<AppState>,
    last: Option<ControllerSnapshot>,
    violations: Vec<(usize, Violation)>,
    /// End of the sleep step at the front of the script, once started.
    wake_at: Option<Instant>,
    stopped: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulation driver for deterministic testing.
pub struct SimDriver {
    shared: Arc<Mutex<Shared>>,
    invariants: Option<InvariantRegistry>,
}

impl SimDriver {
    /// Create a driver that replays `script`.
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        let shared = Shared { script: script.into_iter().collect(), ..Shared::default() };
        Self { shared: Arc::new(Mutex::new(shared)), invariants: None }
    }

    /// Enable invariant checking on every rendered frame.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Handle for inspecting what the driver saw, usable after the runtime
    /// has consumed the driver.
    pub fn recording(&self) -> Recording {
        Recording { shared: Arc::clone(&self.shared) }
    }
}

impl Driver for SimDriver {
    type Error = SimError;

    async fn poll_input(&mut self) -> Result<Option<TerminalInput>, Self::Error> {
        // Steps are only consumed once satisfied, so a poll cancelled by the
        // runtime's select never loses input.
        let (step, wait_until) = {
            let mut shared = lock(&self.shared);
            let Some(step) = shared.script.front().cloned() else {
                return Err(SimError::ScriptExhausted);
            };
            let now = Instant::now();
            let wait_until = match &step {
                Step::WaitForState(state) => {
                    let reached = shared.last.as_ref().is_some_and(|s| s.state == *state);
                    (!reached).then_some(now + WAIT_POLL)
                },
                Step::WaitForView(text) => {
                    let shown = shared.last.as_ref().is_some_and(|s| s.view.contains(text));
                    (!shown).then_some(now + WAIT_POLL)
                },
                Step::Sleep(duration) => {
                    let wake_at = *shared.wake_at.get_or_insert(now + *duration);
                    (now < wake_at).then_some(wake_at)
                },
                Step::Key(_) | Step::Resize => None,
            };
            if wait_until.is_none() {
                shared.script.pop_front();
                shared.wake_at = None;
            }
            (step, wait_until)
        };

        if let Some(deadline) = wait_until {
            tokio::time::sleep_until(deadline).await;
            return Ok(None);
        }
        match step {
            Step::Key(key) => Ok(Some(TerminalInput::Key(key))),
            Step::Resize => Ok(Some(TerminalInput::Resized)),
            Step::WaitForState(_) | Step::WaitForView(_) | Step::Sleep(_) => Ok(None),
        }
    }

    fn render(&mut self, app: &Controller) -> Result<(), Self::Error> {
        let snapshot = ControllerSnapshot::from_controller(app);
        let mut shared = lock(&self.shared);

        if let Some(Err(violations)) = self.invariants.as_ref().map(|r| r.check_all(&snapshot)) {
            let frame = shared.frames.len();
            for violation in violations {
                tracing::warn!(frame, %violation, "invariant violated");
                shared.violations.push((frame, violation));
            }
        }
        if shared.states.last() != Some(&snapshot.state) {
            shared.states.push(snapshot.state);
        }
        shared.frames.push(snapshot.view.clone());
        shared.last = Some(snapshot);
        Ok(())
    }

    fn stop(&mut self) {
        lock(&self.shared).stopped = true;
    }
}

/// What a [`SimDriver`] observed.
#[derive(Clone)]
pub struct Recording {
    shared: Arc<Mutex<Shared>>,
}

impl Recording {
    /// Every rendered view, in order.
    pub fn frames(&self) -> Vec<String> {
        lock(&self.shared).frames.clone()
    }

    /// The most recent rendered view.
    pub fn last_frame(&self) -> Option<String> {
        lock(&self.shared).frames.last().cloned()
    }

    /// Top-level states in the order they were first rendered, without
    /// consecutive repeats.
    pub fn states(&self) -> Vec<AppState> {
        lock(&self.shared).states.clone()
    }

    /// Invariant violations with the index of the frame they occurred on.
    pub fn violations(&self) -> Vec<(usize, Violation)> {
        lock(&self.shared).violations.clone()
    }

    /// Steps not yet consumed.
    pub fn remaining_steps(&self) -> usize {
        lock(&self.shared).script.len()
    }

    /// The runtime stopped the driver.
    pub fn stopped(&self) -> bool {
        lock(&self.shared).stopped
    }
}
