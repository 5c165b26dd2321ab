//! Application controller.
//!
//! This module defines the [`Controller`], which owns top-level state and
//! decides which sub-component receives each [`Message`].
//!
//! This is a pure state machine: it consumes messages and produces
//! [`Command`]s for the runtime to execute. Each call takes the previous
//! controller by value and returns the next one, so the runtime loop is an
//! explicit state-passing fold.
//!
//! # Dispatch
//!
//! 1. Keys are classified by [`decide_key`]: interrupts, repaints, the
//!    quit/back key and everything else.
//! 2. Top-level messages (errors, geometry, bootstrap, key generation, open
//!    intents, cross-component notifications) update controller state.
//! 3. The original message is forwarded to the live sub-component for the
//!    resulting [`AppState`], if there is one.
//! 4. All commands are returned together; none of them block dispatch.

use crate::{
    AppError, AppState, Command, Component, Context, Geometry, KeyInput, KeygenModel, Message,
    PagerModel, Session, Spinner, StashModel, User,
};

/// Sub-component that may consume a key before the controller sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Stash list.
    List,
    /// Pager.
    Reader,
}

/// What to do with a key, decided before any state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDecision {
    /// Terminate the program.
    Quit,
    /// Re-probe terminal geometry.
    Repaint,
    /// Leave the reader and restore the list.
    CloseDocument,
    /// Hand the key to a modal sub-component; it consumes it.
    Offer(Target),
    /// Not a controller key; forward normally.
    Forward,
}

/// Quit/back precedence keyed by (state, list modality, reader modality,
/// key).
pub fn decide_key(
    state: AppState,
    list_modal: bool,
    reader_modal: bool,
    key: KeyInput,
) -> KeyDecision {
    if key.is_interrupt() {
        return KeyDecision::Quit;
    }
    if key.is_repaint() {
        return KeyDecision::Repaint;
    }
    if !key.is_quit() {
        return KeyDecision::Forward;
    }
    match (state, list_modal, reader_modal) {
        (AppState::ShowingList, true, _) => KeyDecision::Offer(Target::List),
        (AppState::ShowingDocument, _, true) => KeyDecision::Offer(Target::Reader),
        (AppState::ShowingDocument, _, false) => KeyDecision::CloseDocument,
        _ => KeyDecision::Quit,
    }
}

/// Application controller.
///
/// Holds the bootstrapped session, terminal geometry, the last fatal error
/// and one instance of each sub-component. Only the sub-component matching
/// [`AppState`] is live, but all of them keep their state between
/// activations and all of them receive geometry updates.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    state: AppState,
    session: Option<Session>,
    /// Fatal error. Once set, only quit keys are honored.
    error: Option<AppError>,
    /// Credential generation already ran once in this process. A second
    /// `MissingAuth` after that, or while generating, is fatal.
    credentials_generated: bool,
    geometry: Geometry,
    spinner: Spinner,
    keygen: KeygenModel,
    stash: StashModel,
    pager: PagerModel,
}

impl Controller {
    /// Create the controller and its startup commands.
    pub fn init() -> (Self, Vec<Command>) {
        let commands =
            vec![Command::BootstrapClient, Command::ProbeGeometry, Command::ListenForResize];
        (Self::default(), commands)
    }

    /// Process one message.
    pub fn update(mut self, msg: Message) -> (Self, Vec<Command>) {
        if self.error.is_some() {
            let quit = matches!(msg, Message::Key(k) if k.is_quit() || k.is_interrupt());
            return (self, if quit { vec![Command::Quit] } else { vec![] });
        }

        let mut commands = Vec::new();

        if let Message::Key(key) = msg {
            let decision =
                decide_key(self.state, self.stash.is_modal(), self.pager.is_modal(), key);
            match decision {
                KeyDecision::Quit => return (self, vec![Command::Quit]),
                KeyDecision::Repaint => return (self, vec![Command::ProbeGeometry]),
                KeyDecision::CloseDocument => {
                    self.unload_document();
                    return (self, vec![]);
                },
                KeyDecision::Offer(Target::List) => {
                    commands.extend(self.forward_to_stash(&msg));
                    if self.pager.is_loading() && !self.stash.is_modal() {
                        tracing::debug!("open cancelled; unloading pager");
                        self.pager.unload();
                    }
                    return (self, commands);
                },
                KeyDecision::Offer(Target::Reader) => {
                    commands.extend(self.forward_to_pager(&msg));
                    return (self, commands);
                },
                KeyDecision::Forward => {},
            }
        }

        match &msg {
            Message::Error(error) => {
                self.fail(error.clone());
                return (self, vec![]);
            },
            Message::TerminalResized => {
                commands.push(Command::ProbeGeometry);
                commands.push(Command::ListenForResize);
            },
            Message::TerminalSize(geometry) => self.set_size(*geometry),
            Message::ClientReady(session) => commands.extend(self.client_ready(session.clone())),
            Message::MissingAuth => {
                if self.credentials_generated || self.state == AppState::GeneratingCredentials {
                    self.fail(AppError::AuthenticationFailed);
                    return (self, vec![Command::Quit]);
                }
                tracing::debug!("no credentials; generating keys");
                self.state = AppState::GeneratingCredentials;
                let (keygen, init) = KeygenModel::init(&self.context());
                self.keygen = keygen;
                commands.extend(init);
            },
            Message::KeygenDone => {
                tracing::debug!("keys generated; retrying bootstrap");
                if self.state == AppState::GeneratingCredentials {
                    commands.extend(self.forward_to_keygen(&msg));
                }
                self.state = AppState::CredentialsReady;
                self.credentials_generated = true;
                commands.push(Command::BootstrapClient);
            },
            Message::Tick => {
                if matches!(self.state, AppState::InitializingClient | AppState::CredentialsReady)
                {
                    self.spinner.tick();
                }
            },
            Message::OpenDocument(document) => {
                tracing::debug!(id = document.id, "opening document");
                commands.extend(self.pager.load(document.clone()));
            },
            Message::ContentFetched { .. } => {
                if self.state != AppState::ShowingDocument {
                    commands.extend(self.forward_to_pager(&msg));
                }
            },
            Message::ContentRendered { id, .. } => {
                if self.state == AppState::ShowingList && self.pager.is_awaiting(*id) {
                    tracing::debug!(id, "document rendered; showing pager");
                    self.state = AppState::ShowingDocument;
                }
            },
            Message::NoteSaved { .. } => {
                if self.state != AppState::ShowingList {
                    commands.extend(self.forward_to_stash(&msg));
                }
            },
            Message::Key(_) | Message::DocumentsLoaded { .. } | Message::DocumentDeleted { .. } => {
            },
        }

        commands.extend(self.forward_to_live(&msg));
        (self, commands)
    }

    /// Render the current state as text.
    ///
    /// Exactly one sub-component contributes to a frame.
    pub fn view(&self) -> String {
        if let Some(error) = &self.error {
            return format!("\nError: {error}\n\nPress q to exit.");
        }
        match self.state {
            AppState::InitializingClient => {
                format!("\n  {} Initializing...", self.spinner.glyph())
            },
            AppState::GeneratingCredentials => indent(&self.keygen.view(), 2),
            AppState::CredentialsReady => {
                format!("\n  {} Re-initializing...", self.spinner.glyph())
            },
            AppState::ShowingList => self.stash.view(),
            AppState::ShowingDocument => self.pager.view(),
        }
    }

    fn context(&self) -> Context {
        Context { session: self.session.clone(), geometry: self.geometry }
    }

    fn fail(&mut self, error: AppError) {
        tracing::warn!(state = %self.state, %error, "fatal error");
        self.error = Some(error);
    }

    fn client_ready(&mut self, session: Session) -> Vec<Command> {
        tracing::debug!(endpoint = %session.endpoint, "client ready");
        self.session = Some(session);
        self.state = AppState::ShowingList;

        let ctx = self.context();
        let (stash, commands) = StashModel::init(&ctx);
        let (pager, pager_commands) = PagerModel::init(&ctx);
        self.stash = stash;
        self.pager = pager;
        commands.into_iter().chain(pager_commands).collect()
    }

    /// Leave the pager and go back to the list at its previous position.
    fn unload_document(&mut self) {
        tracing::debug!("closing document");
        self.state = AppState::ShowingList;
        self.stash.reset_state();
        self.pager.unload();
    }

    fn set_size(&mut self, geometry: Geometry) {
        self.geometry = geometry;
        self.keygen.set_size(geometry);
        self.stash.set_size(geometry);
        self.pager.set_size(geometry);
    }

    fn forward_to_stash(&mut self, msg: &Message) -> Vec<Command> {
        let (stash, commands) = std::mem::take(&mut self.stash).update(msg);
        self.stash = stash;
        commands
    }

    fn forward_to_pager(&mut self, msg: &Message) -> Vec<Command> {
        let (pager, commands) = std::mem::take(&mut self.pager).update(msg);
        self.pager = pager;
        commands
    }

    fn forward_to_keygen(&mut self, msg: &Message) -> Vec<Command> {
        let (keygen, commands) = std::mem::take(&mut self.keygen).update(msg);
        self.keygen = keygen;
        commands
    }

    fn forward_to_live(&mut self, msg: &Message) -> Vec<Command> {
        match self.state {
            AppState::GeneratingCredentials => self.forward_to_keygen(msg),
            AppState::ShowingList => self.forward_to_stash(msg),
            AppState::ShowingDocument => self.forward_to_pager(msg),
            AppState::InitializingClient | AppState::CredentialsReady => vec![],
        }
    }

    /// Current top-level state.
    pub fn state(&self) -> AppState {
        self.state
    }

    /// Bootstrapped session. `None` until bootstrap succeeds.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Authenticated user. `None` before bootstrap or for anonymous access.
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().and_then(|s| s.user.as_ref())
    }

    /// Stored fatal error.
    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    /// Whether key generation already ran in this process.
    pub fn credentials_generated(&self) -> bool {
        self.credentials_generated
    }

    /// Terminal geometry.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Key generation component.
    pub fn keygen(&self) -> &KeygenModel {
        &self.keygen
    }

    /// Stash component.
    pub fn stash(&self) -> &StashModel {
        &self.stash
    }

    /// Pager component.
    pub fn pager(&self) -> &PagerModel {
        &self.pager
    }
}

fn indent(text: &str, by: usize) -> String {
    let pad = " ".repeat(by);
    let body: Vec<String> = text
        .lines()
        .map(|line| if line.is_empty() { String::new() } else { format!("{pad}{line}") })
        .collect();
    format!("\n{}", body.join("\n"))
}
