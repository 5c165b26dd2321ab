//! Generic runtime for application orchestration.
//!
//! The Runtime drives the event loop, coordinating between:
//! - [`Controller`]: the pure state machine
//! - [`Driver`]: loop-thread terminal I/O
//! - [`Backend`]: collaborators whose work runs as background tasks
//!
//! Exactly one message is dispatched at a time. Long-running commands are
//! spawned as tokio tasks that never touch controller state; each sends a
//! single result back over a channel, which the loop dispatches like any
//! other message.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::sync::mpsc;

use crate::{
    AppError, Backend, BootstrapError, Command, Controller, DocumentClient, Driver, Message,
    Session, TerminalInput,
};

/// Default interval between `Tick` messages.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Result delivered by a background task.
enum Envelope<C> {
    /// Ordinary message for the controller.
    Message(Message),
    /// Bootstrap succeeded; the runtime keeps the client itself.
    Client(C),
}

impl<C> From<Message> for Envelope<C> {
    fn from(msg: Message) -> Self {
        Self::Message(msg)
    }
}

impl<C> From<AppError> for Envelope<C> {
    fn from(error: AppError) -> Self {
        Self::Message(Message::Error(error))
    }
}

/// What woke the loop.
enum Wake<C> {
    Envelope(Envelope<C>),
    Input(Option<TerminalInput>),
    Tick,
}

/// Generic runtime that orchestrates Controller, Driver and Backend.
///
/// # Type Parameters
///
/// - `D`: Platform-specific terminal driver
/// - `B`: Background collaborators
pub struct Runtime<D, B>
where
    D: Driver,
    B: Backend,
{
    driver: D,
    backend: Arc<B>,
    /// Bootstrapped client, shared read-only with tasks.
    client: Option<Arc<B::Client>>,
    app: Controller,
    tx: mpsc::UnboundedSender<Envelope<B::Client>>,
    rx: mpsc::UnboundedReceiver<Envelope<B::Client>>,
    /// One-shot resize listener is armed.
    resize_armed: bool,
    /// A resize arrived while the listener was disarmed.
    resize_pending: bool,
    tick_interval: Duration,
}

impl<D, B> Runtime<D, B>
where
    D: Driver,
    B: Backend,
{
    /// Create a new runtime with the given driver and backend.
    pub fn new(driver: D, backend: B) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            driver,
            backend: Arc::new(backend),
            client: None,
            app: Controller::default(),
            tx,
            rx,
            resize_armed: false,
            resize_pending: false,
            tick_interval: TICK_INTERVAL,
        }
    }

    /// Override the tick interval.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Run the event loop until a `Quit` command.
    ///
    /// Returns the final controller so the caller can report a stored error.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<Controller, D::Error> {
        let (app, commands) = Controller::init();
        self.app = app;
        self.driver.render(&self.app)?;

        let mut quit = self.execute(commands);
        let mut ticker = tokio::time::interval(self.tick_interval);

        while !quit {
            let wake = tokio::select! {
                biased;

                Some(envelope) = self.rx.recv() => Wake::Envelope(envelope),

                input = self.driver.poll_input() => Wake::Input(input?),

                _ = ticker.tick() => Wake::Tick,
            };

            quit = match wake {
                Wake::Envelope(Envelope::Message(msg)) => self.dispatch(msg)?,
                Wake::Envelope(Envelope::Client(client)) => {
                    let session = Session { endpoint: client.endpoint(), user: client.user() };
                    self.client = Some(Arc::new(client));
                    self.dispatch(Message::ClientReady(session))?
                },
                Wake::Input(Some(TerminalInput::Key(key))) => self.dispatch(Message::Key(key))?,
                Wake::Input(Some(TerminalInput::Resized)) => self.handle_resize()?,
                Wake::Input(None) => false,
                Wake::Tick => self.dispatch(Message::Tick)?,
            };
        }

        self.driver.stop();
        Ok(self.app)
    }

    /// Feed one message to the controller, execute its commands and redraw.
    ///
    /// Returns `true` if the application should quit.
    fn dispatch(&mut self, msg: Message) -> Result<bool, D::Error> {
        let (app, commands) = std::mem::take(&mut self.app).update(msg);
        self.app = app;
        let quit = self.execute(commands);
        self.driver.render(&self.app)?;
        Ok(quit)
    }

    /// Deliver a resize notice if the listener is armed, otherwise latch it.
    fn handle_resize(&mut self) -> Result<bool, D::Error> {
        if self.resize_armed {
            self.resize_armed = false;
            self.dispatch(Message::TerminalResized)
        } else {
            self.resize_pending = true;
            Ok(false)
        }
    }

    /// Execute commands. Returns `true` on `Quit`.
    fn execute(&mut self, commands: Vec<Command>) -> bool {
        for command in commands {
            match command {
                Command::Quit => return true,
                Command::ListenForResize => {
                    if self.resize_pending {
                        self.resize_pending = false;
                        self.send(Message::TerminalResized.into());
                    } else {
                        self.resize_armed = true;
                    }
                },
                Command::Emit(msg) => self.send(msg.into()),
                Command::ProbeGeometry => {
                    let backend = Arc::clone(&self.backend);
                    self.spawn(async move {
                        match backend.probe_geometry().await {
                            Ok(geometry) => Message::TerminalSize(geometry).into(),
                            Err(reason) => AppError::Geometry(reason).into(),
                        }
                    });
                },
                Command::BootstrapClient => {
                    let backend = Arc::clone(&self.backend);
                    self.spawn(async move {
                        match backend.bootstrap().await {
                            Ok(client) => Envelope::Client(client),
                            Err(BootstrapError::MissingAuth) => Message::MissingAuth.into(),
                            Err(BootstrapError::Failed(reason)) => {
                                AppError::Bootstrap(reason).into()
                            },
                        }
                    });
                },
                Command::GenerateKeys => {
                    let backend = Arc::clone(&self.backend);
                    self.spawn(async move {
                        match backend.generate_keys().await {
                            Ok(()) => Message::KeygenDone.into(),
                            Err(reason) => AppError::Keygen(reason).into(),
                        }
                    });
                },
                Command::RenderContent { id, body, width } => {
                    let backend = Arc::clone(&self.backend);
                    self.spawn(async move {
                        let text = backend.render_content(&body, width).await;
                        Message::ContentRendered { id, text }.into()
                    });
                },
                Command::LoadDocuments { after } => {
                    self.spawn_with_client(move |client| async move {
                        match client.list(after).await {
                            Ok(documents) => Message::DocumentsLoaded { after, documents }.into(),
                            Err(e) => AppError::Remote(e.to_string()).into(),
                        }
                    });
                },
                Command::FetchContent { id } => {
                    self.spawn_with_client(move |client| async move {
                        match client.fetch(id).await {
                            Ok(body) => Message::ContentFetched { id, body }.into(),
                            Err(e) => AppError::Remote(e.to_string()).into(),
                        }
                    });
                },
                Command::SaveNote { id, note } => {
                    self.spawn_with_client(move |client| async move {
                        match client.save_note(id, &note).await {
                            Ok(()) => Message::NoteSaved { id, note }.into(),
                            Err(e) => AppError::Remote(e.to_string()).into(),
                        }
                    });
                },
                Command::DeleteDocument { id } => {
                    self.spawn_with_client(move |client| async move {
                        match client.delete(id).await {
                            Ok(()) => Message::DocumentDeleted { id }.into(),
                            Err(e) => AppError::Remote(e.to_string()).into(),
                        }
                    });
                },
            }
        }
        false
    }

    /// Queue a result for the loop.
    fn send(&self, envelope: Envelope<B::Client>) {
        if self.tx.send(envelope).is_err() {
            tracing::warn!("event loop channel closed; dropping message");
        }
    }

    /// Run `task` in the background and deliver its result to the loop.
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Envelope<B::Client>> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if tx.send(task.await).is_err() {
                tracing::debug!("event loop gone; dropping task result");
            }
        });
    }

    /// Like [`Self::spawn`], for commands that need the bootstrapped client.
    fn spawn_with_client<F, Fut>(&self, task: F)
    where
        F: FnOnce(Arc<B::Client>) -> Fut,
        Fut: Future<Output = Envelope<B::Client>> + Send + 'static,
    {
        match &self.client {
            Some(client) => self.spawn(task(Arc::clone(client))),
            None => {
                tracing::warn!("stash command issued before bootstrap");
                self.send(AppError::InvalidState("client not initialized".into()).into());
            },
        }
    }

    /// Current controller state.
    pub fn app(&self) -> &Controller {
        &self.app
    }
}
