//! In-memory backend for simulation.
//!
//! [`SimBackend`] implements [`Backend`] with a scripted bootstrap sequence
//! and an in-memory stash, so tests can drive every controller transition
//! (missing credentials, failed generation, remote errors) deterministically.
//! Clones share state, which lets a test keep a handle after moving the
//! backend into a [`quire_app::Runtime`].

use std::{
    collections::{BTreeMap, VecDeque},
    ops::Bound,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use quire_app::{
    Backend, BootstrapError, Document, DocumentClient, DocumentId, Geometry, PAGE_SIZE, User,
};
use thiserror::Error;

/// Simulation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// The driver ran out of scripted steps before the program quit.
    #[error("script exhausted before quit")]
    ScriptExhausted,

    /// No document with this id.
    #[error("no such document: {0}")]
    NoSuchDocument(DocumentId),

    /// Injected failure.
    #[error("{0}")]
    Injected(String),
}

/// Result of one bootstrap attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Bootstrap succeeds.
    Ready,
    /// No credentials.
    MissingAuth,
    /// Fatal failure.
    Fail(String),
}

#[derive(Debug)]
struct Stored {
    document: Document,
    body: String,
}

#[derive(Debug, Default)]
struct SimState {
    bootstrap_script: VecDeque<BootstrapOutcome>,
    keygen_failure: Option<String>,
    geometry: Geometry,
    /// Reported by successive probes before falling back to `geometry`.
    geometry_script: VecDeque<Geometry>,
    documents: BTreeMap<DocumentId, Stored>,
    fetch_delay: Duration,
    list_failure: Option<String>,
    bootstrap_calls: usize,
    keygen_calls: usize,
    fetch_calls: usize,
    probe_calls: usize,
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted backend with an in-memory stash.
#[derive(Debug, Clone, Default)]
pub struct SimBackend {
    state: Arc<Mutex<SimState>>,
}

impl SimBackend {
    /// Create a backend whose bootstrap always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bootstrap outcomes. Once the queue is empty bootstrap succeeds.
    #[must_use]
    pub fn with_bootstrap(self, outcomes: impl IntoIterator<Item = BootstrapOutcome>) -> Self {
        lock(&self.state).bootstrap_script.extend(outcomes);
        self
    }

    /// Make key generation fail.
    #[must_use]
    pub fn with_keygen_failure(self, reason: impl Into<String>) -> Self {
        lock(&self.state).keygen_failure = Some(reason.into());
        self
    }

    /// Add documents `1..=count` titled `doc-<n>` with body `# doc-<n>`.
    #[must_use]
    pub fn with_documents(self, count: u64) -> Self {
        for id in 1..=count {
            self.insert(Document::new(id, format!("doc-{id}")), format!("# doc-{id}"));
        }
        self
    }

    /// Delay every content fetch.
    #[must_use]
    pub fn with_fetch_delay(self, delay: Duration) -> Self {
        lock(&self.state).fetch_delay = delay;
        self
    }

    /// Make every page load fail.
    #[must_use]
    pub fn with_list_failure(self, reason: impl Into<String>) -> Self {
        lock(&self.state).list_failure = Some(reason.into());
        self
    }

    /// Store a document.
    pub fn insert(&self, document: Document, body: impl Into<String>) {
        let stored = Stored { body: body.into(), document };
        lock(&self.state).documents.insert(stored.document.id, stored);
    }

    /// Report these sizes from successive probes; the last one sticks.
    #[must_use]
    pub fn with_geometries(self, sizes: impl IntoIterator<Item = Geometry>) -> Self {
        lock(&self.state).geometry_script.extend(sizes);
        self
    }

    /// Change what geometry probes report.
    pub fn set_geometry(&self, geometry: Geometry) {
        lock(&self.state).geometry = geometry;
    }

    /// A stored document.
    pub fn document(&self, id: DocumentId) -> Option<Document> {
        lock(&self.state).documents.get(&id).map(|s| s.document.clone())
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        lock(&self.state).documents.len()
    }

    /// Bootstrap attempts so far.
    pub fn bootstrap_calls(&self) -> usize {
        lock(&self.state).bootstrap_calls
    }

    /// Key generations so far.
    pub fn keygen_calls(&self) -> usize {
        lock(&self.state).keygen_calls
    }

    /// Geometry probes so far.
    pub fn probe_calls(&self) -> usize {
        lock(&self.state).probe_calls
    }

    /// Content fetches so far.
    pub fn fetch_calls(&self) -> usize {
        lock(&self.state).fetch_calls
    }
}

impl Backend for SimBackend {
    type Client = SimClient;

    async fn bootstrap(&self) -> Result<Self::Client, BootstrapError> {
        let outcome = {
            let mut state = lock(&self.state);
            state.bootstrap_calls += 1;
            state.bootstrap_script.pop_front().unwrap_or(BootstrapOutcome::Ready)
        };
        tracing::debug!(?outcome, "sim bootstrap");
        match outcome {
            BootstrapOutcome::Ready => Ok(SimClient { state: Arc::clone(&self.state) }),
            BootstrapOutcome::MissingAuth => Err(BootstrapError::MissingAuth),
            BootstrapOutcome::Fail(reason) => Err(BootstrapError::Failed(reason)),
        }
    }

    async fn generate_keys(&self) -> Result<(), String> {
        let mut state = lock(&self.state);
        state.keygen_calls += 1;
        state.keygen_failure.clone().map_or(Ok(()), Err)
    }

    async fn probe_geometry(&self) -> Result<Geometry, String> {
        let mut state = lock(&self.state);
        state.probe_calls += 1;
        if let Some(next) = state.geometry_script.pop_front() {
            state.geometry = next;
        }
        Ok(state.geometry)
    }

    async fn render_content(&self, body: &str, width: u16) -> String {
        body.lines()
            .map(|line| line.chars().take(usize::from(width)).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Client over the backend's in-memory stash.
#[derive(Debug)]
pub struct SimClient {
    state: Arc<Mutex<SimState>>,
}

impl DocumentClient for SimClient {
    type Error = SimError;

    fn endpoint(&self) -> String {
        "sim".to_string()
    }

    fn user(&self) -> Option<User> {
        Some(User { id: "5151".to_string(), name: "sim".to_string() })
    }

    async fn list(&self, after: Option<DocumentId>) -> Result<Vec<Document>, Self::Error> {
        let state = lock(&self.state);
        if let Some(reason) = &state.list_failure {
            return Err(SimError::Injected(reason.clone()));
        }
        let start = after.map_or(Bound::Unbounded, Bound::Excluded);
        Ok(state
            .documents
            .range((start, Bound::Unbounded))
            .take(PAGE_SIZE)
            .map(|(_, s)| s.document.clone())
            .collect())
    }

    async fn fetch(&self, id: DocumentId) -> Result<String, Self::Error> {
        let (body, delay) = {
            let mut state = lock(&self.state);
            state.fetch_calls += 1;
            let body = state.documents.get(&id).map(|s| s.body.clone());
            (body, state.fetch_delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        body.ok_or(SimError::NoSuchDocument(id))
    }

    async fn save_note(&self, id: DocumentId, note: &str) -> Result<(), Self::Error> {
        let mut state = lock(&self.state);
        let stored = state.documents.get_mut(&id).ok_or(SimError::NoSuchDocument(id))?;
        stored.document.note = note.to_string();
        Ok(())
    }

    async fn delete(&self, id: DocumentId) -> Result<(), Self::Error> {
        lock(&self.state)
            .documents
            .remove(&id)
            .map(|_| ())
            .ok_or(SimError::NoSuchDocument(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bootstrap_follows_script_then_succeeds() {
        let backend = SimBackend::new().with_bootstrap([BootstrapOutcome::MissingAuth]);

        assert!(matches!(backend.bootstrap().await, Err(BootstrapError::MissingAuth)));
        assert!(backend.bootstrap().await.is_ok());
        assert_eq!(backend.bootstrap_calls(), 2);
    }

    #[tokio::test]
    async fn client_pages_documents() {
        let backend = SimBackend::new().with_documents(PAGE_SIZE as u64 + 1);
        let client = backend.bootstrap().await.unwrap();

        let first = client.list(None).await.unwrap();
        assert_eq!(first.len(), PAGE_SIZE);
        let after = first.last().map(|d| d.id);
        assert_eq!(client.list(after).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn paging_survives_deleting_the_cursor_document() {
        let backend = SimBackend::new().with_documents(PAGE_SIZE as u64 + 1);
        let client = backend.bootstrap().await.unwrap();
        let last = PAGE_SIZE as u64;

        client.delete(1).await.unwrap();
        client.delete(last).await.unwrap();

        let next = client.list(Some(last)).await.unwrap();
        assert_eq!(next.iter().map(|d| d.id).collect::<Vec<_>>(), vec![last + 1]);
    }

    #[tokio::test]
    async fn client_mutations_are_visible_to_backend() {
        let backend = SimBackend::new().with_documents(2);
        let client = backend.bootstrap().await.unwrap();

        client.save_note(1, "hi").await.unwrap();
        client.delete(2).await.unwrap();

        assert_eq!(backend.document(1).unwrap().note, "hi");
        assert_eq!(backend.document_count(), 1);
        assert_eq!(client.delete(2).await, Err(SimError::NoSuchDocument(2)));
    }

    #[tokio::test]
    async fn geometry_script_then_sticks() {
        let backend = SimBackend::new()
            .with_geometries([Geometry::new(10, 5), Geometry::new(120, 40)]);

        assert_eq!(backend.probe_geometry().await, Ok(Geometry::new(10, 5)));
        assert_eq!(backend.probe_geometry().await, Ok(Geometry::new(120, 40)));
        assert_eq!(backend.probe_geometry().await, Ok(Geometry::new(120, 40)));
        assert_eq!(backend.probe_calls(), 3);
    }

    #[tokio::test]
    async fn keygen_failure_is_reported() {
        let backend = SimBackend::new().with_keygen_failure("disk full");
        assert_eq!(backend.generate_keys().await, Err("disk full".to_string()));
        assert_eq!(backend.keygen_calls(), 1);
    }
}
