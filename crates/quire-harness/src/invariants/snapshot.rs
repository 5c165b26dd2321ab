//! Observable controller snapshots for invariant checking.
//!
//! A snapshot copies out everything an invariant may look at, so checks run
//! against one consistent point in time.

use quire_app::{AppState, Component, Controller, Geometry};

/// Observable state of the controller after a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    /// Top-level state.
    pub state: AppState,
    /// Rendered fatal error, if any.
    pub error: Option<String>,
    /// Whether a session has been established.
    pub has_session: bool,
    /// Credential generation already ran.
    pub credentials_generated: bool,
    /// Full controller view.
    pub view: String,
    /// Controller geometry.
    pub geometry: Geometry,
    /// Geometry of each sub-component: keygen, stash, pager.
    pub component_geometry: [Geometry; 3],
    /// View of the stash component.
    pub stash_view: String,
    /// View of the pager component.
    pub pager_view: String,
    /// The pager holds a document.
    pub pager_has_document: bool,
    /// The pager is waiting for content.
    pub pager_loading: bool,
}

impl ControllerSnapshot {
    /// Capture the observable state of `app`.
    pub fn from_controller(app: &Controller) -> Self {
        Self {
            state: app.state(),
            error: app.error().map(ToString::to_string),
            has_session: app.session().is_some(),
            credentials_generated: app.credentials_generated(),
            view: app.view(),
            geometry: app.geometry(),
            component_geometry: [
                app.keygen().geometry(),
                app.stash().geometry(),
                app.pager().geometry(),
            ],
            stash_view: app.stash().view(),
            pager_view: app.pager().view(),
            pager_has_document: app.pager().document().is_some(),
            pager_loading: app.pager().is_loading(),
        }
    }
}
