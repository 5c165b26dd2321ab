//! Application layer for quire
//!
//! Pure state machines and a generic runtime for the document reader,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`Controller`]: top-level state machine (routing, bootstrap, geometry)
//! - [`Component`]: init/update/view protocol for pluggable modes
//! - [`KeygenModel`], [`StashModel`], [`PagerModel`]: the three modes
//! - [`Driver`], [`Backend`], [`DocumentClient`]: I/O abstractions
//! - [`Runtime`]: generic orchestration loop

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod app;
mod component;
mod driver;
mod error;
mod event;
mod input;
mod keygen;
mod pager;
mod runtime;
mod stash;
mod state;

pub use action::Command;
pub use app::{Controller, KeyDecision, Target, decide_key};
pub use component::{Component, Context};
pub use driver::{Backend, DocumentClient, Driver, TerminalInput};
pub use error::{AppError, BootstrapError};
pub use event::Message;
pub use input::{InputOutcome, KeyInput, TextInput};
pub use keygen::{KeygenModel, KeygenState};
pub use pager::{PagerModel, PagerState};
pub use runtime::Runtime;
pub use stash::{NOTE_CHARACTER_LIMIT, PAGE_SIZE, StashModel, StashState};
pub use state::{AppState, Document, DocumentId, Geometry, Session, Spinner, User};
