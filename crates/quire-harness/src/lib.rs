//! Deterministic simulation harness for quire.
//!
//! Scripted implementations of the [`quire_app::Driver`] and
//! [`quire_app::Backend`] traits, so the real [`quire_app::Runtime`] can be
//! driven end to end without a terminal or a filesystem.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true after every rendered frame,
//! not specific scenarios. Use [`InvariantRegistry::standard()`] for the
//! controller invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_backend;
pub mod sim_driver;

pub use invariants::{
    ControllerSnapshot, ErrorIsTerminal, GeometryPropagated, Invariant, InvariantRegistry,
    InvariantResult, LiveViewExclusive, ReaderHasDocument, SessionBeforeStash, Violation,
};
pub use sim_backend::{BootstrapOutcome, SimBackend, SimClient, SimError};
pub use sim_driver::{Recording, SimDriver, Step};
