//! Terminal UI for quire
//!
//! A thin shell over [`quire_app::Driver`] and [`quire_app::Backend`] that
//! provides terminal I/O and a filesystem-backed stash. All orchestration
//! logic lives in the generic [`quire_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod backend;
pub mod client;
pub mod config;
pub mod markdown;
pub mod terminal;
pub mod theme;
pub mod ui;

pub use backend::LocalBackend;
pub use client::{ClientError, LocalClient};
pub use config::Config;
pub use quire_app::{Controller, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
pub use theme::{Style, Theme};
