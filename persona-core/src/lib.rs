//! Core types for the persona calendar.
//!
//! Shared by persona-server and persona-cli:
//! - `event` and `wire` for the client and server representations
//! - `time` for rendering everything in one civil zone (KST)
//! - `repository` and `sync` for storage and external calendar mirroring

pub mod constants;
pub mod error;
pub mod event;
pub mod filter;
pub mod form;
pub mod holidays;
pub mod market;
pub mod repository;
pub mod sync;
pub mod time;
pub mod wire;

pub use error::{PersonaError, PersonaResult};
pub use event::*;
pub use filter::{EventFilter, EventQuery};
pub use time::CivilZone;
