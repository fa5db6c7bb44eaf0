//! # solvetrack
//!
//! Archives competitive-programming solutions to a GitHub repository and
//! records them on a shared tracking spreadsheet.
//!
//! The interesting part is the delivery path: coordinates into the sheet
//! come from a locally cached map that can go stale whenever an instructor
//! edits the roster, and the remote endpoint offers nothing beyond a single
//! best-effort write per call. The `delivery` engine owns the retry and
//! reconciliation state machine around that write.
//!
//! ## Modules
//!
//! - `slug` - canonical problem identifiers derived from judge-site URLs
//! - `sheet` - cached sheet map, persistence, and endpoint transport
//! - `delivery` - the retry/reconciliation state machine
//! - `archive` - durable code storage (GitHub), path layout, READMEs
//! - `submit` - end-to-end pipeline from captured solution to outcome
//! - `config` - TOML configuration
//! - `cli` - command-line interface

pub mod archive;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod sheet;
pub mod slug;
pub mod submit;

pub use error::{Error, Result};
