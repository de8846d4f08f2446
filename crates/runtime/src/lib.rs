//! Runtime orchestration for scouting episodes.
//!
//! This crate wraps the deterministic `scout-core` logic with the parts that
//! touch the outside world: persisted boards, environment configuration and
//! logging. Consumers build a [`Runtime`], start an [`Episode`] per run, feed
//! it unit reports each tick and finish it to persist the learned board.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the episode lifecycle and configuration
//! - [`api`] exposes the error types downstream clients interact with
//! - [`repository`] provides board persistence adapters
pub mod api;
pub mod repository;
pub mod runtime;

mod utils;

pub use api::{Result, RuntimeError};
pub use repository::{
    BoardKey, BoardRecord, BoardRepository, FileBoardRepository, InMemoryBoardRepository,
    RepositoryError,
};
pub use runtime::{Episode, Runtime, RuntimeConfig};
