//! In-memory repository implementations.

mod board;

pub use board::InMemoryBoardRepository;
