//! File-based repository implementations.

mod board;

pub use board::FileBoardRepository;
