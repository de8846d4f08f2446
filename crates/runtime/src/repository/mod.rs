//! Repository layer for learned boards.
//!
//! A board is the tower belief left at the end of an episode. It is stored
//! under a [`BoardKey`] derived from the board size and starting units, and
//! reloaded as the prior of the next episode with the same key.

mod error;
mod file;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use file::FileBoardRepository;
pub use memory::InMemoryBoardRepository;
pub use traits::BoardRepository;
pub use types::{BoardKey, BoardRecord};
