pub mod etl;
pub mod grid;
pub mod store;

pub use crate::domain::model::{Difficulty, PuzzleRecord, PuzzleSource};
pub use crate::domain::ports::{PageRenderer, RenderOutcome, Storage};
pub use crate::utils::error::Result;
