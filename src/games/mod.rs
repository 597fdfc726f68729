pub mod crossword;
pub mod stats;

pub use crossword::{CheckOutcome, Completion, Crossword, Difficulty, PuzzleLibrary, Status};
pub use stats::{GameStats, JsonFileStore, MemoryStore, StatsBook, StatsStore};
