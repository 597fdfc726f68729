//! Crossword puzzles and the per-player solving session.
//!
//! Puzzle content is authored JSON (`data/crosswords.json`); this module only
//! validates placements, builds the solution grid and tracks a player's
//! entries against it. Nothing here generates or searches for fills.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const BUILTIN_PUZZLES: &str = include_str!("../../data/crosswords.json");
const MAX_GRID_SIDE: usize = 25;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| Error::UnknownDifficulty(s.to_string()))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDefinition {
    pub number: u32,
    pub direction: Direction,
    pub row: usize,
    pub col: usize,
    pub answer: String,
    pub clue: String,
}

impl WordDefinition {
    pub fn len(&self) -> usize {
        self.answer.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.answer.is_empty()
    }

    /// Grid coordinates of each letter, first to last.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (row, col, direction) = (self.row, self.col, self.direction);
        (0..self.len()).map(move |k| match direction {
            Direction::Across => (row, col.saturating_add(k)),
            Direction::Down => (row.saturating_add(k), col),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDefinition {
    pub difficulty: Difficulty,
    pub title: String,
    pub rows: usize,
    pub cols: usize,
    pub words: Vec<WordDefinition>,
}

#[derive(Debug, Deserialize)]
struct PuzzleFile {
    puzzles: Vec<PuzzleDefinition>,
}

/// A validated puzzle with its solution laid out row-major. Block cells hold
/// `None`.
#[derive(Debug, Clone)]
pub struct Puzzle {
    difficulty: Difficulty,
    title: String,
    rows: usize,
    cols: usize,
    words: Vec<WordDefinition>,
    solution: Vec<Option<char>>,
}

impl Puzzle {
    pub fn from_definition(definition: PuzzleDefinition) -> Result<Self> {
        let PuzzleDefinition {
            difficulty,
            title,
            rows,
            cols,
            mut words,
        } = definition;

        if rows == 0 || cols == 0 || rows > MAX_GRID_SIDE || cols > MAX_GRID_SIDE {
            return Err(Error::invalid_puzzle(
                &title,
                format!("grid {rows}x{cols} must be between 1x1 and {MAX_GRID_SIDE}x{MAX_GRID_SIDE}"),
            ));
        }
        if words.is_empty() {
            return Err(Error::invalid_puzzle(&title, "puzzle has no words"));
        }

        let mut solution = vec![None; rows * cols];
        let mut seen = HashSet::new();
        for word in &mut words {
            word.answer = word.answer.trim().to_ascii_uppercase();
            let label = format!("{} {:?}", word.number, word.direction);

            if !seen.insert((word.number, word.direction)) {
                return Err(Error::invalid_puzzle(&title, format!("{label} is defined twice")));
            }
            if word.answer.is_empty() || !word.answer.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(Error::invalid_puzzle(
                    &title,
                    format!("{label} answer '{}' must be letters only", word.answer),
                ));
            }

            let (start, side) = match word.direction {
                Direction::Across => (word.col, cols),
                Direction::Down => (word.row, rows),
            };
            if word.row >= rows || word.col >= cols || word.len() > side - start {
                return Err(Error::invalid_puzzle(
                    &title,
                    format!("{label} at ({}, {}) runs off the grid", word.row, word.col),
                ));
            }

            for ((row, col), letter) in word.cells().zip(word.answer.chars()) {
                let cell = &mut solution[row * cols + col];
                match *cell {
                    Some(existing) if existing != letter => {
                        return Err(Error::invalid_puzzle(
                            &title,
                            format!(
                                "{label} puts '{letter}' at ({row}, {col}) where a crossing word has '{existing}'"
                            ),
                        ));
                    }
                    _ => *cell = Some(letter),
                }
            }
        }

        words.sort_by_key(|w| (w.direction != Direction::Across, w.number));

        Ok(Self {
            difficulty,
            title,
            rows,
            cols,
            words,
            solution,
        })
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn words(&self) -> &[WordDefinition] {
        &self.words
    }

    pub fn solution_at(&self, row: usize, col: usize) -> Option<char> {
        self.index(row, col).and_then(|i| self.solution[i])
    }

    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.solution_at(row, col).is_some()
    }

    pub fn open_cell_count(&self) -> usize {
        self.solution.iter().filter(|c| c.is_some()).count()
    }

    /// Clue number printed in the top-left of a cell, if a word starts there.
    pub fn number_at(&self, row: usize, col: usize) -> Option<u32> {
        self.words
            .iter()
            .find(|w| w.row == row && w.col == col)
            .map(|w| w.number)
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }
}

/// The authored puzzle set, one puzzle per difficulty.
#[derive(Debug, Clone)]
pub struct PuzzleLibrary {
    puzzles: Vec<Arc<Puzzle>>,
}

impl PuzzleLibrary {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_PUZZLES)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: PuzzleFile = serde_json::from_str(json)
            .map_err(|e| Error::invalid_puzzle("library", e.to_string()))?;

        let mut slots: Vec<Option<Arc<Puzzle>>> = vec![None; Difficulty::ALL.len()];
        for definition in file.puzzles {
            let puzzle = Puzzle::from_definition(definition)?;
            let slot = &mut slots[puzzle.difficulty.index()];
            if slot.is_some() {
                return Err(Error::invalid_puzzle(
                    puzzle.title,
                    format!("second puzzle for difficulty {}", puzzle.difficulty),
                ));
            }
            *slot = Some(Arc::new(puzzle));
        }

        let puzzles = slots
            .into_iter()
            .zip(Difficulty::ALL)
            .map(|(slot, difficulty)| {
                slot.ok_or_else(|| {
                    Error::invalid_puzzle("library", format!("no puzzle for difficulty {difficulty}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { puzzles })
    }

    pub fn get(&self, difficulty: Difficulty) -> Arc<Puzzle> {
        Arc::clone(&self.puzzles[difficulty.index()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Puzzle>> {
        self.puzzles.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub correct: usize,
    pub filled: usize,
    pub total: usize,
    /// Every open cell has a letter (some of them wrong).
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Status {
    Unsolved,
    Checked(CheckReport),
    Solved,
}

/// Emitted once, on the transition into [`Status::Solved`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub difficulty: Difficulty,
    pub words: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Checked(CheckReport),
    Solved(Completion),
    AlreadySolved,
}

/// One player's attempt at a puzzle.
#[derive(Debug, Clone)]
pub struct Crossword {
    puzzle: Arc<Puzzle>,
    entries: Vec<Option<char>>,
    status: Status,
}

impl Crossword {
    pub fn new(puzzle: Arc<Puzzle>) -> Self {
        let entries = vec![None; puzzle.rows * puzzle.cols];
        Self {
            puzzle,
            entries,
            status: Status::Unsolved,
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn entry(&self, row: usize, col: usize) -> Option<char> {
        self.puzzle.index(row, col).and_then(|i| self.entries[i])
    }

    /// Writes a letter into an open cell. Returns the completion when this
    /// edit finishes the grid.
    pub fn set_cell(&mut self, row: usize, col: usize, letter: char) -> Result<Option<Completion>> {
        if !letter.is_ascii_alphabetic() {
            return Err(Error::InvalidLetter(letter));
        }
        self.write(row, col, Some(letter.to_ascii_uppercase()))?;
        Ok(self.try_solve())
    }

    pub fn clear_cell(&mut self, row: usize, col: usize) -> Result<()> {
        self.write(row, col, None)
    }

    /// Compares entries with the solution without touching them.
    pub fn check(&mut self) -> CheckOutcome {
        if self.status == Status::Solved {
            return CheckOutcome::AlreadySolved;
        }
        if let Some(completion) = self.try_solve() {
            return CheckOutcome::Solved(completion);
        }
        let report = self.report();
        self.status = Status::Checked(report);
        CheckOutcome::Checked(report)
    }

    /// Clears every entry and starts over on the same puzzle.
    pub fn reset(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
        self.status = Status::Unsolved;
    }

    pub fn new_puzzle(&mut self, library: &PuzzleLibrary, difficulty: Difficulty) {
        *self = Crossword::new(library.get(difficulty));
    }

    pub fn report(&self) -> CheckReport {
        let mut report = CheckReport {
            correct: 0,
            filled: 0,
            total: 0,
            complete: false,
        };
        for (entry, solution) in self.entries.iter().zip(&self.puzzle.solution) {
            let Some(expected) = solution else {
                continue;
            };
            report.total += 1;
            if let Some(actual) = entry {
                report.filled += 1;
                if actual == expected {
                    report.correct += 1;
                }
            }
        }
        report.complete = report.filled == report.total;
        report
    }

    /// Every cell along every word holds the authored letter.
    pub fn is_grid_solved(&self) -> bool {
        self.puzzle.words.iter().all(|w| self.is_word_solved(w))
    }

    /// Solved flag per word, in the puzzle's word order.
    pub fn word_status(&self) -> Vec<bool> {
        self.puzzle
            .words
            .iter()
            .map(|w| self.is_word_solved(w))
            .collect()
    }

    fn is_word_solved(&self, word: &WordDefinition) -> bool {
        word.cells()
            .zip(word.answer.chars())
            .all(|((row, col), letter)| self.entry(row, col) == Some(letter))
    }

    fn write(&mut self, row: usize, col: usize, value: Option<char>) -> Result<()> {
        if self.status == Status::Solved {
            return Err(Error::AlreadySolved);
        }
        let index = self
            .puzzle
            .index(row, col)
            .filter(|&i| self.puzzle.solution[i].is_some())
            .ok_or(Error::InvalidCell { row, col })?;
        self.entries[index] = value;
        self.status = Status::Unsolved;
        Ok(())
    }

    fn try_solve(&mut self) -> Option<Completion> {
        if self.status == Status::Solved || !self.is_grid_solved() {
            return None;
        }
        self.status = Status::Solved;
        Some(Completion {
            difficulty: self.puzzle.difficulty,
            words: self.puzzle.words.len() as u32,
        })
    }

    pub fn view(&self) -> SessionView {
        let grid: Vec<String> = (0..self.puzzle.rows)
            .map(|row| {
                (0..self.puzzle.cols)
                    .map(|col| match (self.puzzle.is_open(row, col), self.entry(row, col)) {
                        (false, _) => '#',
                        (true, Some(letter)) => letter,
                        (true, None) => '.',
                    })
                    .collect()
            })
            .collect();
        let clues = self
            .puzzle
            .words
            .iter()
            .zip(self.word_status())
            .map(|(word, solved)| ClueView {
                number: word.number,
                direction: word.direction,
                row: word.row,
                col: word.col,
                length: word.len(),
                clue: word.clue.clone(),
                solved,
            })
            .collect();

        SessionView {
            difficulty: self.puzzle.difficulty,
            title: self.puzzle.title.clone(),
            rows: self.puzzle.rows,
            cols: self.puzzle.cols,
            grid,
            clues,
            status: self.status,
        }
    }

    /// Plain-text grid with clue numbers, for terminals.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in 0..self.puzzle.rows {
            for col in 0..self.puzzle.cols {
                let cell = if !self.puzzle.is_open(row, col) {
                    "###".to_string()
                } else {
                    let number = self
                        .puzzle
                        .number_at(row, col)
                        .map(|n| n.to_string())
                        .unwrap_or_default();
                    let letter = self.entry(row, col).unwrap_or('_');
                    format!("{number:>2}{letter}")
                };
                out.push_str(&cell);
                out.push(' ');
            }
            out.truncate(out.trim_end().len());
            out.push('\n');
        }
        for direction in [Direction::Across, Direction::Down] {
            out.push_str(&format!("\n{direction:?}\n"));
            for word in self.puzzle.words.iter().filter(|w| w.direction == direction) {
                out.push_str(&format!("{:>3}. {} ({})\n", word.number, word.clue, word.len()));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClueView {
    pub number: u32,
    pub direction: Direction,
    pub row: usize,
    pub col: usize,
    pub length: usize,
    pub clue: String,
    pub solved: bool,
}

/// What a client sees: entries but never the solution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub difficulty: Difficulty,
    pub title: String,
    pub rows: usize,
    pub cols: usize,
    /// One string per row; `#` is a block, `.` an empty open cell.
    pub grid: Vec<String>,
    pub clues: Vec<ClueView>,
    pub status: Status,
}
