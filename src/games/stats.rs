//! Lifetime crossword statistics and where they are kept.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::games::crossword::{Completion, Difficulty};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameStats {
    pub completed: u64,
    /// Seconds across every completed puzzle.
    pub total_time: u64,
    pub total_words: u64,
    pub best_time: Option<u64>,
    pub by_difficulty: BTreeMap<Difficulty, u64>,
}

impl GameStats {
    pub fn record(&mut self, completion: &Completion, elapsed_secs: u64) {
        self.completed += 1;
        self.total_time = self.total_time.saturating_add(elapsed_secs);
        self.total_words += u64::from(completion.words);
        self.best_time = Some(match self.best_time {
            Some(best) => best.min(elapsed_secs),
            None => elapsed_secs,
        });
        *self.by_difficulty.entry(completion.difficulty).or_default() += 1;
    }

    pub fn average_time(&self) -> Option<f64> {
        (self.completed > 0).then(|| self.total_time as f64 / self.completed as f64)
    }
}

/// Backing storage for [`GameStats`].
pub trait StatsStore: Send {
    fn load(&self) -> Result<GameStats>;
    fn save(&mut self, stats: &GameStats) -> Result<()>;
}

/// JSON file on disk. A missing file reads as empty stats.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::StatsIo {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl StatsStore for JsonFileStore {
    fn load(&self) -> Result<GameStats> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(GameStats::default()),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&text).map_err(|source| Error::StatsFormat {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn save(&mut self, stats: &GameStats) -> Result<()> {
        let json = serde_json::to_string_pretty(stats).map_err(|source| Error::StatsFormat {
            path: self.path.display().to_string(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        // write-then-rename so a crash never leaves a half-written file
        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp_file = File::create(&tmp_path).map_err(|e| self.io_error(e))?;
        tmp_file
            .write_all(json.as_bytes())
            .and_then(|()| tmp_file.sync_all())
            .map_err(|e| self.io_error(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            self.io_error(e)
        })
    }
}

/// In-process store for tests and `--no-persist` runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    stats: Arc<Mutex<GameStats>>,
}

impl MemoryStore {
    pub fn snapshot(&self) -> GameStats {
        self.guard().clone()
    }

    fn guard(&self) -> MutexGuard<'_, GameStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatsStore for MemoryStore {
    fn load(&self) -> Result<GameStats> {
        Ok(self.snapshot())
    }

    fn save(&mut self, stats: &GameStats) -> Result<()> {
        *self.guard() = stats.clone();
        Ok(())
    }
}

/// Stats held in memory and written through to a store on every change.
pub struct StatsBook {
    stats: GameStats,
    store: Box<dyn StatsStore>,
}

impl StatsBook {
    /// Loads once. An unreadable store is logged and replaced with empty stats
    /// so a corrupt file never blocks play.
    pub fn open(store: Box<dyn StatsStore>) -> Self {
        let stats = match store.load() {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "starting with empty crossword stats");
                GameStats::default()
            }
        };
        tracing::debug!(completed = stats.completed, "crossword stats loaded");
        Self { stats, store }
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Counts the completion and saves. The in-memory count stands even when
    /// the save fails.
    pub fn record(&mut self, completion: &Completion, elapsed_secs: u64) -> Result<&GameStats> {
        self.stats.record(completion, elapsed_secs);
        tracing::info!(
            difficulty = %completion.difficulty,
            elapsed_secs,
            completed = self.stats.completed,
            "crossword completed"
        );
        self.store.save(&self.stats)?;
        Ok(&self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(difficulty: Difficulty, words: u32) -> Completion {
        Completion { difficulty, words }
    }

    #[test]
    fn record_accumulates_totals() {
        let mut stats = GameStats::default();
        stats.record(&completion(Difficulty::Easy, 4), 120);
        stats.record(&completion(Difficulty::Hard, 5), 300);
        stats.record(&completion(Difficulty::Easy, 4), 90);

        assert_eq!(stats.completed, 3);
        assert_eq!(stats.total_time, 510);
        assert_eq!(stats.total_words, 13);
        assert_eq!(stats.best_time, Some(90));
        assert_eq!(stats.by_difficulty.get(&Difficulty::Easy), Some(&2));
        assert_eq!(stats.by_difficulty.get(&Difficulty::Expert), None);
        assert_eq!(stats.average_time(), Some(170.0));
    }

    #[test]
    fn empty_stats_have_no_best_or_average() {
        let stats = GameStats::default();
        assert_eq!(stats.best_time, None);
        assert_eq!(stats.average_time(), None);
    }

    #[test]
    fn zero_second_solve_is_a_valid_best() {
        let mut stats = GameStats::default();
        stats.record(&completion(Difficulty::Medium, 5), 45);
        stats.record(&completion(Difficulty::Medium, 5), 0);
        assert_eq!(stats.best_time, Some(0));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().expect("missing is fine"), GameStats::default());
    }

    #[test]
    fn file_store_round_trips_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("stats.json");
        let mut store = JsonFileStore::new(&path);

        let mut stats = GameStats::default();
        stats.record(&completion(Difficulty::Expert, 7), 600);
        store.save(&stats).expect("save");

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load().expect("load"), stats);

        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"bestTime\": 600"));
        assert!(raw.contains("\"expert\": 1"));
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stats.json");
        fs::write(&path, r#"{"completed": 2, "totalTime": 100}"#).expect("write");
        let stats = JsonFileStore::new(&path).load().expect("load");
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.total_words, 0);
        assert_eq!(stats.best_time, None);
    }

    #[test]
    fn corrupt_file_is_a_format_error_but_book_still_opens() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stats.json");
        fs::write(&path, "not json").expect("write");

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(Error::StatsFormat { .. })));

        let book = StatsBook::open(Box::new(store));
        assert_eq!(book.stats(), &GameStats::default());
    }

    #[test]
    fn memory_store_still_saves_after_a_poisoned_lock() {
        let mut store = MemoryStore::default();
        let shared = Arc::clone(&store.stats);
        let _ = std::thread::spawn(move || {
            let _guard = shared.lock().expect("first lock");
            panic!("writer died holding the lock");
        })
        .join();
        assert!(store.stats.is_poisoned());

        let mut stats = GameStats::default();
        stats.record(&completion(Difficulty::Hard, 5), 240);
        store.save(&stats).expect("save");
        assert_eq!(store.snapshot(), stats);
        assert_eq!(store.load().expect("load").completed, 1);
    }

    #[test]
    fn book_writes_through_on_record() {
        let store = MemoryStore::default();
        let mut book = StatsBook::open(Box::new(store.clone()));
        book.record(&completion(Difficulty::Easy, 4), 30).expect("save");
        assert_eq!(store.snapshot().completed, 1);
        assert_eq!(store.snapshot().best_time, Some(30));

        let reopened = StatsBook::open(Box::new(store));
        assert_eq!(reopened.stats().total_words, 4);
    }
}
