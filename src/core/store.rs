use crate::domain::model::PuzzleRecord;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::collections::HashMap;

/// Puzzles keyed by id, flushed to storage as a date-sorted JSON array.
pub struct PuzzleStore<S: Storage> {
    storage: S,
    puzzles: HashMap<String, PuzzleRecord>,
}

impl<S: Storage> PuzzleStore<S> {
    /// Never fails: a missing or unreadable file starts an empty store.
    pub fn load(storage: S) -> Self {
        let puzzles = match Self::read_records(&storage) {
            Ok(Some(records)) => {
                tracing::info!(
                    "📂 Loaded {} existing puzzles from {}",
                    records.len(),
                    storage.describe()
                );
                records.into_iter().map(|r| (r.id.clone(), r)).collect()
            }
            Ok(None) => {
                tracing::info!("📂 No puzzle file at {}, starting empty", storage.describe());
                HashMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Error loading existing puzzles from {}: {}",
                    storage.describe(),
                    e
                );
                HashMap::new()
            }
        };

        Self { storage, puzzles }
    }

    fn read_records(storage: &S) -> Result<Option<Vec<PuzzleRecord>>> {
        match storage.read_file()? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.puzzles.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&PuzzleRecord> {
        self.puzzles.get(id)
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    /// Replaces any record with the same id in full; returns the old one.
    pub fn upsert(&mut self, record: PuzzleRecord) -> Option<PuzzleRecord> {
        self.puzzles.insert(record.id.clone(), record)
    }

    /// Newest first; equal dates fall back to id order.
    pub fn records(&self) -> Vec<&PuzzleRecord> {
        let mut records: Vec<&PuzzleRecord> = self.puzzles.values().collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        records
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records())?;
        self.storage.write_file(json.as_bytes())?;
        tracing::debug!(
            "💾 Saved {} puzzles to {}",
            self.puzzles.len(),
            self.storage.describe()
        );
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
