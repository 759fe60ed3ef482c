use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One persisted puzzle. Field order is the on-disk field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleRecord {
    pub id: String,
    pub group: String,
    pub digits: String,
    pub date: String,
    pub difficulty: String,
    pub source: String,
    // 舊檔案可能存成 null
    #[serde(default, deserialize_with = "null_as_empty")]
    pub solution: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Difficulty {
    Easy,
    Medium,
    #[default]
    Hard,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }

    /// Numeric level used by the puzzle app (1 = easy .. 4 = expert).
    pub fn level(&self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Expert => 4,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "expert" => Ok(Difficulty::Expert),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Where puzzles come from and how they are labelled in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleSource {
    pub base_url: String,
    pub tag: String,
    pub group: String,
    pub name: String,
    pub solution_script: String,
}

impl Default for PuzzleSource {
    fn default() -> Self {
        Self {
            base_url: "https://sudokupad.app/nyt".to_string(),
            tag: "nyt".to_string(),
            group: "NYT Puzzle".to_string(),
            name: "New York Times".to_string(),
            solution_script: "Framework.app.puzzle.metadata.solution".to_string(),
        }
    }
}

impl PuzzleSource {
    /// `nyt:hard-2025-03-01`
    pub fn puzzle_id(&self, difficulty: Difficulty, date: NaiveDate) -> String {
        format!("{}:{}-{}", self.tag, difficulty, date.format("%Y-%m-%d"))
    }

    /// `https://sudokupad.app/nyt/20250301hard`
    pub fn puzzle_url(&self, difficulty: Difficulty, date: NaiveDate) -> String {
        format!(
            "{}/{}{}",
            self.base_url.trim_end_matches('/'),
            date.format("%Y%m%d"),
            difficulty
        )
    }

    pub fn record(
        &self,
        difficulty: Difficulty,
        date: NaiveDate,
        digits: String,
        solution: String,
    ) -> PuzzleRecord {
        PuzzleRecord {
            id: self.puzzle_id(difficulty, date),
            group: self.group.clone(),
            digits,
            date: record_timestamp(date),
            difficulty: difficulty.to_string(),
            source: self.name.clone(),
            solution,
        }
    }
}

/// Midnight UTC in the `2025-03-01T00:00:00.000Z` form the store sorts on.
pub fn record_timestamp(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}
