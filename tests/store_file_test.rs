use sudoku_etl::domain::model::PuzzleRecord;
use sudoku_etl::{LocalStorage, PuzzleStore};
use tempfile::TempDir;

fn record(id: &str, date: &str, digits: &str) -> PuzzleRecord {
    PuzzleRecord {
        id: id.to_string(),
        group: "NYT Puzzle".to_string(),
        digits: digits.to_string(),
        date: date.to_string(),
        difficulty: "hard".to_string(),
        source: "New York Times".to_string(),
        solution: String::new(),
    }
}

#[test]
fn test_overwrite_existing_record_in_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nyt_puzzles.json");
    let old_digits = format!("1{}", ".".repeat(80));
    let new_digits = format!("2{}", ".".repeat(80));

    let mut store = PuzzleStore::load(LocalStorage::new(&path));
    store.upsert(record("nyt:hard-2025-03-01", "2025-03-01T00:00:00.000Z", &old_digits));
    store.save().unwrap();

    let mut store = PuzzleStore::load(LocalStorage::new(&path));
    assert_eq!(store.len(), 1);
    store.upsert(record("nyt:hard-2025-03-01", "2025-03-01T00:00:00.000Z", &new_digits));
    store.save().unwrap();

    let saved: Vec<PuzzleRecord> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, "nyt:hard-2025-03-01");
    assert_eq!(saved[0].digits, new_digits);
}

#[test]
fn test_round_trip_through_disk_reorders_only() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nyt_puzzles.json");

    // 手寫檔案刻意用舊到新排序
    let original = serde_json::json!([
        {"id": "nyt:hard-2025-03-01", "group": "NYT Puzzle", "digits": "a", "date": "2025-03-01T00:00:00.000Z", "difficulty": "hard", "source": "New York Times", "solution": ""},
        {"id": "nyt:hard-2025-12-31", "group": "NYT Puzzle", "digits": "b", "date": "2025-12-31T00:00:00.000Z", "difficulty": "hard", "source": "New York Times", "solution": "123"},
        {"id": "nyt:hard-2025-06-15", "group": "NYT Puzzle", "digits": "c", "date": "2025-06-15T00:00:00.000Z", "difficulty": "hard", "source": "New York Times", "solution": ""}
    ]);
    std::fs::write(&path, serde_json::to_string(&original).unwrap()).unwrap();

    let store = PuzzleStore::load(LocalStorage::new(&path));
    assert_eq!(store.len(), 3);
    store.save().unwrap();

    let saved: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let ids: Vec<&str> = saved.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(
        ids,
        vec!["nyt:hard-2025-12-31", "nyt:hard-2025-06-15", "nyt:hard-2025-03-01"]
    );

    let mut before: Vec<serde_json::Value> = original.as_array().unwrap().clone();
    let mut after = saved.clone();
    before.sort_by_key(|r| r["id"].as_str().unwrap().to_string());
    after.sort_by_key(|r| r["id"].as_str().unwrap().to_string());
    assert_eq!(before, after);
}

#[test]
fn test_corrupt_file_loads_empty_and_is_replaced_on_save() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nyt_puzzles.json");
    std::fs::write(&path, "[{\"id\": \"nyt:hard-2025-03-01\",").unwrap();

    let mut store = PuzzleStore::load(LocalStorage::new(&path));
    assert!(store.is_empty());

    store.upsert(record("nyt:hard-2025-03-02", "2025-03-02T00:00:00.000Z", "x"));
    store.save().unwrap();

    let reloaded = PuzzleStore::load(LocalStorage::new(&path));
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.contains("nyt:hard-2025-03-02"));
}

#[test]
fn test_save_to_unwritable_location_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    // 父路徑是檔案，無法建立目錄
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();
    let path = blocker.join("nyt_puzzles.json");

    let mut store = PuzzleStore::load(LocalStorage::new(&path));
    store.upsert(record("nyt:hard-2025-03-01", "2025-03-01T00:00:00.000Z", "x"));

    let err = store.save().unwrap_err();
    assert!(matches!(err, sudoku_etl::EtlError::StoreSaveError { .. }));
    assert_eq!(
        err.severity(),
        sudoku_etl::utils::error::ErrorSeverity::Critical
    );
}
