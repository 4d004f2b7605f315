//! Best-score record
//!
//! Persisted as a single plain integer in a text file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GameError, Result};

/// Best score with its backing file
#[derive(Debug, Clone)]
pub struct RecordManager {
    path: PathBuf,
    record: u32,
}

impl RecordManager {
    /// Read the record file; missing or corrupt contents count as 0
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = match fs::read_to_string(&path) {
            Ok(text) => match parse_record(&text) {
                Some(value) => {
                    log::info!("Record loaded: {value}");
                    value
                }
                None => {
                    log::warn!("Record file {} is corrupt, starting at 0", path.display());
                    0
                }
            },
            Err(_) => {
                log::info!("No record at {}, starting at 0", path.display());
                0
            }
        };
        Self { path, record }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn obtain_record(&self) -> u32 {
        self.record
    }

    /// Store `score` if it beats the record; returns whether it did
    pub fn check_new_record(&mut self, score: u32) -> bool {
        if score <= self.record {
            return false;
        }
        self.record = score;
        self.persist();
        log::info!("New record: {score}");
        true
    }

    /// Back to 0, persisted immediately
    pub fn reset(&mut self) {
        self.record = 0;
        self.persist();
        log::info!("Record reset");
    }

    /// Write the current value
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.record.to_string()).map_err(|e| GameError::io(&self.path, e))
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            log::error!("Failed to save record: {e}");
        }
    }
}

/// Digits only, surrounding whitespace allowed
fn parse_record(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.txt");
        let mut records = RecordManager::load(&path);
        assert_eq!(records.obtain_record(), 0);
        assert!(records.check_new_record(42));

        let reloaded = RecordManager::load(&path);
        assert_eq!(reloaded.obtain_record(), 42);
        assert_eq!(fs::read_to_string(&path).unwrap(), "42");
    }

    #[test]
    fn test_only_beaten_scores_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.txt");
        fs::write(&path, "50\n").unwrap();
        let mut records = RecordManager::load(&path);
        assert_eq!(records.obtain_record(), 50);
        assert!(!records.check_new_record(50));
        assert!(!records.check_new_record(10));
        assert_eq!(fs::read_to_string(&path).unwrap(), "50\n");
        assert!(records.check_new_record(51));
        assert_eq!(RecordManager::load(&path).obtain_record(), 51);
    }

    #[test]
    fn test_corrupt_file_counts_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        for contents in ["abc", "-5", "12x", "", "99999999999999"] {
            let path = dir.path().join("record.txt");
            fs::write(&path, contents).unwrap();
            assert_eq!(RecordManager::load(&path).obtain_record(), 0, "{contents:?}");
        }
    }

    #[test]
    fn test_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.txt");
        let mut records = RecordManager::load(&path);
        records.check_new_record(7);
        records.reset();
        assert_eq!(records.obtain_record(), 0);
        assert_eq!(RecordManager::load(&path).obtain_record(), 0);
    }

    #[test]
    fn test_unwritable_path_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut records = RecordManager::load(dir.path().join("missing").join("record.txt"));
        assert!(records.check_new_record(3));
        assert_eq!(records.obtain_record(), 3);
        assert!(records.save().is_err());
    }
}
