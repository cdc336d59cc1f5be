//! 答题进度的本地存档

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::structs::answer::Answer;
use crate::utils::read_file_if_exists;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("读写进度文件失败: {0}")]
    Io(#[from] io::Error),
    #[error("进度编码失败: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// 同一主题、同样题量的会话才会恢复进度
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub topic: String,
    pub question_count: usize,
}

impl SessionKey {
    pub fn new(topic: impl Into<String>, question_count: usize) -> Self {
        Self {
            topic: topic.into(),
            question_count,
        }
    }

    fn storage_key(&self) -> String {
        format!("{}:{}", self.question_count, self.topic)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProgress {
    pub current_question_index: usize,
    pub answers: Vec<Answer>,
    /// 秒
    pub elapsed_secs: u64,
    pub time_remaining: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgressFile {
    sessions: HashMap<String, SavedProgress>,
}

#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    // 文件损坏时当作没有存档
    fn read(&self) -> Result<ProgressFile, ProgressError> {
        let Some(contents) = read_file_if_exists(&self.path)? else {
            return Ok(ProgressFile::default());
        };
        match serde_json::from_str(&contents) {
            Ok(file) => Ok(file),
            Err(e) => {
                log::warn!("进度文件{}无法解析，已忽略: {e}", self.path.display());
                Ok(ProgressFile::default())
            }
        }
    }

    fn write(&self, file: &ProgressFile) -> Result<(), ProgressError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string(file)?)?;
        Ok(())
    }

    pub fn save(&self, key: &SessionKey, progress: &SavedProgress) -> Result<(), ProgressError> {
        let mut file = self.read()?;
        file.sessions.insert(key.storage_key(), progress.clone());
        self.write(&file)
    }

    pub fn load(&self, key: &SessionKey) -> Result<Option<SavedProgress>, ProgressError> {
        Ok(self.read()?.sessions.remove(&key.storage_key()))
    }

    pub fn clear(&self, key: &SessionKey) -> Result<(), ProgressError> {
        let mut file = self.read()?;
        if file.sessions.remove(&key.storage_key()).is_some() {
            self.write(&file)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::answer::AnswerValue;

    fn progress() -> SavedProgress {
        SavedProgress {
            current_question_index: 2,
            answers: vec![Answer {
                question_index: 0,
                answer: AnswerValue::Index(1),
                time_spent: 12,
            }],
            elapsed_secs: 95,
            time_remaining: Some(205),
        }
    }

    #[test]
    fn saved_progress_is_found_only_under_its_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        let key = SessionKey::new("Rust", 5);
        store.save(&key, &progress()).unwrap();

        assert_eq!(store.load(&key).unwrap(), Some(progress()));
        assert_eq!(store.load(&SessionKey::new("Rust", 4)).unwrap(), None);
        assert_eq!(store.load(&SessionKey::new("rust", 5)).unwrap(), None);
    }

    #[test]
    fn clear_only_drops_one_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("nested").join("progress.json"));
        let rust = SessionKey::new("Rust", 5);
        let go = SessionKey::new("Go", 3);
        store.save(&rust, &progress()).unwrap();
        store.save(&go, &progress()).unwrap();

        store.clear(&rust).unwrap();
        assert_eq!(store.load(&rust).unwrap(), None);
        assert!(store.load(&go).unwrap().is_some());
    }

    #[test]
    fn missing_or_corrupt_file_means_no_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let store = ProgressStore::new(&path);
        let key = SessionKey::new("Rust", 5);
        assert_eq!(store.load(&key).unwrap(), None);

        fs::write(&path, "{not json").unwrap();
        assert_eq!(store.load(&key).unwrap(), None);
        // 损坏的文件会在下次保存时被覆盖
        store.save(&key, &progress()).unwrap();
        assert!(store.load(&key).unwrap().is_some());
    }
}
