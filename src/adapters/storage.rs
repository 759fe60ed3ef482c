use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// The puzzle file on local disk.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn save_error(&self, source: std::io::Error) -> EtlError {
        EtlError::StoreSaveError {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl Storage for LocalStorage {
    fn read_file(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.save_error(e))?;
            }
        }

        // 先寫暫存檔再改名，中斷時不會留下半個檔案
        let temp = self.temp_path();
        fs::write(&temp, data).map_err(|e| self.save_error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.save_error(e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory storage; clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(data: Vec<u8>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(data))),
        }
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Storage for MemoryStorage {
    fn read_file(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.contents())
    }

    fn write_file(&self, data: &[u8]) -> Result<()> {
        let mut contents = self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *contents = Some(data.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
