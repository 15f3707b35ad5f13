//! Durable storage seam for the session blob.
//!
//! The browser keeps this in localStorage under one key; here the seam is a
//! trait so the session store runs against a file on disk or plain memory
//! in tests. Writes are synchronous.

use std::{
    fs,
    path::PathBuf,
    sync::Mutex,
};

use tracing::warn;

pub const SESSION_KEY: &str = "ticketPortalTk";

pub trait SessionStorage: Send + Sync {
    fn read(&self) -> Option<String>;
    fn write(&self, blob: &str);
    fn clear(&self);
}

#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self) -> Option<String> {
        self.slot.lock().unwrap().clone()
    }

    fn write(&self, blob: &str) {
        *self.slot.lock().unwrap() = Some(blob.to_string());
    }

    fn clear(&self) {
        *self.slot.lock().unwrap() = None;
    }
}

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStorage for FileStorage {
    fn read(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|blob| blob.trim().to_string())
            .filter(|blob| !blob.is_empty())
    }

    fn write(&self, blob: &str) {
        if let Err(e) = fs::write(&self.path, blob) {
            warn!("Failed to persist session: {e}");
        }
    }

    fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.read().is_none());

        storage.write("blob");
        assert_eq!(storage.read().as_deref(), Some("blob"));

        storage.clear();
        assert!(storage.read().is_none());
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("{SESSION_KEY}-test"));
        let storage = FileStorage::new(&path);
        storage.clear();

        assert!(storage.read().is_none());

        storage.write("blob\n");
        assert_eq!(storage.read().as_deref(), Some("blob"));

        storage.clear();
        assert!(storage.read().is_none());
    }
}
