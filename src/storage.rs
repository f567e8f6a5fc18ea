use std::collections::BTreeMap;

use crate::errors::{RegistryError, Result};

/// file storage collaborator surface: accepts bytes plus a logical path and
/// returns the stored path; deletion is by path
///
/// The real implementation lives outside this crate; tests and demos use the
/// in-memory store below.
pub trait DocumentStore {
    fn store(&mut self, logical_path: &str, bytes: &[u8]) -> Result<String>;
    fn remove(&mut self, stored_path: &str) -> Result<()>;
    fn exists(&self, stored_path: &str) -> bool;
}

/// in-memory document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn store(&mut self, logical_path: &str, bytes: &[u8]) -> Result<String> {
        if logical_path.is_empty() {
            return Err(RegistryError::Validation {
                field: "logical_path",
                message: "must not be empty".to_string(),
            });
        }
        self.files.insert(logical_path.to_string(), bytes.to_vec());
        Ok(logical_path.to_string())
    }

    fn remove(&mut self, stored_path: &str) -> Result<()> {
        self.files
            .remove(stored_path)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound {
                entity: "stored document",
                id: stored_path.to_string(),
            })
    }

    fn exists(&self, stored_path: &str) -> bool {
        self.files.contains_key(stored_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_remove() {
        let mut store = MemoryStore::new();
        let path = store
            .store("garanties/justificatifs/decision.pdf", b"%PDF-")
            .unwrap();
        assert!(store.exists(&path));
        store.remove(&path).unwrap();
        assert!(!store.exists(&path));
        assert!(store.remove(&path).is_err());
    }
}
