// Persistence adapter contract plus the in-memory backend

use crate::models::Item;
use eyre::{Context, Result, eyre};

/// Key the browser version stored its collection under
pub const DEFAULT_STORAGE_KEY: &str = "groceryData";

/// Loads and saves the whole item collection as one opaque blob.
///
/// There is no partial update: every save replaces the previous blob.
pub trait Storage {
    /// Load the stored collection. A missing blob is an empty collection.
    fn load(&self) -> Result<Vec<Item>>;

    /// Replace the stored collection
    fn save(&mut self, items: &[Item]) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn load(&self) -> Result<Vec<Item>> {
        (**self).load()
    }

    fn save(&mut self, items: &[Item]) -> Result<()> {
        (**self).save(items)
    }
}

/// Serialize a collection into the blob format (a JSON array)
pub fn encode(items: &[Item]) -> Result<String> {
    serde_json::to_string(items).context("Failed to serialize items")
}

/// Parse a blob back into a collection
pub fn decode(blob: &str) -> Result<Vec<Item>> {
    if blob.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(blob).context("Failed to parse stored items")
}

/// Validate a storage key
///
/// Keys end up in file names and SQL parameters, so they are kept to a
/// conservative alphabet.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

/// Backend holding the blob in memory; used by tests and dry runs
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    blob: Option<String>,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing raw blob, as if it had been saved earlier
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            saves: 0,
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Vec<Item>> {
        match &self.blob {
            Some(blob) => decode(blob),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, items: &[Item]) -> Result<()> {
        self.blob = Some(encode(items)?);
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Status, Unit};

    fn sample() -> Vec<Item> {
        vec![
            Item {
                id: 2,
                name: "Eggs".to_string(),
                price: 5.0,
                quantity: 12.0,
                unit: Unit::Count,
                total: 60.0,
                status: Status::Planned,
                date: "2024-03-02T08:00:00Z".parse().unwrap(),
            },
            Item {
                id: 1,
                name: "Milk".to_string(),
                price: 60.0,
                quantity: 2.0,
                unit: Unit::Litre,
                total: 120.0,
                status: Status::Bought,
                date: "2024-03-01T08:00:00Z".parse().unwrap(),
            },
        ]
    }

    #[test]
    fn test_memory_round_trip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_empty());

        let items = sample();
        storage.save(&items).unwrap();
        assert_eq!(storage.load().unwrap(), items);
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn test_blob_is_json_array() {
        let blob = encode(&sample()).unwrap();
        assert!(blob.starts_with('['));
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_decode_empty_and_corrupt() {
        assert!(decode("").unwrap().is_empty());
        assert!(decode("{not json").is_err());
        assert!(MemoryStorage::with_blob("[{\"id\":").load().is_err());
    }

    #[test]
    fn test_boxed_storage_delegates() {
        let mut storage: Box<dyn Storage> = Box::new(MemoryStorage::new());
        storage.save(&sample()).unwrap();
        assert_eq!(storage.load().unwrap().len(), 2);
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key(DEFAULT_STORAGE_KEY).is_ok());
        assert!(validate_key("my-list_2").is_ok());

        assert!(validate_key("").is_err());
        assert!(validate_key("../etc").is_err());
        assert!(validate_key(&"a".repeat(65)).is_err());
    }
}
