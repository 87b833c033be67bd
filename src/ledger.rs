// The ledger: owns the item collection and writes it through to storage

use crate::fields::{Defaults, ItemFields};
use crate::filter::Filter;
use crate::models::{Item, Status, now_ms};
use crate::storage::Storage;
use crate::summary::Totals;
use chrono::Utc;
use eyre::{Result, eyre};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Read-only view handed to charts, exports and share generators
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub totals: Totals,
}

/// In-memory item collection, most recently added first.
///
/// Every mutation saves the full collection through the injected storage
/// before returning.
pub struct Ledger<S: Storage> {
    items: Vec<Item>,
    storage: S,
    defaults: Defaults,
    last_id: i64,
}

impl<S: Storage> Ledger<S> {
    /// Load the ledger from storage with the standard defaults
    pub fn open(storage: S) -> Self {
        Self::with_defaults(storage, Defaults::default())
    }

    /// Load the ledger from storage.
    ///
    /// Unreadable or corrupt storage starts an empty ledger; the next save
    /// overwrites whatever was there.
    pub fn with_defaults(storage: S, defaults: Defaults) -> Self {
        let items = match storage.load() {
            Ok(items) => items,
            Err(e) => {
                warn!(error = ?e, "Failed to load stored items, starting empty");
                Vec::new()
            }
        };
        let last_id = items.iter().map(|item| item.id).max().unwrap_or(0);

        info!(count = items.len(), "Ledger opened");
        Self {
            items,
            storage,
            defaults,
            last_id,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn get(&self, id: i64) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Normalize a raw field bundle into a new item and prepend it.
    ///
    /// Malformed numbers take the configured defaults; only a missing name
    /// is rejected (as [`crate::LedgerError::MissingName`]).
    pub fn add(&mut self, fields: ItemFields) -> Result<Item> {
        let normalized = self.defaults.normalize(&fields)?;

        let item = Item {
            id: self.next_id()?,
            total: normalized.total(),
            name: normalized.name,
            price: normalized.price,
            quantity: normalized.quantity,
            unit: normalized.unit,
            status: normalized.status,
            date: Utc::now(),
        };

        debug!(id = item.id, name = %item.name, status = %item.status, total = item.total, "Adding item");
        self.items.insert(0, item.clone());
        self.persist()?;

        Ok(item)
    }

    /// Move a planned item to bought, stamping the current time.
    ///
    /// Returns `None` without touching anything when the id is unknown or the
    /// item was already bought.
    pub fn mark_bought(&mut self, id: i64) -> Result<Option<Item>> {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.id == id && item.status == Status::Planned)
        else {
            debug!(id, "No planned item with this id");
            return Ok(None);
        };

        item.status = Status::Bought;
        item.date = Utc::now();
        let updated = item.clone();

        debug!(id, "Marked item bought");
        self.persist()?;

        Ok(Some(updated))
    }

    /// Delete an item by id, returning it if it existed
    pub fn remove(&mut self, id: i64) -> Result<Option<Item>> {
        let Some(pos) = self.items.iter().position(|item| item.id == id) else {
            return Ok(None);
        };

        let removed = self.items.remove(pos);
        debug!(id, name = %removed.name, "Removed item");
        self.persist()?;

        Ok(Some(removed))
    }

    /// Lazily iterate items with the given status in collection order.
    ///
    /// The iterator is `Clone`, so a consumer can restart it cheaply.
    pub fn filter_by_status(&self, status: Status) -> impl Iterator<Item = &Item> + Clone + '_ {
        self.items.iter().filter(move |item| item.status == status)
    }

    /// The shopping list
    pub fn planned(&self) -> impl Iterator<Item = &Item> + Clone + '_ {
        self.filter_by_status(Status::Planned)
    }

    /// The purchase history
    pub fn bought(&self) -> impl Iterator<Item = &Item> + Clone + '_ {
        self.filter_by_status(Status::Bought)
    }

    /// Items matching every filter, in collection order
    pub fn list(&self, filters: &[Filter]) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| filters.iter().all(|f| f.matches(item)))
            .collect()
    }

    pub fn totals(&self) -> Totals {
        Totals::from_items(&self.items)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            items: self.items.clone(),
            totals: self.totals(),
        }
    }

    /// Ids follow the creation instant in milliseconds, bumped past the
    /// largest id seen so two items created in the same millisecond differ.
    fn next_id(&mut self) -> Result<i64> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| eyre!("Item id space exhausted (largest id {})", self.last_id))?;
        let id = now_ms().max(next);
        self.last_id = id;
        Ok(id)
    }

    fn persist(&mut self) -> Result<()> {
        self.storage.save(&self.items)
    }
}
