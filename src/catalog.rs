// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Item catalog.
//!
//! The catalog is the only owner of item availability. Items are kept in
//! insertion order and looked up by case-insensitive ID.
//!
//! Persistence is delegated to an [`ItemStore`] hook, called whenever an
//! item is added or its availability changes. The default [`NoopStore`]
//! discards every write.

use crate::error::LedgerError;
use crate::item::Item;
use std::fmt;

/// Persistence hook for catalog writes.
pub trait ItemStore: Send {
    /// Saves the current state of `item`.
    fn persist(&mut self, item: &Item) -> Result<(), LedgerError>;
}

/// Store that keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStore;

impl ItemStore for NoopStore {
    fn persist(&mut self, _item: &Item) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// In-memory catalog of rentable and borrowable items.
pub struct Catalog {
    items: Vec<Item>,
    store: Box<dyn ItemStore>,
}

impl Catalog {
    /// Creates an empty catalog with no persistence.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            store: Box::new(NoopStore),
        }
    }

    /// Creates a catalog seeded with `items`, as loaded by a collaborator at startup.
    ///
    /// Seeding does not call the store.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicateItem`] if two items share an ID.
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Result<Self, LedgerError> {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item)?;
        }
        Ok(catalog)
    }

    /// Replaces the persistence hook.
    pub fn with_store(mut self, store: impl ItemStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Adds an item and persists it.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::DuplicateItem`] - an item with the same ID (ignoring case) exists.
    /// - [`LedgerError::Persistence`] - the store rejected the write; the item stays catalogued.
    pub fn add(&mut self, item: Item) -> Result<(), LedgerError> {
        self.insert(item)?;
        let added = &self.items[self.items.len() - 1];
        self.store.persist(added)
    }

    fn insert(&mut self, item: Item) -> Result<(), LedgerError> {
        if self.find(item.id().as_str()).is_some() {
            return Err(LedgerError::DuplicateItem(item.id().clone()));
        }
        self.items.push(item);
        Ok(())
    }

    /// Looks up an item by ID, ignoring case.
    pub fn find(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id().matches(id))
    }

    /// Items currently available, in insertion order.
    pub fn list_available(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_available())
    }

    /// All items, in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Case-insensitive substring search over name and author.
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a Item> {
        let term = term.to_lowercase();
        self.items.iter().filter(move |item| {
            item.name().to_lowercase().contains(&term)
                || item
                    .author()
                    .is_some_and(|author| author.to_lowercase().contains(&term))
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Marks an item as out. Returns `false` if the ID is unknown.
    pub fn mark_unavailable(&mut self, id: &str) -> bool {
        self.set_availability(id, false)
    }

    /// Marks an item as back in stock. Returns `false` if the ID is unknown.
    pub fn mark_available(&mut self, id: &str) -> bool {
        self.set_availability(id, true)
    }

    fn set_availability(&mut self, id: &str, available: bool) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id().matches(id)) else {
            return false;
        };
        item.set_available(available);

        // A failed write leaves the in-memory state authoritative.
        if let Err(e) = self.store.persist(item) {
            tracing::warn!(item = %item.id(), error = %e, "failed to persist availability");
        }
        true
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog").field("items", &self.items).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ItemId;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingStore {
        writes: Arc<Mutex<Vec<(String, bool)>>>,
    }

    impl ItemStore for RecordingStore {
        fn persist(&mut self, item: &Item) -> Result<(), LedgerError> {
            self.writes
                .lock()
                .unwrap()
                .push((item.id().to_string(), item.is_available()));
            Ok(())
        }
    }

    struct FailingStore;

    impl ItemStore for FailingStore {
        fn persist(&mut self, _item: &Item) -> Result<(), LedgerError> {
            Err(LedgerError::Persistence("read-only".into()))
        }
    }

    fn sample() -> Catalog {
        Catalog::with_items([
            Item::sports_equipment("E001", "Professional Tennis Racket", dec!(15.0), dec!(12.5), "Racket").unwrap(),
            Item::sports_equipment("E002", "Mountain Bike", dec!(25.0), dec!(18.0), "Bicycle").unwrap(),
            Item::training_gear("T001", "Balance Board", dec!(8.0), "Beginner", "All Ages").unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn find_ignores_case() {
        let catalog = sample();
        assert_eq!(catalog.find("e002").unwrap().name(), "Mountain Bike");
        assert!(catalog.find("E999").is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut catalog = sample();
        let dup = Item::training_gear("t001", "Other Board", dec!(5.0), "Advanced", "Adult").unwrap();
        assert_eq!(
            catalog.add(dup),
            Err(LedgerError::DuplicateItem(ItemId::new("t001")))
        );
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn list_available_keeps_insertion_order() {
        let mut catalog = sample();
        assert!(catalog.mark_unavailable("E002"));

        let ids: Vec<_> = catalog.list_available().map(|i| i.id().to_string()).collect();
        assert_eq!(ids, ["E001", "T001"]);

        assert!(catalog.mark_available("e002"));
        let ids: Vec<_> = catalog.list_available().map(|i| i.id().to_string()).collect();
        assert_eq!(ids, ["E001", "E002", "T001"]);
    }

    #[test]
    fn marking_unknown_id_is_a_no_op() {
        let mut catalog = sample();
        assert!(!catalog.mark_unavailable("nope"));
        assert!(!catalog.mark_available("nope"));
        assert_eq!(catalog.list_available().count(), 3);
    }

    #[test]
    fn search_matches_name_and_author() {
        let catalog = Catalog::with_items([
            Item::fiction_book("111", "Dune", "Frank Herbert", "Science Fiction"),
            Item::non_fiction_book("222", "Gödel, Escher, Bach", "Douglas Hofstadter", "Mathematics"),
        ])
        .unwrap();

        let by_title: Vec<_> = catalog.search("DUNE").collect();
        assert_eq!(by_title.len(), 1);
        let by_author: Vec<_> = catalog.search("hofstadter").collect();
        assert_eq!(by_author[0].id().as_str(), "222");
        assert_eq!(catalog.search("tolkien").count(), 0);
    }

    #[test]
    fn store_sees_adds_and_availability_changes() {
        let store = RecordingStore::default();
        let mut catalog = Catalog::new().with_store(store.clone());
        catalog
            .add(Item::sail("S001", "Cruiser", dec!(10.0), dec!(6.5), "Standard").unwrap())
            .unwrap();
        catalog.mark_unavailable("S001");
        catalog.mark_available("S001");

        let writes = store.writes.lock().unwrap().clone();
        assert_eq!(
            writes,
            [
                ("S001".to_string(), true),
                ("S001".to_string(), false),
                ("S001".to_string(), true)
            ]
        );
    }

    #[test]
    fn failed_persistence_still_catalogues_item() {
        let mut catalog = Catalog::new().with_store(FailingStore);
        let result = catalog.add(Item::fiction_book("1", "Dune", "Herbert", "Fantasy"));
        assert_eq!(result, Err(LedgerError::Persistence("read-only".into())));
        assert_eq!(catalog.len(), 1);
        assert!(catalog.mark_unavailable("1"));
        assert!(!catalog.find("1").unwrap().is_available());
    }
}
