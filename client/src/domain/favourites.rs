//! Favourites slice.
//!
//! The list is unique by [`EntryId`]. Every event preserves that, so callers
//! never need to de-duplicate.

use super::entry::{Destination, EntryId};
use super::lifecycle::Lifecycle;

/// Events accepted by the favourites slice.
#[derive(Debug, Clone, PartialEq)]
pub enum FavouritesEvent {
    /// Replace the list wholesale. Later duplicates are dropped.
    SetAll(Vec<Destination>),
    /// Append unless an entry with the same id is present.
    Add(Destination),
    /// Drop the entry with this id, if any.
    Remove(EntryId),
    /// Remove when present, append otherwise.
    Toggle(Destination),
    /// Launch-time load from persistent storage.
    Load(Lifecycle<Vec<Destination>>),
}

/// In-memory cache of the persisted favourites.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FavouritesSlice {
    favourites: Vec<Destination>,
    loading: bool,
}

impl FavouritesSlice {
    /// Favourites in insertion order.
    pub fn items(&self) -> &[Destination] {
        &self.favourites
    }

    /// Whether an entry with `id` is a favourite.
    pub fn contains(&self, id: EntryId) -> bool {
        self.favourites.iter().any(|entry| entry.id == id)
    }

    /// Identifiers in insertion order.
    pub fn ids(&self) -> Vec<EntryId> {
        self.favourites.iter().map(|entry| entry.id).collect()
    }

    /// Whether a load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Apply one event. Total over every event and state.
    pub fn apply(&mut self, event: FavouritesEvent) {
        match event {
            FavouritesEvent::SetAll(list) => self.favourites = dedup(list),
            FavouritesEvent::Add(entry) => {
                if !self.contains(entry.id) {
                    self.favourites.push(entry);
                }
            }
            FavouritesEvent::Remove(id) => self.favourites.retain(|entry| entry.id != id),
            FavouritesEvent::Toggle(entry) => {
                if self.contains(entry.id) {
                    self.favourites.retain(|existing| existing.id != entry.id);
                } else {
                    self.favourites.push(entry);
                }
            }
            FavouritesEvent::Load(Lifecycle::Pending) => self.loading = true,
            FavouritesEvent::Load(Lifecycle::Fulfilled(list)) => {
                self.loading = false;
                self.favourites = dedup(list);
            }
            FavouritesEvent::Load(Lifecycle::Rejected(_)) => self.loading = false,
        }
    }
}

fn dedup(list: Vec<Destination>) -> Vec<Destination> {
    let mut unique: Vec<Destination> = Vec::with_capacity(list.len());
    for entry in list {
        if !unique.iter().any(|kept| kept.id == entry.id) {
            unique.push(entry);
        }
    }
    unique
}
