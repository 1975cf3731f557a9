use crate::event::CalendarEvent;
use crate::storage::KeyValueStore;
use log::{debug, info};

/// Key the event collection is stored under unless configured otherwise.
pub const EVENTS_KEY: &str = "events";

/// Errors raised by the event store and its storage backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to parse stored events: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Value for key '{key}' is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge { key: String, size: u64, limit: u64 },
    #[error("Event '{0}' not found")]
    EventNotFound(String),
}

/// Persistence façade over a key-value backend.
///
/// The whole collection lives under one key as a JSON array. Every operation
/// re-reads it through [`EventStore::load`] and mutating operations write it
/// back through [`EventStore::save`]; nothing is cached in between.
#[derive(Debug)]
pub struct EventStore<S: KeyValueStore> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> EventStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, EVENTS_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the full collection. A missing key is an empty collection.
    pub fn load(&self) -> Result<Vec<CalendarEvent>, StoreError> {
        match self.storage.get_item(&self.key)? {
            Some(raw) => {
                let events: Vec<CalendarEvent> = serde_json::from_str(&raw)?;
                debug!("Loaded {} events from '{}'", events.len(), self.key);
                Ok(events)
            }
            None => {
                debug!("No stored value at '{}', starting empty", self.key);
                Ok(Vec::new())
            }
        }
    }

    /// Writes the full collection, replacing whatever was stored.
    pub fn save(&mut self, events: &[CalendarEvent]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(events)?;
        self.storage.set_item(&self.key, &raw)?;
        debug!("Saved {} events to '{}'", events.len(), self.key);
        Ok(())
    }

    pub fn get_events(&self) -> Result<Vec<CalendarEvent>, StoreError> {
        self.load()
    }

    /// First event carrying `id`, if any.
    pub fn find_event(&self, id: &str) -> Result<Option<CalendarEvent>, StoreError> {
        Ok(self.load()?.into_iter().find(|event| event.id == id))
    }

    /// Appends `event` to the end of the collection.
    pub fn add_event(&mut self, event: CalendarEvent) -> Result<(), StoreError> {
        let mut events = self.load()?;
        info!("Adding event '{}' ({})", event.title, event.id);
        events.push(event);
        self.save(&events)
    }

    /// Replaces the first event whose id matches `updated.id`.
    ///
    /// Returns [`StoreError::EventNotFound`] without writing anything when no
    /// stored event carries that id.
    pub fn update_event(&mut self, updated: CalendarEvent) -> Result<(), StoreError> {
        let mut events = self.load()?;
        let slot = events
            .iter_mut()
            .find(|event| event.id == updated.id)
            .ok_or_else(|| StoreError::EventNotFound(updated.id.clone()))?;
        info!("Updating event '{}' ({})", updated.title, updated.id);
        *slot = updated;
        self.save(&events)
    }

    /// Removes every event whose id is `event_id` and returns how many went.
    pub fn delete_event(&mut self, event_id: &str) -> Result<usize, StoreError> {
        let mut events = self.load()?;
        let before = events.len();
        events.retain(|event| event.id != event_id);
        let removed = before - events.len();
        info!("Deleting event {}: {} removed", event_id, removed);
        self.save(&events)?;
        Ok(removed)
    }

    /// Overwrites the stored collection wholesale.
    pub fn set_events(&mut self, events: &[CalendarEvent]) -> Result<(), StoreError> {
        self.save(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    fn event(id: &str, title: &str) -> CalendarEvent {
        CalendarEvent::new(id, title, "2024-02-21", "14:30", "2024-02-21", "15:30")
    }

    fn store() -> EventStore<MemoryStorage> {
        EventStore::new(MemoryStorage::new())
    }

    #[test]
    fn test_missing_key_is_empty_collection() -> Result<(), StoreError> {
        let store = store();
        assert!(store.get_events()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_add_appends_at_end() -> Result<(), StoreError> {
        let mut store = store();
        store.add_event(event("1", "First"))?;
        let before = store.get_events()?.len();

        store.add_event(event("2", "Second"))?;

        let events = store.get_events()?;
        assert_eq!(events.len(), before + 1);
        assert_eq!(events.last(), Some(&event("2", "Second")));
        Ok(())
    }

    #[test]
    fn test_stored_layout_is_json_array_under_key() -> Result<(), StoreError> {
        let mut store = store();
        store.add_event(event("1", "Review"))?;

        let raw = store.storage().get_item(EVENTS_KEY)?.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        assert!(value.is_array());
        assert_eq!(value[0]["startDay"], "2024-02-21");
        Ok(())
    }

    #[test]
    fn test_update_replaces_first_match_in_place() -> Result<(), StoreError> {
        let mut store = store();
        store.set_events(&[event("1", "A"), event("2", "B"), event("2", "B again")])?;

        store.update_event(event("2", "Renamed"))?;

        let titles: Vec<String> = store.get_events()?.into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["A", "Renamed", "B again"]);
        Ok(())
    }

    #[test]
    fn test_update_unknown_id_leaves_storage_untouched() -> Result<(), StoreError> {
        let mut store = store();
        store.set_events(&[event("1", "A")])?;
        let raw_before = store.storage().get_item(EVENTS_KEY)?;

        let result = store.update_event(event("missing", "Ghost"));

        assert!(matches!(result, Err(StoreError::EventNotFound(ref id)) if id == "missing"));
        assert_eq!(store.storage().get_item(EVENTS_KEY)?, raw_before);
        Ok(())
    }

    #[test]
    fn test_delete_removes_every_match_and_keeps_order() -> Result<(), StoreError> {
        let mut store = store();
        store.set_events(&[
            event("1", "A"),
            event("dup", "B"),
            event("2", "C"),
            event("dup", "D"),
            event("3", "E"),
        ])?;

        let removed = store.delete_event("dup")?;

        assert_eq!(removed, 2);
        let ids: Vec<String> = store.get_events()?.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(store.delete_event("nope")?, 0);
        Ok(())
    }

    #[test]
    fn test_set_events_round_trip() -> Result<(), StoreError> {
        let mut store = store();
        let events = vec![
            event("1", "A").with_extra("color", "#3366ff"),
            event("2", "B").with_extra("description", "quarterly"),
        ];
        store.set_events(&events)?;
        assert_eq!(store.get_events()?, events);

        store.set_events(&[])?;
        assert!(store.get_events()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_malformed_json_propagates_parse_error() -> Result<(), StoreError> {
        let mut storage = MemoryStorage::new();
        storage.set_item(EVENTS_KEY, "{not json")?;
        let mut store = EventStore::new(storage);

        assert!(matches!(store.get_events(), Err(StoreError::Parse(_))));
        assert!(matches!(store.add_event(event("1", "A")), Err(StoreError::Parse(_))));
        assert!(matches!(store.delete_event("1"), Err(StoreError::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_non_array_json_is_a_parse_error() -> Result<(), StoreError> {
        let mut storage = MemoryStorage::new();
        storage.set_item(EVENTS_KEY, r#"{"id":"1"}"#)?;
        let store = EventStore::new(storage);
        assert!(matches!(store.get_events(), Err(StoreError::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_custom_key_is_isolated() -> Result<(), StoreError> {
        let mut store = EventStore::with_key(MemoryStorage::new(), "work-events");
        store.add_event(event("1", "A"))?;
        assert_eq!(store.storage().get_item(EVENTS_KEY)?, None);
        assert!(store.storage().get_item("work-events")?.is_some());
        Ok(())
    }

    #[test]
    fn test_find_event() -> Result<(), StoreError> {
        let mut store = store();
        store.set_events(&[event("1", "A"), event("2", "B")])?;
        assert_eq!(store.find_event("2")?.map(|e| e.title), Some("B".to_string()));
        assert_eq!(store.find_event("9")?, None);
        Ok(())
    }
}
