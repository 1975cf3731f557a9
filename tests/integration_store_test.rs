use anyhow::Result;
use calstash::{CalendarEvent, EventForm, EventStore, FileStorage, KeyValueStore, StoreError, validate_form};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn event(id: &str, title: &str, day: &str) -> CalendarEvent {
    CalendarEvent::new(id, title, day, "09:00", day, "10:00")
}

#[test]
fn integration_test_crud_sequence_on_disk() -> Result<()> {
    let temp_dir = tempdir()?;
    let mut store = EventStore::new(FileStorage::open(temp_dir.path())?);

    store.add_event(event("1", "Planning", "2024-01-08"))?;
    store.add_event(event("2", "Retro", "2024-01-12"))?;
    store.add_event(event("3", "Demo", "2024-01-12"))?;
    store.update_event(event("2", "Retrospective", "2024-01-12"))?;
    store.delete_event("1")?;

    // Every operation re-reads from disk, so a second handle agrees
    let other = EventStore::new(FileStorage::open(temp_dir.path())?);
    let titles: Vec<String> = other.get_events()?.into_iter().map(|e| e.title).collect();
    assert_eq!(titles, vec!["Retrospective", "Demo"]);
    Ok(())
}

#[test]
fn integration_test_external_edits_are_seen() -> Result<()> {
    let temp_dir = tempdir()?;
    let mut writer = EventStore::new(FileStorage::open(temp_dir.path())?);
    let reader = EventStore::new(FileStorage::open(temp_dir.path())?);

    assert!(reader.get_events()?.is_empty());
    writer.set_events(&[event("a", "Standup", "2024-02-01")])?;
    assert_eq!(reader.get_events()?.len(), 1);
    Ok(())
}

#[test]
fn integration_test_corrupt_file_surfaces_parse_error() -> Result<()> {
    let temp_dir = tempdir()?;
    std::fs::write(temp_dir.path().join("events.json"), "[{\"id\": ")?;
    let mut store = EventStore::new(FileStorage::open(temp_dir.path())?);

    match store.add_event(event("1", "A", "2024-01-01")) {
        Err(StoreError::Parse(_)) => (),
        other => panic!("Expected parse error, got {:?}", other),
    }
    // Nothing was written over the corrupt value
    assert_eq!(store.storage().get_item("events")?.as_deref(), Some("[{\"id\": "));
    Ok(())
}

#[test]
fn integration_test_validated_form_round_trips_through_store() -> Result<()> {
    let temp_dir = tempdir()?;
    let mut store = EventStore::new(FileStorage::open(temp_dir.path())?);

    let form = EventForm::new("Offsite", "2024-06-03", "17:00", "2024-06-04", "08:00");
    assert!(validate_form(&form).is_empty());

    let created = CalendarEvent::from_form("offsite", &form);
    store.add_event(created.clone())?;
    assert_eq!(store.get_events()?, vec![created]);
    Ok(())
}
