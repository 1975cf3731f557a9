//! Calendar event types shared by the store, the validators and the terminal front end.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A persisted calendar event.
///
/// Field names serialize in camelCase (`startDay`, `endTime`, ...) so the stored
/// JSON keeps the layout existing collections already use. Any other display
/// fields (colour, description, ...) are carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start_day: String,
    pub end_day: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CalendarEvent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_day: impl Into<String>,
        start_time: impl Into<String>,
        end_day: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_day: start_day.into(),
            end_day: end_day.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            extra: Map::new(),
        }
    }

    /// Builds an event from a form that has already passed validation.
    ///
    /// Missing form values become empty strings; callers are expected to run
    /// `validate_form` first.
    pub fn from_form(id: impl Into<String>, form: &EventForm) -> Self {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            id: id.into(),
            title: field(&form.title),
            start_day: field(&form.start_day),
            end_day: field(&form.end_day),
            start_time: field(&form.start_time),
            end_time: field(&form.end_time),
            extra: Map::new(),
        }
    }

    /// Attach an extra display field, e.g. `color`.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// One-line summary used by the terminal listing.
    pub fn summary(&self) -> String {
        if self.start_day == self.end_day {
            format!(
                "{} {} {}-{} ({})",
                self.start_day, self.title, self.start_time, self.end_time, self.id
            )
        } else {
            format!(
                "{} {} -> {} {} {} ({})",
                self.start_day, self.start_time, self.end_day, self.end_time, self.title, self.id
            )
        }
    }
}

/// Values of the event-creation form, one per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventForm {
    pub title: Option<String>,
    pub start_day: Option<String>,
    pub end_day: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl EventForm {
    pub fn new(
        title: &str,
        start_day: &str,
        start_time: &str,
        end_day: &str,
        end_time: &str,
    ) -> Self {
        Self {
            title: non_empty(title),
            start_day: non_empty(start_day),
            end_day: non_empty(end_day),
            start_time: non_empty(start_time),
            end_time: non_empty(end_time),
        }
    }

    /// Pre-fills the form from a stored event, as the edit dialog does.
    pub fn from_event(event: &CalendarEvent) -> Self {
        Self::new(
            &event.title,
            &event.start_day,
            &event.start_time,
            &event.end_day,
            &event.end_time,
        )
    }

    /// Value of a field, treating empty strings as absent.
    pub fn get(&self, field: crate::validation::Field) -> Option<&str> {
        use crate::validation::Field;
        let value = match field {
            Field::Title => &self.title,
            Field::StartDay => &self.start_day,
            Field::EndDay => &self.end_day,
            Field::StartTime => &self.start_time,
            Field::EndTime => &self.end_time,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
