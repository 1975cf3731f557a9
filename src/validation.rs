//! Field validators for the event-creation form.
//!
//! Each field has a fixed list of rules evaluated in order; the first failing
//! rule produces the field's error. Fields are validated independently of each
//! other, so one bad field never hides problems with another.

use crate::event::EventForm;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Strict 24-hour `HH:MM`, ASCII digits only
pub const TIME_PATTERN: &str = r"^([01][0-9]|2[0-3]):[0-5][0-9]$";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub const INVALID_DATE_MESSAGE: &str = "Invalid calendar date (YYYY-MM-DD)";
pub const END_DATE_BEFORE_START_MESSAGE: &str = "End date must be equal to or after start date";
pub const TIME_FORMAT_MESSAGE: &str = "Time must be in HH:MM format";
pub const END_TIME_BEFORE_START_MESSAGE: &str = "End time must be after start time";

static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(TIME_PATTERN).unwrap());
static DATE_SHAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

/// Form fields that carry validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    StartDay,
    EndDay,
    StartTime,
    EndTime,
}

impl Field {
    pub const ALL: [Field; 5] =
        [Field::Title, Field::StartDay, Field::EndDay, Field::StartTime, Field::EndTime];

    /// Name the form uses for the field
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::StartDay => "startDay",
            Field::EndDay => "endDay",
            Field::StartTime => "startTime",
            Field::EndTime => "endTime",
        }
    }

    fn rules(self) -> &'static [Rule] {
        match self {
            Field::Title => &[Rule::Required],
            Field::StartDay => &[Rule::Required, Rule::ValidDate],
            Field::EndDay => &[Rule::Required, Rule::ValidDate, Rule::EndDateAfterStart],
            Field::StartTime => &[Rule::Required, Rule::TimeFormat],
            Field::EndTime => &[Rule::Required, Rule::TimeFormat, Rule::EndTimeAfterStart],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Required,
    ValidDate,
    EndDateAfterStart,
    TimeFormat,
    EndTimeAfterStart,
}

/// A failed rule, attached to the field it was evaluated against
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl ValidationError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// Validates `value` as the content of `field`, reading sibling values from `form`.
///
/// `value` takes precedence over whatever `form` holds for `field` itself, so a
/// candidate value can be checked before it is written into the form.
pub fn validate(field: Field, value: Option<&str>, form: &EventForm) -> Result<(), ValidationError> {
    let value = value.filter(|v| !v.is_empty());
    for rule in field.rules() {
        let passed = match rule {
            Rule::Required => value.is_some(),
            Rule::ValidDate => value.is_some_and(is_valid_date),
            Rule::EndDateAfterStart => is_end_after_start_date(value, form.get(Field::StartDay)),
            Rule::TimeFormat => value.is_some_and(is_valid_time),
            Rule::EndTimeAfterStart => is_end_time_after_start_time(
                value,
                form.get(Field::StartTime),
                form.get(Field::StartDay),
                form.get(Field::EndDay),
            ),
        };
        if !passed {
            return Err(ValidationError::new(field, rule_message(field, *rule)));
        }
    }
    Ok(())
}

/// Runs every field's rules and returns all failures, in field order.
pub fn validate_form(form: &EventForm) -> Vec<ValidationError> {
    let errors: Vec<ValidationError> = Field::ALL
        .iter()
        .filter_map(|&field| validate(field, form.get(field), form).err())
        .collect();
    if !errors.is_empty() {
        log::debug!("Form failed validation on {} field(s)", errors.len());
    }
    errors
}

fn rule_message(field: Field, rule: Rule) -> String {
    match rule {
        Rule::Required => format!("{} is a required field", field),
        Rule::ValidDate => INVALID_DATE_MESSAGE.to_string(),
        Rule::EndDateAfterStart => END_DATE_BEFORE_START_MESSAGE.to_string(),
        Rule::TimeFormat => TIME_FORMAT_MESSAGE.to_string(),
        Rule::EndTimeAfterStart => END_TIME_BEFORE_START_MESSAGE.to_string(),
    }
}

/// True if `value` is a real calendar date written exactly as `YYYY-MM-DD`.
///
/// Overflowing dates such as `2024-02-30` are rejected: they either fail to
/// parse or would not format back to the same text.
pub fn is_valid_date(value: &str) -> bool {
    if !DATE_SHAPE_RE.is_match(value) {
        return false;
    }
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => date.format(DATE_FORMAT).to_string() == value,
        Err(_) => false,
    }
}

/// Fixed-width `YYYY-MM-DD` strings order lexicographically the same way they
/// order chronologically, so no parsing is needed here.
pub fn is_end_after_start_date(end_day: Option<&str>, start_day: Option<&str>) -> bool {
    match (start_day, end_day) {
        (Some(start), Some(end)) => end >= start,
        _ => true,
    }
}

pub fn is_valid_time(value: &str) -> bool {
    TIME_RE.is_match(value)
}

/// Same-day spans only: when the days differ, or anything is missing, the
/// times are not compared.
pub fn is_end_time_after_start_time(
    end_time: Option<&str>,
    start_time: Option<&str>,
    start_day: Option<&str>,
    end_day: Option<&str>,
) -> bool {
    let (Some(start_time), Some(end_time), Some(start_day), Some(end_day)) =
        (start_time, end_time, start_day, end_day)
    else {
        return true;
    };
    if start_day != end_day {
        return true;
    }
    // NaN never compares, so an unreadable time fails the rule
    minutes_since_midnight(end_time) >= minutes_since_midnight(start_time)
}

/// Reads the first two `:`-separated components as hours and minutes; any
/// further components are ignored. A missing or non-numeric component is NaN.
fn minutes_since_midnight(time: &str) -> f64 {
    let mut parts = time.split(':').map(component_value);
    let hours = parts.next().unwrap_or(f64::NAN);
    let minutes = parts.next().unwrap_or(f64::NAN);
    hours * 60.0 + minutes
}

fn component_value(part: &str) -> f64 {
    let part = part.trim();
    if part.is_empty() {
        return 0.0;
    }
    part.parse().unwrap_or(f64::NAN)
}
