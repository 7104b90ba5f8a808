//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use lectern_core::events::{
    Audience, BookingKind, Event, EventGroup, EventStatus, GroupKind, Person, Role,
    RoleMembership, Topic,
};

/// Parse a stored UUID string.
fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Parse a stored RFC 3339 timestamp.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

fn parse_optional_datetime(s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_datetime).transpose()
}

fn invalid_enum_value(value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        Type::Text,
        format!("unrecognized stored value: {value}").into(),
    )
}

/// Format a timestamp for storage.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn format_optional_datetime(dt: &Option<DateTime<Utc>>) -> Option<String> {
    dt.as_ref().map(format_datetime)
}

// ============================================================================
// Group conversions
// ============================================================================

/// Convert a SQLite row to an EventGroup.
///
/// Expected columns: id, title, slug, description, kind, created_at, updated_at
pub fn row_to_group(row: &Row) -> rusqlite::Result<EventGroup> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let slug: String = row.get(2)?;
    let description: String = row.get(3)?;
    let kind: Option<String> = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(EventGroup {
        id: parse_uuid(&id)?,
        title,
        slug,
        description,
        kind: kind
            .as_deref()
            .map(|k| GroupKind::parse(k).ok_or_else(|| invalid_enum_value(k)))
            .transpose()?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

// ============================================================================
// Person conversions
// ============================================================================

/// Convert a SQLite row to a Person.
///
/// Expected columns: id, name, slug, bio, email, created_at, updated_at
pub fn row_to_person(row: &Row) -> rusqlite::Result<Person> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let slug: String = row.get(2)?;
    let bio: String = row.get(3)?;
    let email: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Person {
        id: parse_uuid(&id)?,
        name,
        slug,
        bio,
        email,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

// ============================================================================
// Topic conversions
// ============================================================================

/// Convert a SQLite row to a Topic.
///
/// Expected columns: id, name, uri
pub fn row_to_topic(row: &Row) -> rusqlite::Result<Topic> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let uri: String = row.get(2)?;

    Ok(Topic {
        id: parse_uuid(&id)?,
        name,
        uri,
    })
}

// ============================================================================
// Event conversions
// ============================================================================

/// Convert a SQLite row to an Event.
///
/// Expected columns: id, title, title_not_announced, slug, description,
/// start_at, end_at, audience, booking, booking_url, cost,
/// special_message, status, group_id, location, organiser, created_at,
/// updated_at
pub fn row_to_event(row: &Row) -> rusqlite::Result<Event> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let title_not_announced: bool = row.get(2)?;
    let slug: String = row.get(3)?;
    let description: String = row.get(4)?;
    let start_at: Option<String> = row.get(5)?;
    let end_at: Option<String> = row.get(6)?;
    let audience: String = row.get(7)?;
    let booking: String = row.get(8)?;
    let booking_url: Option<String> = row.get(9)?;
    let cost: Option<String> = row.get(10)?;
    let special_message: Option<String> = row.get(11)?;
    let status: String = row.get(12)?;
    let group_id: Option<String> = row.get(13)?;
    let location: Option<String> = row.get(14)?;
    let organiser: Option<String> = row.get(15)?;
    let created_at: String = row.get(16)?;
    let updated_at: String = row.get(17)?;

    Ok(Event {
        id: parse_uuid(&id)?,
        title,
        title_not_announced,
        slug,
        description,
        start: parse_optional_datetime(start_at)?,
        end: parse_optional_datetime(end_at)?,
        audience: Audience::parse(&audience).ok_or_else(|| invalid_enum_value(&audience))?,
        booking: BookingKind::parse(&booking).ok_or_else(|| invalid_enum_value(&booking))?,
        booking_url,
        cost,
        special_message,
        status: EventStatus::parse(&status).ok_or_else(|| invalid_enum_value(&status))?,
        group_id: group_id.as_deref().map(parse_uuid).transpose()?,
        location,
        organiser,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

// ============================================================================
// Membership conversions
// ============================================================================

/// Convert a JOIN row to a person with their membership.
///
/// Expected columns: the seven person columns followed by the seven
/// membership columns (id, person_id, event_id, role, affiliation, url,
/// created_at).
pub fn row_to_participant(row: &Row) -> rusqlite::Result<(Person, RoleMembership)> {
    let person = row_to_person(row)?;

    let id: String = row.get(7)?;
    let person_id: String = row.get(8)?;
    let event_id: String = row.get(9)?;
    let role: String = row.get(10)?;
    let affiliation: String = row.get(11)?;
    let url: Option<String> = row.get(12)?;
    let created_at: String = row.get(13)?;

    let membership = RoleMembership {
        id: parse_uuid(&id)?,
        person_id: parse_uuid(&person_id)?,
        event_id: parse_uuid(&event_id)?,
        role: Role::parse(&role).ok_or_else(|| invalid_enum_value(&role))?,
        affiliation,
        url,
        created_at: parse_datetime(&created_at)?,
    };

    Ok((person, membership))
}
