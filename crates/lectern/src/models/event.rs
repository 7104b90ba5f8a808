use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lectern_core::events::{
    Audience, BookingKind, Event, EventStatus, Person, Topic, ValidationError,
};
use lectern_core::lookup::Resource;
use lectern_core::serde::{
    deserialize_checkbox, deserialize_optional_datetime, deserialize_optional_string,
    deserialize_optional_uuid,
};

/// Server-side request payload for the event submission form.
///
/// Speakers and topics arrive as comma-separated opaque tokens posted by
/// the form widgets: person ids for speakers, canonical URIs for topics.
#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_checkbox")]
    pub title_not_announced: bool,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub audience: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub booking: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub booking_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub cost: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub special_message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub group_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub organiser: Option<String>,
    /// Comma-separated person ids.
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub speakers: Option<String>,
    /// Comma-separated topic URIs.
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub topics: Option<String>,
}

/// Splits a comma-separated token list, trimming whitespace and dropping
/// empty segments.
fn split_tokens(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl CreateEvent {
    /// Parses the submitted speaker tokens as person ids.
    pub fn speaker_ids(&self) -> Result<Vec<Uuid>, ValidationError> {
        split_tokens(self.speakers.as_deref())
            .into_iter()
            .map(|token| {
                Uuid::parse_str(&token).map_err(|_| ValidationError::Field {
                    field: "speakers",
                    message: token,
                })
            })
            .collect()
    }

    /// The submitted topic URIs.
    pub fn topic_uris(&self) -> Vec<String> {
        split_tokens(self.topics.as_deref())
    }

    /// Validates the payload and converts it into an event.
    ///
    /// At least one of a non-empty title or the not-announced flag must
    /// be present; a title alongside the flag is tolerated and the title
    /// wins for display and slug purposes.
    pub fn into_event(self) -> Result<Event, ValidationError> {
        let title = self.title.unwrap_or_default();
        if title.is_empty() && !self.title_not_announced {
            return Err(ValidationError::TitleMissing);
        }

        let mut event = if title.is_empty() {
            Event::announced_later()
        } else {
            Event::new(title)
        };
        event.title_not_announced = self.title_not_announced;
        event.description = self.description.unwrap_or_default();
        event.start = self.start;
        event.end = self.end;
        if let Some(audience) = self.audience {
            event.audience = Audience::parse(&audience).ok_or(ValidationError::Field {
                field: "audience",
                message: audience,
            })?;
        }
        if let Some(booking) = self.booking {
            event.booking = BookingKind::parse(&booking).ok_or(ValidationError::Field {
                field: "booking",
                message: booking,
            })?;
        }
        if let Some(status) = self.status {
            event.status = EventStatus::parse(&status).ok_or(ValidationError::Field {
                field: "status",
                message: status,
            })?;
        }
        event.booking_url = self.booking_url;
        event.cost = self.cost;
        event.special_message = self.special_message;
        event.group_id = self.group_id;
        event.location = self.location;
        event.organiser = self.organiser;

        Ok(event)
    }
}

/// Server-side request payload for updating an event.
#[derive(Debug, Deserialize)]
pub struct UpdateEvent {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub audience: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub booking: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub booking_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub cost: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub special_message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub group_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub organiser: Option<String>,
}

impl UpdateEvent {
    /// Applies the update to an existing event.
    ///
    /// The slug is never recomputed here: it was assigned from the title
    /// at creation and retitling must not move published URLs.
    pub fn apply_to(self, event: &mut Event) -> Result<(), ValidationError> {
        event.updated_at = Utc::now();

        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(start) = self.start {
            event.start = Some(start);
        }
        if let Some(end) = self.end {
            event.end = Some(end);
        }
        if let Some(audience) = self.audience {
            event.audience = Audience::parse(&audience).ok_or(ValidationError::Field {
                field: "audience",
                message: audience,
            })?;
        }
        if let Some(booking) = self.booking {
            event.booking = BookingKind::parse(&booking).ok_or(ValidationError::Field {
                field: "booking",
                message: booking,
            })?;
        }
        if let Some(status) = self.status {
            event.status = EventStatus::parse(&status).ok_or(ValidationError::Field {
                field: "status",
                message: status,
            })?;
        }
        if let Some(booking_url) = self.booking_url {
            event.booking_url = Some(booking_url);
        }
        if let Some(cost) = self.cost {
            event.cost = Some(cost);
        }
        if let Some(special_message) = self.special_message {
            event.special_message = Some(special_message);
        }
        if let Some(group_id) = self.group_id {
            event.group_id = Some(group_id);
        }
        if let Some(location) = self.location {
            event.location = Some(location);
        }
        if let Some(organiser) = self.organiser {
            event.organiser = Some(organiser);
        }

        Ok(())
    }
}

/// Full event representation returned by the detail endpoint: the event
/// row plus its derived role views, topics and lookup enrichment.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub speakers: Vec<Person>,
    pub hosts: Vec<Person>,
    pub organizers: Vec<Person>,
    pub topics: Vec<Topic>,
    pub happening_today: bool,
    /// Lookup enrichment; absent when the reference is unset or the
    /// lookup service was unavailable.
    pub venue: Option<Resource>,
    pub organiser_details: Option<Resource>,
    pub date_details: Option<Resource>,
}
