use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::slugify;

/// The kind of an event group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    SeminarSeries,
    Conference,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::SeminarSeries => "seminar_series",
            GroupKind::Conference => "conference",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "seminar_series" => Some(GroupKind::SeminarSeries),
            "conference" => Some(GroupKind::Conference),
            _ => None,
        }
    }
}

/// A named collection of events, such as a seminar series or a conference.
///
/// Deleting a group does not delete its events; their group reference is
/// cleared instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventGroup {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub kind: Option<GroupKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventGroup {
    /// Creates a new group with a slug derived from the title.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let title = title.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&title),
            title,
            description: description.into(),
            kind: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_kind(mut self, kind: GroupKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets a specific ID for this group (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A person who can appear on events in any role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub bio: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Creates a new person with a slug derived from the name.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
            bio: String::new(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A subject tag identified by a canonical URI.
///
/// Topics are created lazily the first time a URI is referenced; the name
/// is filled in afterwards from the lookup service and stays empty if that
/// fetch never succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    pub name: String,
    pub uri: String,
}

impl Topic {
    /// Creates a topic whose name is still pending population.
    pub fn pending(uri: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            uri: uri.into(),
        }
    }

    pub fn named(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            uri: uri.into(),
        }
    }

    /// Whether the display name has been populated yet.
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

/// The kinds of entity a topic can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggableKind {
    Event,
    EventGroup,
}

impl TaggableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaggableKind::Event => "event",
            TaggableKind::EventGroup => "event_group",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "event" => Some(TaggableKind::Event),
            "event_group" => Some(TaggableKind::EventGroup),
            _ => None,
        }
    }
}

/// Association between a topic and a taggable entity.
///
/// The target kind is an explicit discriminant over the closed set of
/// taggable kinds. There is no uniqueness constraint on the triple, so
/// repeated submissions produce duplicate rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicItem {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub item_kind: TaggableKind,
    pub item_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TopicItem {
    pub fn new(topic_id: Uuid, item_kind: TaggableKind, item_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic_id,
            item_kind,
            item_id,
            created_at: Utc::now(),
        }
    }
}

/// Classification of a person's participation in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Speaker,
    Host,
    Organizer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Speaker => "speaker",
            Role::Host => "host",
            Role::Organizer => "organizer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "speaker" => Some(Role::Speaker),
            "host" => Some(Role::Host),
            "organizer" => Some(Role::Organizer),
            _ => None,
        }
    }
}

/// One person's role on one event, with affiliation metadata.
///
/// A person may hold several roles on the same event through multiple
/// rows; no uniqueness is enforced on (person, event, role).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMembership {
    pub id: Uuid,
    pub person_id: Uuid,
    pub event_id: Uuid,
    pub role: Role,
    pub affiliation: String,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RoleMembership {
    pub fn new(person_id: Uuid, event_id: Uuid, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            person_id,
            event_id,
            role,
            affiliation: String::new(),
            url: None,
            created_at: Utc::now(),
        }
    }

    /// Shorthand for the one role the submission form can create.
    pub fn speaker(person_id: Uuid, event_id: Uuid) -> Self {
        Self::new(person_id, event_id, Role::Speaker)
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = affiliation.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Who an event is open to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Public,
    #[default]
    UniversityOnly,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Public => "public",
            Audience::UniversityOnly => "university_only",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Audience::Public),
            "university_only" => Some(Audience::UniversityOnly),
            _ => None,
        }
    }
}

/// Whether attending requires booking a place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingKind {
    #[default]
    NotRequired,
    Required,
    Recommended,
}

impl BookingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingKind::NotRequired => "not_required",
            BookingKind::Required => "required",
            BookingKind::Recommended => "recommended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_required" => Some(BookingKind::NotRequired),
            "required" => Some(BookingKind::Required),
            "recommended" => Some(BookingKind::Recommended),
            _ => None,
        }
    }
}

/// Editorial status of an event. Search only surfaces published events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    InPreparation,
    #[default]
    Published,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::InPreparation => "in_preparation",
            EventStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_preparation" => Some(EventStatus::InPreparation),
            "published" => Some(EventStatus::Published),
            _ => None,
        }
    }
}

/// A talk or similar event in the directory.
///
/// The slug is assigned exactly once, from the title at creation time;
/// later title edits never change it. Events without an announced title
/// use their id as the slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub title_not_announced: bool,
    pub slug: String,
    pub description: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub audience: Audience,
    pub booking: BookingKind,
    pub booking_url: Option<String>,
    pub cost: Option<String>,
    pub special_message: Option<String>,
    pub status: EventStatus,
    pub group_id: Option<Uuid>,
    /// Opaque place identifier resolved through the lookup gateway.
    pub location: Option<String>,
    /// Opaque organisation identifier resolved through the lookup gateway.
    pub organiser: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Creates an event with the given title, deriving the slug from it.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let id = Uuid::new_v4();
        let slug = if title.trim().is_empty() {
            id.to_string()
        } else {
            slugify(&title)
        };
        let now = Utc::now();
        Self {
            id,
            title,
            title_not_announced: false,
            slug,
            description: String::new(),
            start: None,
            end: None,
            audience: Audience::default(),
            booking: BookingKind::default(),
            booking_url: None,
            cost: None,
            special_message: None,
            status: EventStatus::default(),
            group_id: None,
            location: None,
            organiser: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an event whose title has not been announced yet.
    ///
    /// The slug falls back to the event id since there is no title to
    /// derive it from.
    pub fn announced_later() -> Self {
        let mut event = Self::new("");
        event.title_not_announced = true;
        event
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// The title to render, covering the not-announced case.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Title to be announced"
        } else {
            &self.title
        }
    }

    /// True iff the event starts on the given local calendar date.
    ///
    /// Events without a start date are never "happening"; that is a
    /// normal state, not an error.
    pub fn happening_on(&self, date: NaiveDate) -> bool {
        match self.start {
            Some(start) => start.with_timezone(&Local).date_naive() == date,
            None => false,
        }
    }

    /// True iff the event starts today in the local timezone.
    pub fn happening_today(&self) -> bool {
        self.happening_on(Local::now().date_naive())
    }

    /// Human-readable start date, or None when the start is unset.
    pub fn formatted_date(&self) -> Option<String> {
        self.start
            .map(|s| s.with_timezone(&Local).format("%A, %d %B %Y").to_string())
    }

    /// Human-readable start time, or None when the start is unset.
    pub fn formatted_time(&self) -> Option<String> {
        self.start
            .map(|s| s.with_timezone(&Local).format("%H:%M").to_string())
    }

    pub fn is_published(&self) -> bool {
        self.status == EventStatus::Published
    }
}

/// The membership rows of one event paired with their people, in row
/// insertion order.
///
/// Role views are computed by filtering the full row set at read time;
/// nothing here is denormalized or cached.
#[derive(Debug, Clone, Default)]
pub struct Participants {
    entries: Vec<(Person, RoleMembership)>,
}

impl Participants {
    pub fn new(entries: Vec<(Person, RoleMembership)>) -> Self {
        Self { entries }
    }

    /// All rows, in insertion order.
    pub fn entries(&self) -> &[(Person, RoleMembership)] {
        &self.entries
    }

    /// People holding the given role, in insertion order. A person
    /// appears once per matching row, so duplicate rows show through.
    pub fn with_role(&self, role: Role) -> Vec<&Person> {
        self.entries
            .iter()
            .filter(|(_, m)| m.role == role)
            .map(|(p, _)| p)
            .collect()
    }

    pub fn speakers(&self) -> Vec<&Person> {
        self.with_role(Role::Speaker)
    }

    pub fn hosts(&self) -> Vec<&Person> {
        self.with_role(Role::Host)
    }

    pub fn organizers(&self) -> Vec<&Person> {
        self.with_role(Role::Organizer)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn membership(person: &Person, event: &Event, role: Role) -> (Person, RoleMembership) {
        (
            person.clone(),
            RoleMembership::new(person.id, event.id, role),
        )
    }

    #[test]
    fn test_event_slug_from_title() {
        let event = Event::new("Talk A");
        assert_eq!(event.slug, "talk-a");
    }

    #[test]
    fn test_slug_not_recomputed_on_title_edit() {
        let mut event = Event::new("Talk A");
        event.title = "Talk B".to_string();
        assert_eq!(event.slug, "talk-a");
    }

    #[test]
    fn test_announced_later_uses_id_as_slug() {
        let event = Event::announced_later();
        assert!(event.title_not_announced);
        assert_eq!(event.slug, event.id.to_string());
        assert_eq!(event.display_title(), "Title to be announced");
    }

    #[test]
    fn test_happening_today_with_start_now() {
        let event = Event::new("Now").with_start(Utc::now());
        assert!(event.happening_today());
    }

    #[test]
    fn test_happening_on_other_date() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let event = Event::new("Past").with_start(start);
        assert!(!event.happening_on(NaiveDate::from_ymd_opt(2030, 6, 1).unwrap()));
    }

    #[test]
    fn test_happening_today_without_start() {
        let event = Event::new("No date");
        assert!(!event.happening_today());
        assert_eq!(event.formatted_date(), None);
        assert_eq!(event.formatted_time(), None);
    }

    #[test]
    fn test_defaults() {
        let event = Event::new("Defaults");
        assert_eq!(event.audience, Audience::UniversityOnly);
        assert_eq!(event.booking, BookingKind::NotRequired);
        assert_eq!(event.status, EventStatus::Published);
    }

    #[test]
    fn test_role_views_partition_membership_rows() {
        let event = Event::new("Panel");
        let alice = Person::new("Alice", "alice@example.com");
        let bob = Person::new("Bob", "bob@example.com");
        let carol = Person::new("Carol", "carol@example.com");

        let participants = Participants::new(vec![
            membership(&alice, &event, Role::Speaker),
            membership(&bob, &event, Role::Host),
            membership(&carol, &event, Role::Organizer),
            membership(&bob, &event, Role::Speaker),
        ]);

        let speakers = participants.speakers();
        let hosts = participants.hosts();
        let organizers = participants.organizers();

        // Union of the three views covers every row exactly once.
        assert_eq!(
            speakers.len() + hosts.len() + organizers.len(),
            participants.len()
        );
        assert_eq!(speakers.iter().map(|p| &p.name).collect::<Vec<_>>(), ["Alice", "Bob"]);
        assert_eq!(hosts.iter().map(|p| &p.name).collect::<Vec<_>>(), ["Bob"]);
        assert_eq!(organizers.iter().map(|p| &p.name).collect::<Vec<_>>(), ["Carol"]);
    }

    #[test]
    fn test_role_views_preserve_insertion_order() {
        let event = Event::new("Ordering");
        let zed = Person::new("Zed", "zed@example.com");
        let amy = Person::new("Amy", "amy@example.com");

        let participants = Participants::new(vec![
            membership(&zed, &event, Role::Speaker),
            membership(&amy, &event, Role::Speaker),
        ]);

        // Insertion order, not alphabetical.
        let names: Vec<_> = participants.speakers().iter().map(|p| &p.name).collect();
        assert_eq!(names, ["Zed", "Amy"]);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Speaker, Role::Host, Role::Organizer] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("attendee"), None);
    }

    #[test]
    fn test_topic_pending_then_named() {
        let topic = Topic::pending("http://example.org/topics/physics");
        assert!(!topic.is_named());
        let named = Topic::named("Physics", "http://example.org/topics/physics");
        assert!(named.is_named());
    }
}
