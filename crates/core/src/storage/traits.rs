use async_trait::async_trait;
use uuid::Uuid;

use crate::events::{
    Event, EventGroup, Person, RoleMembership, TaggableKind, Topic, TopicItem,
};

use super::Result;

/// Repository for event operations.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Gets an event by its ID.
    async fn get_event(&self, id: Uuid) -> Result<Option<Event>>;

    /// Gets all events, newest start first, unscheduled events last.
    async fn list_events(&self) -> Result<Vec<Event>>;

    /// Gets the events belonging to a group.
    async fn get_events_by_group(&self, group_id: Uuid) -> Result<Vec<Event>>;

    /// Creates a new event.
    async fn create_event(&self, event: &Event) -> Result<()>;

    /// Updates an existing event. The slug column is deliberately left
    /// out of the update; it is written once at creation.
    async fn update_event(&self, event: &Event) -> Result<()>;

    /// Deletes an event by its ID.
    async fn delete_event(&self, id: Uuid) -> Result<()>;
}

/// Repository for event group operations.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Gets a group by its ID.
    async fn get_group(&self, id: Uuid) -> Result<Option<EventGroup>>;

    /// Gets all groups.
    async fn list_groups(&self) -> Result<Vec<EventGroup>>;

    /// Creates a new group.
    async fn create_group(&self, group: &EventGroup) -> Result<()>;

    /// Deletes a group. Events keep existing with their group reference
    /// cleared; there is no cascade.
    async fn delete_group(&self, id: Uuid) -> Result<()>;
}

/// Repository for person operations.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Gets a person by their ID.
    async fn get_person(&self, id: Uuid) -> Result<Option<Person>>;

    /// Gets all persons.
    async fn list_persons(&self) -> Result<Vec<Person>>;

    /// Case-insensitive substring search over names, for typeahead
    /// suggestions.
    async fn suggest_persons(&self, query: &str) -> Result<Vec<Person>>;

    /// Creates a new person.
    async fn create_person(&self, person: &Person) -> Result<()>;
}

/// Repository for topics and their associations to taggable entities.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Gets a topic by its ID.
    async fn get_topic(&self, id: Uuid) -> Result<Option<Topic>>;

    /// Gets a topic by its canonical URI.
    async fn get_topic_by_uri(&self, uri: &str) -> Result<Option<Topic>>;

    /// Gets the existing topic for a URI, or creates one with an empty
    /// name pending population.
    ///
    /// Idempotent under concurrent callers: implementations rely on a
    /// storage-level uniqueness constraint on the URI and treat a
    /// violation as "fetch the existing row", never as an error.
    async fn get_or_create_topic(&self, uri: &str) -> Result<Topic>;

    /// Stores a freshly populated display name.
    async fn set_topic_name(&self, id: Uuid, name: &str) -> Result<()>;

    /// Inserts a topic association. No duplicate check; resubmission
    /// produces duplicate rows.
    async fn tag_item(&self, item: &TopicItem) -> Result<()>;

    /// Gets the topics attached to one taggable entity.
    async fn get_topics_for_item(&self, kind: TaggableKind, item_id: Uuid) -> Result<Vec<Topic>>;
}

/// Repository for role-tagged memberships of people on events.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Inserts a membership row. No duplicate check; resubmitting the
    /// same speaker list appends duplicate rows.
    async fn create_membership(&self, membership: &RoleMembership) -> Result<()>;

    /// Gets the membership rows for an event with their people, in row
    /// insertion order.
    async fn get_participants(&self, event_id: Uuid) -> Result<Vec<(Person, RoleMembership)>>;
}
