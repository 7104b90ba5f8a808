//! SQLite repository implementation.
//!
//! Implements the repository traits from `lectern_core::storage` using SQLite.

use async_trait::async_trait;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use lectern_core::events::{
    Event, EventGroup, Person, RoleMembership, TaggableKind, Topic, TopicItem,
};
use lectern_core::storage::{
    EventRepository, GroupRepository, MembershipRepository, PersonRepository, RepositoryError,
    Result, TopicRepository,
};

use super::conversions::{
    format_datetime, format_optional_datetime, row_to_event, row_to_group, row_to_participant,
    row_to_person, row_to_topic,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for all entity types.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

// ============================================================================
// EventRepository implementation
// ============================================================================

#[async_trait]
impl EventRepository for SqliteRepository {
    async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_EVENT_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_event) {
                    Ok(event) => Ok(Some(event)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Event", id.to_string()))
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_ALL_EVENTS).map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_event).map_err(wrap_err)?;

                let mut events = Vec::new();
                for row_result in rows {
                    events.push(row_result.map_err(wrap_err)?);
                }
                Ok(events)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Event"))
    }

    async fn get_events_by_group(&self, group_id: Uuid) -> Result<Vec<Event>> {
        let group_id_str = group_id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_EVENTS_BY_GROUP)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([&group_id_str], row_to_event)
                    .map_err(wrap_err)?;

                let mut events = Vec::new();
                for row_result in rows {
                    events.push(row_result.map_err(wrap_err)?);
                }
                Ok(events)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Event"))
    }

    async fn create_event(&self, event: &Event) -> Result<()> {
        let id = event.id.to_string();
        let title = event.title.clone();
        let title_not_announced = event.title_not_announced;
        let slug = event.slug.clone();
        let description = event.description.clone();
        let start_at = format_optional_datetime(&event.start);
        let end_at = format_optional_datetime(&event.end);
        let audience = event.audience.as_str();
        let booking = event.booking.as_str();
        let booking_url = event.booking_url.clone();
        let cost = event.cost.clone();
        let special_message = event.special_message.clone();
        let status = event.status.as_str();
        let group_id = event.group_id.map(|g| g.to_string());
        let location = event.location.clone();
        let organiser = event.organiser.clone();
        let created_at = format_datetime(&event.created_at);
        let updated_at = format_datetime(&event.updated_at);
        let event_id = event.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_EVENT,
                    rusqlite::params![
                        id,
                        title,
                        title_not_announced,
                        slug,
                        description,
                        start_at,
                        end_at,
                        audience,
                        booking,
                        booking_url,
                        cost,
                        special_message,
                        status,
                        group_id,
                        location,
                        organiser,
                        created_at,
                        updated_at
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Event", event_id))
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let id = event.id.to_string();
        let title = event.title.clone();
        let title_not_announced = event.title_not_announced;
        let description = event.description.clone();
        let start_at = format_optional_datetime(&event.start);
        let end_at = format_optional_datetime(&event.end);
        let audience = event.audience.as_str();
        let booking = event.booking.as_str();
        let booking_url = event.booking_url.clone();
        let cost = event.cost.clone();
        let special_message = event.special_message.clone();
        let status = event.status.as_str();
        let group_id = event.group_id.map(|g| g.to_string());
        let location = event.location.clone();
        let organiser = event.organiser.clone();
        let updated_at = format_datetime(&event.updated_at);
        let event_id = event.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_EVENT,
                        rusqlite::params![
                            id,
                            title,
                            title_not_announced,
                            description,
                            start_at,
                            end_at,
                            audience,
                            booking,
                            booking_url,
                            cost,
                            special_message,
                            status,
                            group_id,
                            location,
                            organiser,
                            updated_at
                        ],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Event", event_id))
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        let event_id = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_EVENT, [&id_str])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Event", event_id))
    }
}

// ============================================================================
// GroupRepository implementation
// ============================================================================

#[async_trait]
impl GroupRepository for SqliteRepository {
    async fn get_group(&self, id: Uuid) -> Result<Option<EventGroup>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_GROUP_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_group) {
                    Ok(group) => Ok(Some(group)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "EventGroup", id.to_string()))
    }

    async fn list_groups(&self) -> Result<Vec<EventGroup>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_ALL_GROUPS).map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_group).map_err(wrap_err)?;

                let mut groups = Vec::new();
                for row_result in rows {
                    groups.push(row_result.map_err(wrap_err)?);
                }
                Ok(groups)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "EventGroup"))
    }

    async fn create_group(&self, group: &EventGroup) -> Result<()> {
        let id = group.id.to_string();
        let title = group.title.clone();
        let slug = group.slug.clone();
        let description = group.description.clone();
        let kind = group.kind.map(|k| k.as_str());
        let created_at = format_datetime(&group.created_at);
        let updated_at = format_datetime(&group.updated_at);
        let group_id = group.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_GROUP,
                    rusqlite::params![id, title, slug, description, kind, created_at, updated_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "EventGroup", group_id))
    }

    async fn delete_group(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        let group_id = id.to_string();

        self.conn
            .call(move |conn| {
                // Events outlive their group: clear the reference first,
                // then drop the group row.
                conn.execute(schema::CLEAR_GROUP_FROM_EVENTS, [&id_str])
                    .map_err(wrap_err)?;
                let rows = conn
                    .execute(schema::DELETE_GROUP, [&id_str])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "EventGroup", group_id))
    }
}

// ============================================================================
// PersonRepository implementation
// ============================================================================

#[async_trait]
impl PersonRepository for SqliteRepository {
    async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_PERSON_BY_ID)
                    .map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_person) {
                    Ok(person) => Ok(Some(person)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Person", id.to_string()))
    }

    async fn list_persons(&self) -> Result<Vec<Person>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_ALL_PERSONS).map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_person).map_err(wrap_err)?;

                let mut persons = Vec::new();
                for row_result in rows {
                    persons.push(row_result.map_err(wrap_err)?);
                }
                Ok(persons)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Person"))
    }

    async fn suggest_persons(&self, query: &str) -> Result<Vec<Person>> {
        let query = query.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SUGGEST_PERSONS).map_err(wrap_err)?;
                let rows = stmt.query_map([&query], row_to_person).map_err(wrap_err)?;

                let mut persons = Vec::new();
                for row_result in rows {
                    persons.push(row_result.map_err(wrap_err)?);
                }
                Ok(persons)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Person"))
    }

    async fn create_person(&self, person: &Person) -> Result<()> {
        let id = person.id.to_string();
        let name = person.name.clone();
        let slug = person.slug.clone();
        let bio = person.bio.clone();
        let email = person.email.clone();
        let created_at = format_datetime(&person.created_at);
        let updated_at = format_datetime(&person.updated_at);
        let person_id = person.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_PERSON,
                    rusqlite::params![id, name, slug, bio, email, created_at, updated_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Person", person_id))
    }
}

// ============================================================================
// TopicRepository implementation
// ============================================================================

#[async_trait]
impl TopicRepository for SqliteRepository {
    async fn get_topic(&self, id: Uuid) -> Result<Option<Topic>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_TOPIC_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_topic) {
                    Ok(topic) => Ok(Some(topic)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Topic", id.to_string()))
    }

    async fn get_topic_by_uri(&self, uri: &str) -> Result<Option<Topic>> {
        let uri = uri.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_TOPIC_BY_URI)
                    .map_err(wrap_err)?;
                match stmt.query_row([&uri], row_to_topic) {
                    Ok(topic) => Ok(Some(topic)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Topic"))
    }

    async fn get_or_create_topic(&self, uri: &str) -> Result<Topic> {
        let topic = Topic::pending(uri);
        let id = topic.id.to_string();
        let name = topic.name.clone();
        let uri_param = topic.uri.clone();

        let inserted = self
            .conn
            .call(move |conn| {
                conn.execute(schema::INSERT_TOPIC, rusqlite::params![id, name, uri_param])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await;

        match inserted {
            Ok(()) => Ok(topic),
            Err(err) => {
                let mapped = map_tokio_rusqlite_error_with_id(err, "Topic", uri);
                if matches!(mapped, RepositoryError::AlreadyExists { .. }) {
                    // Lost the race (or the topic predates this call):
                    // the UNIQUE(uri) constraint makes this idempotent,
                    // so fetch the winning row.
                    self.get_topic_by_uri(uri).await?.ok_or(mapped)
                } else {
                    Err(mapped)
                }
            }
        }
    }

    async fn set_topic_name(&self, id: Uuid, name: &str) -> Result<()> {
        let id_str = id.to_string();
        let name = name.to_string();
        let topic_id = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::UPDATE_TOPIC_NAME, rusqlite::params![id_str, name])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Topic", topic_id))
    }

    async fn tag_item(&self, item: &TopicItem) -> Result<()> {
        let id = item.id.to_string();
        let topic_id = item.topic_id.to_string();
        let item_kind = item.item_kind.as_str();
        let item_id = item.item_id.to_string();
        let created_at = format_datetime(&item.created_at);
        let association_id = item.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_TOPIC_ITEM,
                    rusqlite::params![id, topic_id, item_kind, item_id, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "TopicItem", association_id))
    }

    async fn get_topics_for_item(&self, kind: TaggableKind, item_id: Uuid) -> Result<Vec<Topic>> {
        let kind_str = kind.as_str();
        let item_id_str = item_id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_TOPICS_FOR_ITEM)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([kind_str, &item_id_str], row_to_topic)
                    .map_err(wrap_err)?;

                let mut topics = Vec::new();
                for row_result in rows {
                    topics.push(row_result.map_err(wrap_err)?);
                }
                Ok(topics)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Topic"))
    }
}

// ============================================================================
// MembershipRepository implementation
// ============================================================================

#[async_trait]
impl MembershipRepository for SqliteRepository {
    async fn create_membership(&self, membership: &RoleMembership) -> Result<()> {
        let id = membership.id.to_string();
        let person_id = membership.person_id.to_string();
        let event_id = membership.event_id.to_string();
        let role = membership.role.as_str();
        let affiliation = membership.affiliation.clone();
        let url = membership.url.clone();
        let created_at = format_datetime(&membership.created_at);
        let membership_id = membership.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_MEMBERSHIP,
                    rusqlite::params![id, person_id, event_id, role, affiliation, url, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "RoleMembership", membership_id))
    }

    async fn get_participants(&self, event_id: Uuid) -> Result<Vec<(Person, RoleMembership)>> {
        let event_id_str = event_id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_PARTICIPANTS_FOR_EVENT)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([&event_id_str], row_to_participant)
                    .map_err(wrap_err)?;

                let mut participants = Vec::new();
                for row_result in rows {
                    participants.push(row_result.map_err(wrap_err)?);
                }
                Ok(participants)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "RoleMembership"))
    }
}
