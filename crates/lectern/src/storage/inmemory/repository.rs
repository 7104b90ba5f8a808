//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use lectern_core::events::{
    Event, EventGroup, Person, RoleMembership, TaggableKind, Topic, TopicItem,
};
use lectern_core::storage::{
    EventRepository, GroupRepository, MembershipRepository, PersonRepository, RepositoryError,
    Result, TopicRepository,
};

/// In-memory storage backend for development and testing.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Memberships and topic associations are plain vectors so insertion
/// order survives, matching what the SQLite backend guarantees. Data is
/// not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
    groups: Arc<RwLock<HashMap<Uuid, EventGroup>>>,
    persons: Arc<RwLock<HashMap<Uuid, Person>>>,
    topics: Arc<RwLock<HashMap<Uuid, Topic>>>,
    topic_items: Arc<RwLock<Vec<TopicItem>>>,
    memberships: Arc<RwLock<Vec<RoleMembership>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(&id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        let mut all: Vec<Event> = events.values().cloned().collect();
        // Newest start first, unscheduled events last.
        all.sort_by(|a, b| match (b.start, a.start) {
            (Some(b_start), Some(a_start)) => b_start.cmp(&a_start),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(all)
    }

    async fn get_events_by_group(&self, group_id: Uuid) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        Ok(events
            .values()
            .filter(|e| e.group_id == Some(group_id))
            .cloned()
            .collect())
    }

    async fn create_event(&self, event: &Event) -> Result<()> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Event",
                id: event.id.to_string(),
            });
        }
        events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let mut events = self.events.write().await;
        if !events.contains_key(&event.id) {
            return Err(RepositoryError::NotFound {
                entity_type: "Event",
                id: event.id.to_string(),
            });
        }
        events.insert(event.id, event.clone());
        Ok(())
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        let mut events = self.events.write().await;
        if events.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: "Event",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryRepository {
    async fn get_group(&self, id: Uuid) -> Result<Option<EventGroup>> {
        let groups = self.groups.read().await;
        Ok(groups.get(&id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<EventGroup>> {
        let groups = self.groups.read().await;
        let mut all: Vec<EventGroup> = groups.values().cloned().collect();
        all.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(all)
    }

    async fn create_group(&self, group: &EventGroup) -> Result<()> {
        let mut groups = self.groups.write().await;
        if groups.contains_key(&group.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "EventGroup",
                id: group.id.to_string(),
            });
        }
        groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn delete_group(&self, id: Uuid) -> Result<()> {
        let mut groups = self.groups.write().await;
        if groups.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: "EventGroup",
                id: id.to_string(),
            });
        }
        drop(groups);

        // Events outlive their group; clear the dangling reference.
        let mut events = self.events.write().await;
        for event in events.values_mut() {
            if event.group_id == Some(id) {
                event.group_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PersonRepository for InMemoryRepository {
    async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
        let persons = self.persons.read().await;
        Ok(persons.get(&id).cloned())
    }

    async fn list_persons(&self) -> Result<Vec<Person>> {
        let persons = self.persons.read().await;
        let mut all: Vec<Person> = persons.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn suggest_persons(&self, query: &str) -> Result<Vec<Person>> {
        let needle = query.to_lowercase();
        let persons = self.persons.read().await;
        let mut hits: Vec<Person> = persons
            .values()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hits)
    }

    async fn create_person(&self, person: &Person) -> Result<()> {
        let mut persons = self.persons.write().await;
        if persons.contains_key(&person.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Person",
                id: person.id.to_string(),
            });
        }
        persons.insert(person.id, person.clone());
        Ok(())
    }
}

#[async_trait]
impl TopicRepository for InMemoryRepository {
    async fn get_topic(&self, id: Uuid) -> Result<Option<Topic>> {
        let topics = self.topics.read().await;
        Ok(topics.get(&id).cloned())
    }

    async fn get_topic_by_uri(&self, uri: &str) -> Result<Option<Topic>> {
        let topics = self.topics.read().await;
        Ok(topics.values().find(|t| t.uri == uri).cloned())
    }

    async fn get_or_create_topic(&self, uri: &str) -> Result<Topic> {
        // One write lock for the whole check-then-insert, standing in
        // for the UNIQUE(uri) constraint of the SQLite backend.
        let mut topics = self.topics.write().await;
        if let Some(existing) = topics.values().find(|t| t.uri == uri) {
            return Ok(existing.clone());
        }
        let topic = Topic::pending(uri);
        topics.insert(topic.id, topic.clone());
        Ok(topic)
    }

    async fn set_topic_name(&self, id: Uuid, name: &str) -> Result<()> {
        let mut topics = self.topics.write().await;
        let topic = topics.get_mut(&id).ok_or(RepositoryError::NotFound {
            entity_type: "Topic",
            id: id.to_string(),
        })?;
        topic.name = name.to_string();
        Ok(())
    }

    async fn tag_item(&self, item: &TopicItem) -> Result<()> {
        let mut topic_items = self.topic_items.write().await;
        topic_items.push(item.clone());
        Ok(())
    }

    async fn get_topics_for_item(&self, kind: TaggableKind, item_id: Uuid) -> Result<Vec<Topic>> {
        let topic_items = self.topic_items.read().await;
        let topics = self.topics.read().await;

        let mut seen = Vec::new();
        for item in topic_items
            .iter()
            .filter(|i| i.item_kind == kind && i.item_id == item_id)
        {
            if let Some(topic) = topics.get(&item.topic_id) {
                if !seen.contains(topic) {
                    seen.push(topic.clone());
                }
            }
        }
        seen.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(seen)
    }
}

#[async_trait]
impl MembershipRepository for InMemoryRepository {
    async fn create_membership(&self, membership: &RoleMembership) -> Result<()> {
        let mut memberships = self.memberships.write().await;
        // No duplicate check: resubmission appends duplicate rows.
        memberships.push(membership.clone());
        Ok(())
    }

    async fn get_participants(&self, event_id: Uuid) -> Result<Vec<(Person, RoleMembership)>> {
        let memberships = self.memberships.read().await;
        let persons = self.persons.read().await;

        Ok(memberships
            .iter()
            .filter(|m| m.event_id == event_id)
            .filter_map(|m| persons.get(&m.person_id).map(|p| (p.clone(), m.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::events::Role;

    #[tokio::test]
    async fn test_get_or_create_topic_returns_existing() {
        let repo = InMemoryRepository::new();
        let uri = "http://example.org/topics/biology";

        let first = repo.get_or_create_topic(uri).await.unwrap();
        let second = repo.get_or_create_topic(uri).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_single_topic() {
        let repo = InMemoryRepository::new();
        let uri = "http://example.org/topics/chemistry";

        let (a, b) = tokio::join!(repo.get_or_create_topic(uri), repo.get_or_create_topic(uri));
        assert_eq!(a.unwrap().id, b.unwrap().id);
    }

    #[tokio::test]
    async fn test_membership_rows_keep_insertion_order() {
        let repo = InMemoryRepository::new();
        let event = Event::new("Panel");
        let zed = Person::new("Zed", "zed@example.org");
        let amy = Person::new("Amy", "amy@example.org");
        repo.create_event(&event).await.unwrap();
        repo.create_person(&zed).await.unwrap();
        repo.create_person(&amy).await.unwrap();

        repo.create_membership(&RoleMembership::new(zed.id, event.id, Role::Speaker))
            .await
            .unwrap();
        repo.create_membership(&RoleMembership::new(amy.id, event.id, Role::Speaker))
            .await
            .unwrap();

        let names: Vec<_> = repo
            .get_participants(event.id)
            .await
            .unwrap()
            .into_iter()
            .map(|(p, _)| p.name)
            .collect();
        assert_eq!(names, ["Zed", "Amy"]);
    }

    #[tokio::test]
    async fn test_delete_group_clears_event_reference() {
        let repo = InMemoryRepository::new();
        let group = EventGroup::new("Series", "");
        let mut event = Event::new("Talk A");
        event.group_id = Some(group.id);
        repo.create_group(&group).await.unwrap();
        repo.create_event(&event).await.unwrap();

        repo.delete_group(group.id).await.unwrap();

        let fetched = repo.get_event(event.id).await.unwrap().unwrap();
        assert_eq!(fetched.group_id, None);
    }
}
