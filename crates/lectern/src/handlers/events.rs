use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use uuid::Uuid;

use lectern_core::events::{
    Event, Participants, RoleMembership, TaggableKind, Topic, TopicItem, ValidationError,
};
use lectern_core::lookup::{EnrichmentCache, LookupKind};
use lectern_core::storage::RepositoryError;

use crate::{
    handlers::AppError,
    models::{CreateEvent, EventDetail, UpdateEvent},
    state::AppState,
};

/// List all events (GET /api/events).
pub async fn list_events(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let events = state.events.list_events().await?;
    Ok(Json(events))
}

/// Create a new event from the submission form (POST /api/events).
///
/// The save is explicit and sequential: the event row, then one speaker
/// membership per submitted person, then the topic associations. The
/// form only creates speaker roles; hosts and organizers have no
/// submission path. No transaction wraps the steps, so a storage error
/// partway leaves the event with partial memberships/associations.
pub async fn create_event(
    State(state): State<AppState>,
    Form(payload): Form<CreateEvent>,
) -> Result<impl IntoResponse, AppError> {
    // Validate everything up front so a rejected submission persists
    // nothing at all.
    let speaker_ids = payload.speaker_ids()?;
    let topic_uris = payload.topic_uris();
    let event = payload.into_event()?;

    let mut speakers = Vec::with_capacity(speaker_ids.len());
    for person_id in speaker_ids {
        let person = state
            .persons
            .get_person(person_id)
            .await?
            .ok_or_else(|| ValidationError::UnknownPerson(person_id.to_string()))?;
        speakers.push(person);
    }

    state.events.create_event(&event).await?;

    // One row per submitted speaker; duplicates in the submission stay
    // duplicates in storage.
    for person in &speakers {
        let membership = RoleMembership::speaker(person.id, event.id);
        state.memberships.create_membership(&membership).await?;
    }

    for uri in &topic_uris {
        let topic = state.topics.get_or_create_topic(uri).await?;
        state
            .topics
            .tag_item(&TopicItem::new(topic.id, TaggableKind::Event, event.id))
            .await?;
        populate_topic_name_if_missing(&state, &topic).await;
    }

    tracing::info!(
        event_id = %event.id,
        slug = %event.slug,
        speakers = speakers.len(),
        topics = topic_uris.len(),
        "Created event"
    );

    Ok((StatusCode::CREATED, Json(event)))
}

/// Get a single event with its derived views and enrichment
/// (GET /api/events/{id}).
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetail>, AppError> {
    let event = state
        .events
        .get_event(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let participants = Participants::new(state.memberships.get_participants(id).await?);
    let topics = state
        .topics
        .get_topics_for_item(TaggableKind::Event, id)
        .await?;

    // The enrichment cache lives exactly as long as this handler call.
    // Lookup failures degrade to absent fields, never to an error.
    let mut enrichment = EnrichmentCache::new();
    let venue = enrichment
        .resolve(state.lookup.as_ref(), &event, LookupKind::Location)
        .await
        .cloned();
    let organiser_details = enrichment
        .resolve(state.lookup.as_ref(), &event, LookupKind::Organisation)
        .await
        .cloned();
    let date_details = enrichment
        .resolve(state.lookup.as_ref(), &event, LookupKind::Date)
        .await
        .cloned();

    Ok(Json(EventDetail {
        speakers: participants.speakers().into_iter().cloned().collect(),
        hosts: participants.hosts().into_iter().cloned().collect(),
        organizers: participants.organizers().into_iter().cloned().collect(),
        topics,
        happening_today: event.happening_today(),
        venue,
        organiser_details,
        date_details,
        event,
    }))
}

/// Update an event by ID (PUT /api/events/{id}).
///
/// The slug is never recomputed, whatever happens to the title.
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(payload): Form<UpdateEvent>,
) -> Result<Json<Event>, AppError> {
    let mut event = state
        .events
        .get_event(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    payload.apply_to(&mut event)?;
    state.events.update_event(&event).await?;

    tracing::info!(event_id = %id, "Updated event");

    Ok(Json(event))
}

/// Delete an event by ID (DELETE /api/events/{id}).
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.events.delete_event(id).await?;

    tracing::info!(event_id = %id, "Deleted event");

    Ok(StatusCode::OK)
}

fn not_found(id: Uuid) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: "Event",
        id: id.to_string(),
    }
}

/// Best-effort name population for a topic created pending.
///
/// A gateway failure is logged and leaves the empty name in place; no
/// retry is scheduled, so an unreachable lookup service means the topic
/// keeps its empty name indefinitely.
async fn populate_topic_name_if_missing(state: &AppState, topic: &Topic) {
    if topic.is_named() {
        return;
    }

    match state.lookup.fetch(LookupKind::Topic, &topic.uri).await {
        Ok(resource) => {
            if let Some(name) = resource.name() {
                if let Err(err) = state.topics.set_topic_name(topic.id, name).await {
                    tracing::warn!(uri = %topic.uri, error = %err, "Failed to store topic name");
                }
            }
        }
        Err(err) => {
            tracing::warn!(uri = %topic.uri, error = %err, "Topic name lookup failed");
        }
    }
}
