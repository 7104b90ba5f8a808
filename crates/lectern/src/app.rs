use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        events::{create_event, delete_event, get_event, list_events, update_event},
        groups::{create_group, delete_group, get_group, list_groups},
        health::health,
        persons::{create_person, list_persons, suggest_persons},
        search::search,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    // API routes with CORS
    let api_routes = Router::new()
        // Event routes
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        // Event group routes
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/{id}", get(get_group).delete(delete_group))
        // Person routes
        .route("/persons", get(list_persons).post(create_person))
        .route("/persons/suggest", get(suggest_persons))
        // Search
        .route("/search", get(search))
        .layer(cors);

    // Main application router
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::state::test_support::{DownLookup, DownSearch, StubSearch};

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_app(AppState::default());

        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_event_happy_path() {
        let app = create_app(AppState::default());

        let response = app
            .clone()
            .oneshot(form_post(
                "/api/events",
                "title=Quantum+Computing&description=Intro+talk&start=2030-06-01T10:00",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let event = body_json(response).await;
        assert_eq!(event["title"], "Quantum Computing");
        assert_eq!(event["slug"], "quantum-computing");
        assert_eq!(event["audience"], "university_only");
        assert_eq!(event["status"], "published");

        // The event is listed afterwards.
        let response = app.oneshot(get_request("/api/events")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let events = body_json(response).await;
        assert_eq!(events.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_event_without_title_rejected() {
        let app = create_app(AppState::default());

        let response = app
            .clone()
            .oneshot(form_post("/api/events", "description=No+title+here"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        // Nothing was persisted.
        let response = app.oneshot(get_request("/api/events")).await.unwrap();
        let events = body_json(response).await;
        assert!(events.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_event_title_not_announced() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(form_post("/api/events", "title_not_announced=on"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let event = body_json(response).await;
        assert_eq!(event["title_not_announced"], true);
        // Slug falls back to the event id.
        assert_eq!(event["slug"], event["id"]);
    }

    #[tokio::test]
    async fn test_slug_survives_title_update() {
        let app = create_app(AppState::default());

        let response = app
            .clone()
            .oneshot(form_post("/api/events", "title=Talk+A"))
            .await
            .unwrap();
        let created = body_json(response).await;
        assert_eq!(created["slug"], "talk-a");
        let id = created["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/api/events/{id}"))
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(Body::from("title=Talk+B"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["title"], "Talk B");
        assert_eq!(updated["slug"], "talk-a");
    }

    #[tokio::test]
    async fn test_submitted_speakers_create_membership_rows() {
        let app = create_app(AppState::default());

        // Register two speakers through the quick-add endpoint.
        let mut ids = Vec::new();
        for (name, email) in [("Ada Lovelace", "ada@example.org"), ("Alan Turing", "alan@example.org")] {
            let response = app
                .clone()
                .oneshot(form_post(
                    "/api/persons",
                    &format!("name={}&email={}", name.replace(' ', "+"), email),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            ids.push(body_json(response).await["id"].as_str().unwrap().to_string());
        }

        let speakers = ids.join(",");
        let response = app
            .clone()
            .oneshot(form_post(
                "/api/events",
                &format!("title=Panel&speakers={speakers}"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let event_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/events/{event_id}")))
            .await
            .unwrap();
        let detail = body_json(response).await;
        assert_eq!(detail["speakers"].as_array().unwrap().len(), 2);
        assert_eq!(detail["speakers"][0]["name"], "Ada Lovelace");
        assert!(detail["hosts"].as_array().unwrap().is_empty());
        assert!(detail["organizers"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resubmitting_speakers_duplicates_rows() {
        let state = AppState::default();
        let app = create_app(state.clone());

        let response = app
            .clone()
            .oneshot(form_post("/api/persons", "name=Ada&email=ada@example.org"))
            .await
            .unwrap();
        let person_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(form_post(
                "/api/events",
                &format!("title=Panel&speakers={person_id},{person_id}"),
            ))
            .await
            .unwrap();
        let event_id = body_json(response).await["id"].as_str().unwrap().to_string();
        let event_uuid = event_id.parse().unwrap();

        // Two identical tokens, two rows. No dedup happens anywhere.
        let rows = state.memberships.get_participants(event_uuid).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_speaker_rejected_before_persisting() {
        let app = create_app(AppState::default());

        let response = app
            .clone()
            .oneshot(form_post(
                "/api/events",
                &format!("title=Panel&speakers={}", uuid::Uuid::new_v4()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app.oneshot(get_request("/api/events")).await.unwrap();
        assert!(body_json(response).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submitted_topics_attach_to_event() {
        let state = AppState::default();
        let app = create_app(state.clone());

        let response = app
            .clone()
            .oneshot(form_post(
                "/api/events",
                "title=Talk&topics=http%3A%2F%2Fexample.org%2Ftopics%2Fphysics",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let event_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(get_request(&format!("/api/events/{event_id}")))
            .await
            .unwrap();
        let detail = body_json(response).await;
        let topics = detail["topics"].as_array().unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0]["uri"], "http://example.org/topics/physics");
        // The stub lookup answered, so the pending name got populated.
        assert_eq!(topics[0]["name"], "topic http://example.org/topics/physics");
    }

    #[tokio::test]
    async fn test_topic_keeps_empty_name_when_lookup_down() {
        let state = AppState::for_tests_with(Arc::new(DownLookup), Arc::new(StubSearch));
        let app = create_app(state);

        let response = app
            .clone()
            .oneshot(form_post(
                "/api/events",
                "title=Talk&topics=http%3A%2F%2Fexample.org%2Ftopics%2Fphysics",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let event_id = body_json(response).await["id"].as_str().unwrap().to_string();

        // The association is persisted; the name stays empty with no
        // retry scheduled.
        let response = app
            .oneshot(get_request(&format!("/api/events/{event_id}")))
            .await
            .unwrap();
        let detail = body_json(response).await;
        let topics = detail["topics"].as_array().unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0]["name"], "");
    }

    #[tokio::test]
    async fn test_event_detail_enrichment_with_lookup_down() {
        let state = AppState::for_tests_with(Arc::new(DownLookup), Arc::new(StubSearch));
        let app = create_app(state);

        let response = app
            .clone()
            .oneshot(form_post(
                "/api/events",
                "title=Talk&location=oxpoints%3A40002001",
            ))
            .await
            .unwrap();
        let event_id = body_json(response).await["id"].as_str().unwrap().to_string();

        // Lookup failures degrade to absent enrichment, not an error.
        let response = app
            .oneshot(get_request(&format!("/api/events/{event_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let detail = body_json(response).await;
        assert!(detail["venue"].is_null());
    }

    #[tokio::test]
    async fn test_event_detail_enrichment_with_lookup_up() {
        let app = create_app(AppState::default());

        let response = app
            .clone()
            .oneshot(form_post(
                "/api/events",
                "title=Talk&location=oxpoints%3A40002001",
            ))
            .await
            .unwrap();
        let event_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(get_request(&format!("/api/events/{event_id}")))
            .await
            .unwrap();
        let detail = body_json(response).await;
        assert_eq!(
            detail["venue"]["data"]["name"],
            "location oxpoints:40002001"
        );
        // No organiser reference was submitted, so no enrichment for it.
        assert!(detail["organiser_details"].is_null());
    }

    #[tokio::test]
    async fn test_get_nonexistent_event() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(get_request(
                "/api/events/00000000-0000-0000-0000-000000000000",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_group_lifecycle() {
        let app = create_app(AppState::default());

        let response = app
            .clone()
            .oneshot(form_post(
                "/api/groups",
                "title=Quantum+Seminars&kind=seminar_series",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let group = body_json(response).await;
        let group_id = group["id"].as_str().unwrap().to_string();
        assert_eq!(group["slug"], "quantum-seminars");

        // An event filed under the group shows up in its detail.
        let response = app
            .clone()
            .oneshot(form_post(
                "/api/events",
                &format!("title=Talk&group_id={group_id}"),
            ))
            .await
            .unwrap();
        let event_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/groups/{group_id}")))
            .await
            .unwrap();
        let detail = body_json(response).await;
        assert_eq!(detail["events"].as_array().unwrap().len(), 1);

        // Deleting the group leaves the event, unfiled.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/groups/{group_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request(&format!("/api/events/{event_id}")))
            .await
            .unwrap();
        let event = body_json(response).await;
        assert!(event["group_id"].is_null());
    }

    #[tokio::test]
    async fn test_person_suggestions() {
        let app = create_app(AppState::default());

        for (name, email) in [("Ada Lovelace", "ada@example.org"), ("Alan Turing", "alan@example.org")] {
            app.clone()
                .oneshot(form_post(
                    "/api/persons",
                    &format!("name={}&email={}", name.replace(' ', "+"), email),
                ))
                .await
                .unwrap();
        }

        let response = app
            .oneshot(get_request("/api/persons/suggest?q=love"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let hits = body_json(response).await;
        assert_eq!(hits.as_array().unwrap().len(), 1);
        assert_eq!(hits[0]["name"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_search_returns_bucket_counts() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(get_request("/api/search?q=quantum&date=next_7"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let results = body_json(response).await;
        let buckets = results["facets"]["date_buckets"].as_array().unwrap();
        // Every configured bucket is counted on the one request.
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0][0], "Next 7 days");
    }

    #[tokio::test]
    async fn test_search_unknown_date_token_rejected() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(get_request("/api/search?date=someday"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_search_index_down_maps_to_503() {
        let state = AppState::for_tests_with(
            Arc::new(crate::state::test_support::StubLookup),
            Arc::new(DownSearch),
        );
        let app = create_app(state);

        let response = app.oneshot(get_request("/api/search?q=x")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
