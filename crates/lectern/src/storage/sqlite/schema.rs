//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.
//!
//! The UNIQUE constraint on topics.uri is load-bearing: topic
//! get-or-create relies on it to stay idempotent under concurrent
//! submissions, rather than on any application-level locking.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Event groups table
CREATE TABLE IF NOT EXISTS groups (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    slug TEXT NOT NULL,
    description TEXT NOT NULL,
    kind TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Persons table
CREATE TABLE IF NOT EXISTS persons (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    bio TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Topics table
CREATE TABLE IF NOT EXISTS topics (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    uri TEXT NOT NULL UNIQUE
);

-- Topic associations table; no uniqueness on the triple, duplicates
-- are possible on resubmission
CREATE TABLE IF NOT EXISTS topic_items (
    id TEXT PRIMARY KEY,
    topic_id TEXT NOT NULL,
    item_kind TEXT NOT NULL,
    item_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (topic_id) REFERENCES topics(id) ON DELETE CASCADE
);

-- Events table
CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    title_not_announced INTEGER NOT NULL,
    slug TEXT NOT NULL,
    description TEXT NOT NULL,
    start_at TEXT,
    end_at TEXT,
    audience TEXT NOT NULL,
    booking TEXT NOT NULL,
    booking_url TEXT,
    cost TEXT,
    special_message TEXT,
    status TEXT NOT NULL,
    group_id TEXT,
    location TEXT,
    organiser TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE SET NULL
);

-- Role memberships table; no uniqueness on (person, event, role),
-- duplicates are possible on resubmission
CREATE TABLE IF NOT EXISTS memberships (
    id TEXT PRIMARY KEY,
    person_id TEXT NOT NULL,
    event_id TEXT NOT NULL,
    role TEXT NOT NULL,
    affiliation TEXT NOT NULL,
    url TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (person_id) REFERENCES persons(id) ON DELETE CASCADE,
    FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_events_group_id ON events(group_id);
CREATE INDEX IF NOT EXISTS idx_events_start_at ON events(start_at);
CREATE INDEX IF NOT EXISTS idx_memberships_event_id ON memberships(event_id);
CREATE INDEX IF NOT EXISTS idx_topic_items_item ON topic_items(item_kind, item_id);
CREATE INDEX IF NOT EXISTS idx_persons_name ON persons(name);
"#;

// Group queries
pub const INSERT_GROUP: &str = r#"
INSERT INTO groups (id, title, slug, description, kind, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const SELECT_GROUP_BY_ID: &str = r#"
SELECT id, title, slug, description, kind, created_at, updated_at
FROM groups
WHERE id = ?1
"#;

pub const SELECT_ALL_GROUPS: &str = r#"
SELECT id, title, slug, description, kind, created_at, updated_at
FROM groups
ORDER BY title ASC
"#;

pub const DELETE_GROUP: &str = r#"
DELETE FROM groups
WHERE id = ?1
"#;

/// Clears the group reference on its events before the group row goes
/// away; events are never cascade-deleted with their group.
pub const CLEAR_GROUP_FROM_EVENTS: &str = r#"
UPDATE events
SET group_id = NULL
WHERE group_id = ?1
"#;

// Person queries
pub const INSERT_PERSON: &str = r#"
INSERT INTO persons (id, name, slug, bio, email, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const SELECT_PERSON_BY_ID: &str = r#"
SELECT id, name, slug, bio, email, created_at, updated_at
FROM persons
WHERE id = ?1
"#;

pub const SELECT_ALL_PERSONS: &str = r#"
SELECT id, name, slug, bio, email, created_at, updated_at
FROM persons
ORDER BY name ASC
"#;

pub const SUGGEST_PERSONS: &str = r#"
SELECT id, name, slug, bio, email, created_at, updated_at
FROM persons
WHERE name LIKE '%' || ?1 || '%'
ORDER BY name ASC
"#;

// Topic queries
pub const INSERT_TOPIC: &str = r#"
INSERT INTO topics (id, name, uri)
VALUES (?1, ?2, ?3)
"#;

pub const SELECT_TOPIC_BY_ID: &str = r#"
SELECT id, name, uri
FROM topics
WHERE id = ?1
"#;

pub const SELECT_TOPIC_BY_URI: &str = r#"
SELECT id, name, uri
FROM topics
WHERE uri = ?1
"#;

pub const UPDATE_TOPIC_NAME: &str = r#"
UPDATE topics
SET name = ?2
WHERE id = ?1
"#;

pub const INSERT_TOPIC_ITEM: &str = r#"
INSERT INTO topic_items (id, topic_id, item_kind, item_id, created_at)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub const SELECT_TOPICS_FOR_ITEM: &str = r#"
SELECT DISTINCT t.id, t.name, t.uri
FROM topics t
INNER JOIN topic_items ti ON ti.topic_id = t.id
WHERE ti.item_kind = ?1 AND ti.item_id = ?2
ORDER BY t.name ASC
"#;

// Event queries
pub const INSERT_EVENT: &str = r#"
INSERT INTO events (id, title, title_not_announced, slug, description, start_at, end_at,
                    audience, booking, booking_url, cost, special_message, status,
                    group_id, location, organiser, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
"#;

pub const SELECT_EVENT_BY_ID: &str = r#"
SELECT id, title, title_not_announced, slug, description, start_at, end_at,
       audience, booking, booking_url, cost, special_message, status,
       group_id, location, organiser, created_at, updated_at
FROM events
WHERE id = ?1
"#;

pub const SELECT_ALL_EVENTS: &str = r#"
SELECT id, title, title_not_announced, slug, description, start_at, end_at,
       audience, booking, booking_url, cost, special_message, status,
       group_id, location, organiser, created_at, updated_at
FROM events
ORDER BY start_at IS NULL ASC, start_at DESC
"#;

pub const SELECT_EVENTS_BY_GROUP: &str = r#"
SELECT id, title, title_not_announced, slug, description, start_at, end_at,
       audience, booking, booking_url, cost, special_message, status,
       group_id, location, organiser, created_at, updated_at
FROM events
WHERE group_id = ?1
ORDER BY start_at IS NULL ASC, start_at DESC
"#;

/// Deliberately leaves the slug column untouched: the slug is written
/// once at creation and never recomputed on later edits.
pub const UPDATE_EVENT: &str = r#"
UPDATE events
SET title = ?2, title_not_announced = ?3, description = ?4, start_at = ?5, end_at = ?6,
    audience = ?7, booking = ?8, booking_url = ?9, cost = ?10, special_message = ?11,
    status = ?12, group_id = ?13, location = ?14, organiser = ?15, updated_at = ?16
WHERE id = ?1
"#;

pub const DELETE_EVENT: &str = r#"
DELETE FROM events
WHERE id = ?1
"#;

// Membership queries
pub const INSERT_MEMBERSHIP: &str = r#"
INSERT INTO memberships (id, person_id, event_id, role, affiliation, url, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

/// rowid ordering gives row insertion order, which the role views
/// promise to preserve.
pub const SELECT_PARTICIPANTS_FOR_EVENT: &str = r#"
SELECT p.id, p.name, p.slug, p.bio, p.email, p.created_at, p.updated_at,
       m.id, m.person_id, m.event_id, m.role, m.affiliation, m.url, m.created_at
FROM memberships m
INNER JOIN persons p ON p.id = m.person_id
WHERE m.event_id = ?1
ORDER BY m.rowid ASC
"#;
