mod error;
mod slug;
mod types;

pub use error::ValidationError;
pub use slug::slugify;
pub use types::{
    Audience, BookingKind, Event, EventGroup, EventStatus, GroupKind, Participants, Person, Role,
    RoleMembership, TaggableKind, Topic, TopicItem,
};
