mod event;
mod group;
mod person;

pub use event::{CreateEvent, EventDetail, UpdateEvent};
pub use group::CreateGroup;
pub use person::CreatePerson;
