use serde::Deserialize;

use lectern_core::events::{EventGroup, GroupKind, ValidationError};
use lectern_core::serde::deserialize_optional_string;

/// Server-side request payload for creating an event group.
#[derive(Debug, Deserialize)]
pub struct CreateGroup {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub kind: Option<String>,
}

impl CreateGroup {
    /// Validates the payload and converts it into a group.
    pub fn into_group(self) -> Result<EventGroup, ValidationError> {
        let title = self.title.ok_or(ValidationError::Field {
            field: "title",
            message: "title is required".to_string(),
        })?;

        let mut group = EventGroup::new(title, self.description.unwrap_or_default());
        if let Some(kind) = self.kind {
            group.kind = Some(GroupKind::parse(&kind).ok_or(ValidationError::Field {
                field: "kind",
                message: kind,
            })?);
        }

        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_required() {
        let payload: CreateGroup = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            payload.into_group(),
            Err(ValidationError::Field { field: "title", .. })
        ));
    }

    #[test]
    fn test_group_with_kind() {
        let payload: CreateGroup = serde_json::from_str(
            r#"{"title": "Quantum Seminars", "kind": "seminar_series"}"#,
        )
        .unwrap();
        let group = payload.into_group().unwrap();
        assert_eq!(group.slug, "quantum-seminars");
        assert_eq!(group.kind, Some(GroupKind::SeminarSeries));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let payload: CreateGroup =
            serde_json::from_str(r#"{"title": "Workshops", "kind": "workshop"}"#).unwrap();
        assert!(matches!(
            payload.into_group(),
            Err(ValidationError::Field { field: "kind", .. })
        ));
    }
}
