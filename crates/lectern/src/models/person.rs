use serde::Deserialize;

use lectern_core::events::{Person, ValidationError};
use lectern_core::serde::deserialize_optional_string;

/// Server-side request payload for the person quick-add form.
#[derive(Debug, Deserialize)]
pub struct CreatePerson {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub bio: Option<String>,
}

impl CreatePerson {
    /// Validates the payload and converts it into a person.
    pub fn into_person(self) -> Result<Person, ValidationError> {
        let name = self.name.ok_or(ValidationError::Field {
            field: "name",
            message: "name is required".to_string(),
        })?;

        let mut person = Person::new(name, self.email.unwrap_or_default());
        if let Some(bio) = self.bio {
            person.bio = bio;
        }

        Ok(person)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_required() {
        let payload: CreatePerson = serde_json::from_str(r#"{"email": "a@b.org"}"#).unwrap();
        assert!(matches!(
            payload.into_person(),
            Err(ValidationError::Field { field: "name", .. })
        ));
    }

    #[test]
    fn test_person_slug_from_name() {
        let payload: CreatePerson =
            serde_json::from_str(r#"{"name": "Ada Lovelace", "email": "ada@example.org"}"#)
                .unwrap();
        let person = payload.into_person().unwrap();
        assert_eq!(person.slug, "ada-lovelace");
        assert_eq!(person.email, "ada@example.org");
    }
}
