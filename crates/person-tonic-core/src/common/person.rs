//! # The `Person` entity
//!
//! A person is an `(id, name)` pair. The id is assigned by the store from a
//! monotonic sequence and never changes; the name is required and must contain
//! at least one non-whitespace character. Names are stored exactly as given.
//!
//! [`Person`] is the domain value returned by the store. It converts into the
//! wire type [`proto::Person`] for responses.

use crate::{Error, Result, proto};

/// Store-assigned primary key of a person.
pub type PersonId = i64;

/// A persisted person.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
}

impl Person {
    pub fn new(id: PersonId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Checks that `name` is acceptable for create and update.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] if `name` is empty or whitespace-only.
pub fn validate_name(name: &str) -> Result<&str> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(name)
}

impl From<Person> for proto::Person {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            name: person.name,
        }
    }
}

impl From<proto::Person> for Person {
    fn from(person: proto::Person) -> Self {
        Self {
            id: person.id,
            name: person.name,
        }
    }
}

impl From<Option<Person>> for proto::PersonResponse {
    fn from(person: Option<Person>) -> Self {
        Self {
            person: person.map(Into::into),
        }
    }
}

impl From<Vec<Person>> for proto::PeopleResponse {
    fn from(people: Vec<Person>) -> Self {
        Self {
            people: people.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_names() {
        for name in ["", " ", "   ", "\t\n"] {
            assert_eq!(
                validate_name(name),
                Err(Error::InvalidName {
                    name: name.to_string()
                })
            );
        }
    }

    #[test]
    fn accepts_names_verbatim() {
        assert_eq!(validate_name("Alice"), Ok("Alice"));
        assert_eq!(validate_name("  Bob "), Ok("  Bob "));
    }

    #[test]
    fn absent_person_leaves_field_unset() {
        let response = proto::PersonResponse::from(None);
        assert!(response.person.is_none());

        let response = proto::PersonResponse::from(Some(Person::new(0, "")));
        assert_eq!(
            response.person,
            Some(proto::Person {
                id: 0,
                name: String::new()
            })
        );
    }

    #[test]
    fn people_keep_their_order() {
        let response = proto::PeopleResponse::from(vec![
            Person::new(3, "Charlie"),
            Person::new(1, "Alice"),
        ]);
        let ids: Vec<_> = response.people.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
