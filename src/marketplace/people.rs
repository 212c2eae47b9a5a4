//! In-memory `people` resource.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Person {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub firstname: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lastname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
}

impl Person {
    /// Overlay the non-empty fields of `other` onto `self`.
    pub fn merge(&mut self, other: Person) {
        if !other.id.is_empty() {
            self.id = other.id;
        }
        if !other.firstname.is_empty() {
            self.firstname = other.firstname;
        }
        if !other.lastname.is_empty() {
            self.lastname = other.lastname;
        }
        if other.address.is_some() {
            self.address = other.address;
        }
    }
}

#[derive(Debug, Default)]
pub struct People {
    people: RwLock<Vec<Person>>,
}

impl People {
    #[must_use]
    pub fn new(people: Vec<Person>) -> Self {
        Self {
            people: RwLock::new(people),
        }
    }

    /// The two records the service starts with.
    #[must_use]
    pub fn seeded() -> Self {
        let address = || {
            Some(Address {
                city: "City X".to_string(),
                state: "State X".to_string(),
            })
        };
        Self::new(vec![
            Person {
                id: "1".to_string(),
                firstname: "John".to_string(),
                lastname: "doe".to_string(),
                address: address(),
            },
            Person {
                id: "2".to_string(),
                firstname: "Jack".to_string(),
                lastname: "doe".to_string(),
                address: address(),
            },
        ])
    }

    pub async fn list(&self) -> Vec<Person> {
        self.people.read().await.clone()
    }

    pub async fn find(&self, id: &str) -> Option<Person> {
        self.people
            .read()
            .await
            .iter()
            .find(|person| person.id == id)
            .cloned()
    }

    /// Append `person` and return the updated list. Ids are not required to be unique.
    pub async fn add(&self, person: Person) -> Vec<Person> {
        let mut people = self.people.write().await;
        people.push(person);
        people.clone()
    }

    /// Remove the first person with `id` and return the updated list.
    pub async fn remove(&self, id: &str) -> Vec<Person> {
        let mut people = self.people.write().await;
        if let Some(index) = people.iter().position(|person| person.id == id) {
            people.remove(index);
        }
        people.clone()
    }
}
