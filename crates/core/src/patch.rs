//! Partial-update model.
//!
//! Update payloads distinguish "field not sent" from "field sent as null" from
//! "field sent with a value". Only the latter two reach storage.

use serde::{Deserialize, Deserializer};

use crate::value::Value;

/// Tri-state patch field. Pair with `#[serde(default)]` so a missing key stays [`Field::Absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Null,
    Set(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> Field<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Set(v) => Field::Set(f(v)),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Field::Set(v),
            None => Field::Null,
        })
    }
}

/// Ordered column assignments for an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes(Vec<(&'static str, Value)>);

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `field` under `column` unless it was absent from the payload.
    pub fn field<T: Into<Value>>(self, column: &'static str, field: Field<T>) -> Self {
        match field {
            Field::Absent => self,
            Field::Null => self.set(column, Value::Null),
            Field::Set(v) => self.set(column, v),
        }
    }

    pub fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.0.push((column, value)),
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.0.iter().map(|(c, v)| (*c, v))
    }

    /// Names of the assigned columns, in assignment order.
    pub fn columns(&self) -> Vec<&'static str> {
        self.0.iter().map(|(c, _)| *c).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default)]
        name: Field<String>,
        #[serde(default)]
        phone: Field<String>,
        #[serde(default)]
        email: Field<String>,
    }

    #[test]
    fn missing_null_and_present_are_distinct() {
        let p: Patch = serde_json::from_str(r#"{"name":"acme","phone":null}"#).unwrap();
        assert_eq!(p.name, Field::Set("acme".to_string()));
        assert_eq!(p.phone, Field::Null);
        assert_eq!(p.email, Field::Absent);
    }

    #[test]
    fn changes_skip_absent_fields() {
        let changes = Changes::new()
            .field("name", Field::Set("acme".to_string()))
            .field("phone", Field::<String>::Null)
            .field("email", Field::<String>::Absent);

        assert_eq!(changes.columns().len(), 2);
        assert_eq!(changes.get("name"), Some(&Value::Text("acme".into())));
        assert_eq!(changes.get("phone"), Some(&Value::Null));
        assert!(changes.get("email").is_none());
    }

    #[test]
    fn later_assignment_replaces_earlier() {
        let changes = Changes::new().set("name", "a").set("name", "b");
        assert_eq!(changes.columns().len(), 1);
        assert_eq!(changes.get("name"), Some(&Value::Text("b".into())));
    }
}
