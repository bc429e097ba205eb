//! The exam task submitted by callers, and its validation from raw JSON.

use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Fields every task payload must carry, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "email",
    "secret",
    "task",
    "round",
    "nonce",
    "brief",
    "checks",
    "evaluation_url",
];

/// Validation failures for an inbound task body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// A required field is absent or `null`.
    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Iteration marker for a task. Callers send either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Round {
    Number(i64),
    Text(String),
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Round::Number(n) => write!(f, "{}", n),
            Round::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Attachment name to content mapping.
///
/// Keeps the order in which attachments appeared in the request so prompts are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments(Vec<(String, String)>);

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attachment. A repeated name replaces the earlier content in place.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = content,
            None => self.0.push((name, content)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for Attachments {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut attachments = Attachments::new();
        for (name, content) in iter {
            attachments.insert(name, content);
        }
        attachments
    }
}

impl Serialize for Attachments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, content) in &self.0 {
            map.serialize_entry(name, content)?;
        }
        map.end()
    }
}

struct AttachmentsVisitor;

impl<'de> Visitor<'de> for AttachmentsVisitor {
    type Value = Attachments;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping attachment names to string contents")
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Attachments::new())
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Attachments::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(AttachmentsVisitor)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut attachments = Attachments::new();
        while let Some((name, content)) = access.next_entry::<String, String>()? {
            attachments.insert(name, content);
        }
        Ok(attachments)
    }
}

impl<'de> Deserialize<'de> for Attachments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_option(AttachmentsVisitor)
    }
}

/// A unit of work submitted by a caller.
///
/// Lives for one request plus its deferred processing. The secret is never serialized back out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub email: String,
    #[serde(skip_serializing)]
    pub secret: String,
    pub task: String,
    pub round: Round,
    pub nonce: String,
    pub brief: String,
    pub checks: Vec<String>,
    pub evaluation_url: String,
    pub attachments: Attachments,
}

impl Task {
    /// Check that `value` is an object carrying every required field, in [`REQUIRED_FIELDS`]
    /// order, so the first missing field is the one reported. Types are not looked at.
    pub fn check_required(value: &Value) -> Result<&Map<String, Value>, TaskValidationError> {
        let Value::Object(obj) = value else {
            return Err(TaskValidationError::NotAnObject);
        };

        for field in REQUIRED_FIELDS {
            match obj.get(field) {
                None | Some(Value::Null) => return Err(TaskValidationError::MissingField(field)),
                Some(_) => {}
            }
        }
        Ok(obj)
    }

    /// Validate a decoded request body and build a task from it.
    ///
    /// Presence is checked first (see [`Task::check_required`]), type checks follow.
    pub fn from_value(value: Value) -> Result<Self, TaskValidationError> {
        Self::check_required(&value)?;
        let Value::Object(mut obj) = value else {
            return Err(TaskValidationError::NotAnObject);
        };

        Ok(Self {
            email: take_field(&mut obj, "email")?,
            secret: take_field(&mut obj, "secret")?,
            task: take_field(&mut obj, "task")?,
            round: take_field(&mut obj, "round")?,
            nonce: take_field(&mut obj, "nonce")?,
            brief: take_field(&mut obj, "brief")?,
            checks: take_field(&mut obj, "checks")?,
            evaluation_url: take_field(&mut obj, "evaluation_url")?,
            attachments: take_field(&mut obj, "attachments")?,
        })
    }
}

/// Remove `field` from the object and decode it. Absent fields decode from `null`.
fn take_field<T: DeserializeOwned>(
    obj: &mut Map<String, Value>,
    field: &'static str,
) -> Result<T, TaskValidationError> {
    let raw = obj.remove(field).unwrap_or(Value::Null);
    serde_json::from_value(raw).map_err(|e| TaskValidationError::InvalidField {
        field,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "email": "a@b.com",
            "secret": "S",
            "task": "t1",
            "round": 1,
            "nonce": "n1",
            "brief": "Build a todo list",
            "checks": ["#add-button exists"],
            "evaluation_url": "http://x"
        })
    }

    #[test]
    fn test_valid_body_without_attachments() {
        let task = Task::from_value(valid_body()).unwrap();
        assert_eq!(task.task, "t1");
        assert_eq!(task.round, Round::Number(1));
        assert_eq!(task.checks, vec!["#add-button exists".to_string()]);
        assert!(task.attachments.is_empty());
    }

    #[test]
    fn test_each_missing_field_is_named() {
        for field in REQUIRED_FIELDS {
            let mut body = valid_body();
            body.as_object_mut().unwrap().remove(field);
            assert_eq!(
                Task::from_value(body),
                Err(TaskValidationError::MissingField(field)),
                "field {}",
                field
            );
        }
    }

    #[test]
    fn test_null_field_counts_as_missing() {
        let mut body = valid_body();
        body["nonce"] = Value::Null;
        assert_eq!(
            Task::from_value(body),
            Err(TaskValidationError::MissingField("nonce"))
        );
    }

    #[test]
    fn test_first_missing_field_wins() {
        let body = json!({ "email": "a@b.com" });
        assert_eq!(
            Task::from_value(body),
            Err(TaskValidationError::MissingField("secret"))
        );
    }

    #[test]
    fn test_wrong_type_is_invalid_field() {
        let mut body = valid_body();
        body["checks"] = json!("not a list");
        match Task::from_value(body) {
            Err(TaskValidationError::InvalidField { field, .. }) => assert_eq!(field, "checks"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_check_required_ignores_types() {
        let mut body = valid_body();
        body["secret"] = json!(123);
        body["checks"] = json!("not a list");
        let obj = Task::check_required(&body).unwrap();
        assert_eq!(obj["secret"], json!(123));
    }

    #[test]
    fn test_non_object_body() {
        assert_eq!(
            Task::from_value(json!(["email"])),
            Err(TaskValidationError::NotAnObject)
        );
    }

    #[test]
    fn test_string_round_is_accepted() {
        let mut body = valid_body();
        body["round"] = json!("2");
        let task = Task::from_value(body).unwrap();
        assert_eq!(task.round, Round::Text("2".to_string()));
        assert_eq!(task.round.to_string(), "2");
    }

    #[test]
    fn test_attachments_keep_request_order() {
        let body_text = r#"{
            "email": "a@b.com", "secret": "S", "task": "t1", "round": 1, "nonce": "n1",
            "brief": "b", "checks": [], "evaluation_url": "http://x",
            "attachments": {"zeta.csv": "z", "alpha.md": "a", "mid.txt": "m"}
        }"#;
        let value: Value = serde_json::from_str(body_text).unwrap();
        let task = Task::from_value(value).unwrap();
        let names: Vec<&str> = task.attachments.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta.csv", "alpha.md", "mid.txt"]);
    }

    #[test]
    fn test_attachments_deserialize_in_document_order() {
        let attachments: Attachments =
            serde_json::from_str(r#"{"zeta.csv": "z", "alpha.md": "a"}"#).unwrap();
        let names: Vec<&str> = attachments.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta.csv", "alpha.md"]);
    }

    #[test]
    fn test_null_attachments_are_empty() {
        let mut body = valid_body();
        body["attachments"] = Value::Null;
        let task = Task::from_value(body).unwrap();
        assert!(task.attachments.is_empty());
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let task = Task::from_value(valid_body()).unwrap();
        let out = serde_json::to_value(&task).unwrap();
        assert!(out.get("secret").is_none());
        assert_eq!(out["task"], "t1");
    }
}
