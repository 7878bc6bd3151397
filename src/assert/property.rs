//! Typed property accessors
//!
//! Replaces dotted string paths (`header.location`, `body.completed`) with an
//! enum whose variants map to explicit getters on [`TodoResponse`].

use serde_json::{Map, Value};

use crate::client::TodoResponse;

/// A property of a resolved response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// Status code as a JSON number
    Status,
    /// All headers as a JSON object keyed by lower-cased name
    Headers,
    /// One header, matched case-insensitively
    Header(String),
    /// The whole parsed body
    Body,
    /// A top-level field of the body
    BodyField(String),
}

impl Property {
    pub fn header(name: impl Into<String>) -> Self {
        Property::Header(name.into().to_ascii_lowercase())
    }

    pub fn body_field(name: impl Into<String>) -> Self {
        Property::BodyField(name.into())
    }

    /// Extract the property, or `None` if the response doesn't carry it
    pub fn resolve(&self, response: &TodoResponse) -> Option<Value> {
        match self {
            Property::Status => Some(Value::from(response.status)),
            Property::Headers => Some(Value::Object(
                response
                    .headers
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                    .collect::<Map<_, _>>(),
            )),
            Property::Header(name) => response.header(name).map(Value::from),
            Property::Body => response.body.clone(),
            Property::BodyField(name) => response.body_field(name).cloned(),
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Property::Status => write!(f, "status"),
            Property::Headers => write!(f, "header"),
            Property::Header(name) => write!(f, "header.{name}"),
            Property::Body => write!(f, "body"),
            Property::BodyField(name) => write!(f, "body.{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn response() -> TodoResponse {
        let mut headers = BTreeMap::new();
        headers.insert("access-control-allow-origin".to_string(), "*".to_string());
        TodoResponse {
            status: 200,
            headers,
            body: Some(json!({"completed": true})),
        }
    }

    #[test]
    fn test_resolve_each_variant() {
        let res = response();
        assert_eq!(Property::Status.resolve(&res), Some(json!(200)));
        assert_eq!(
            Property::Headers.resolve(&res),
            Some(json!({"access-control-allow-origin": "*"}))
        );
        assert_eq!(
            Property::header("Access-Control-Allow-Origin").resolve(&res),
            Some(json!("*"))
        );
        assert_eq!(Property::Body.resolve(&res), Some(json!({"completed": true})));
        assert_eq!(Property::body_field("completed").resolve(&res), Some(json!(true)));
        assert_eq!(Property::body_field("title").resolve(&res), None);
    }

    #[test]
    fn test_display_matches_path_syntax() {
        assert_eq!(Property::header("Location").to_string(), "header.location");
        assert_eq!(Property::body_field("completed").to_string(), "body.completed");
        assert_eq!(Property::Status.to_string(), "status");
    }
}
