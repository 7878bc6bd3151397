//! Assertion engine
//!
//! Resolves a [`ResponseHandle`] and judges it against a declarative
//! expectation. Evaluation never fails: every problem, including a rejected
//! exchange, ends up in the returned [`Outcome`].
//!
//! ```ignore
//! use todocheck::assert::expect;
//!
//! let created = client.create(url, "Walk the dog");
//! let outcome = expect(&created).status().to_equal(201).await;
//! assert!(outcome.is_passed());
//! ```

mod outcome;
mod property;

pub use outcome::Outcome;
pub use property::Property;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::client::{ClientError, ResponseHandle};

/// Format rule for the `Location` of a created item
pub const LOCATION_PATTERN: &str = r"^https?://.+/todos/[0-9]+$";

/// Compiled [`LOCATION_PATTERN`]
pub static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(LOCATION_PATTERN).expect("location pattern is valid"));

/// A check applied to a resolved property
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Strict equality with a JSON literal
    Equals(Value),
    /// The value is an object holding every one of these keys
    ContainsKeys(Vec<String>),
    /// The value is a string matching the pattern
    Matches(Regex),
}

impl Predicate {
    fn describe(&self) -> String {
        match self {
            Predicate::Equals(v) => format!("{v}"),
            Predicate::ContainsKeys(keys) => format!("keys [{}]", keys.join(", ")),
            Predicate::Matches(re) => format!("a match for /{}/", re.as_str()),
        }
    }

    fn holds(&self, value: &Value) -> Result<(), String> {
        match self {
            Predicate::Equals(expected) if value == expected => Ok(()),
            Predicate::Equals(_) => Err(format!("{value}")),
            Predicate::ContainsKeys(keys) => {
                let Some(map) = value.as_object() else {
                    return Err(format!("non-object {value}"));
                };
                let missing: Vec<_> = keys
                    .iter()
                    .filter(|k| !map.contains_key(k.as_str()))
                    .map(String::as_str)
                    .collect();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(format!("missing [{}]", missing.join(", ")))
                }
            }
            Predicate::Matches(re) => match value.as_str() {
                Some(s) if re.is_match(s) => Ok(()),
                Some(s) => Err(format!("\"{s}\"")),
                None => Err(format!("non-string {value}")),
            },
        }
    }
}

/// A declarative expectation on one exchange
#[derive(Debug, Clone)]
pub enum Assertion {
    /// The exchange resolves and `property` satisfies `predicate`
    Resolves {
        property: Property,
        predicate: Predicate,
    },
    /// The exchange is rejected with a message containing this text
    RejectedWith(String),
}

impl Assertion {
    /// Wait for `handle` and judge it
    pub async fn evaluate(&self, handle: &ResponseHandle) -> Outcome {
        let exchange = handle.resolve().await;

        match (self, exchange) {
            (Assertion::RejectedWith(needle), Err(error)) => {
                let message = error.to_string();
                if message.contains(needle.as_str()) {
                    Outcome::Passed
                } else {
                    Outcome::failed(
                        format!("rejection containing \"{needle}\""),
                        format!("rejection \"{message}\""),
                    )
                }
            }
            (Assertion::RejectedWith(needle), Ok(response)) => Outcome::failed(
                format!("rejection containing \"{needle}\""),
                format!("response with status {}", response.status),
            ),
            (Assertion::Resolves { property, predicate }, Err(error)) => match error.as_ref() {
                // An unexpected status is the backend breaking the contract
                ClientError::Status { status, reason, .. } => Outcome::failed(
                    format!("{property} to be {}", predicate.describe()),
                    format!("{reason} ({status})"),
                ),
                _ => Outcome::errored(error.to_string()),
            },
            (
                Assertion::Resolves {
                    property,
                    predicate,
                },
                Ok(response),
            ) => match property.resolve(&response) {
                None => Outcome::failed(
                    format!("{property} to be {}", predicate.describe()),
                    format!("no {property}"),
                ),
                Some(value) => match predicate.holds(&value) {
                    Ok(()) => Outcome::Passed,
                    Err(actual) => Outcome::failed(
                        format!("{property} to be {}", predicate.describe()),
                        actual,
                    ),
                },
            },
        }
    }
}

/// Start an expectation on `handle`
pub fn expect(handle: &ResponseHandle) -> Expect {
    Expect {
        handle: handle.clone(),
    }
}

/// Builder returned by [`expect`]
#[derive(Debug, Clone)]
pub struct Expect {
    handle: ResponseHandle,
}

impl Expect {
    pub fn property(self, property: Property) -> PropertyExpect {
        PropertyExpect {
            handle: self.handle,
            property,
        }
    }

    pub fn status(self) -> PropertyExpect {
        self.property(Property::Status)
    }

    pub fn headers(self) -> PropertyExpect {
        self.property(Property::Headers)
    }

    pub fn header(self, name: &str) -> PropertyExpect {
        self.property(Property::header(name))
    }

    pub fn body_field(self, name: &str) -> PropertyExpect {
        self.property(Property::body_field(name))
    }

    /// The exchange must fail with a message containing `needle`
    pub async fn to_be_rejected_with(self, needle: &str) -> Outcome {
        Assertion::RejectedWith(needle.to_string())
            .evaluate(&self.handle)
            .await
    }
}

/// An expectation narrowed to one property
#[derive(Debug, Clone)]
pub struct PropertyExpect {
    handle: ResponseHandle,
    property: Property,
}

impl PropertyExpect {
    pub async fn to(self, predicate: Predicate) -> Outcome {
        Assertion::Resolves {
            property: self.property,
            predicate,
        }
        .evaluate(&self.handle)
        .await
    }

    pub async fn to_equal(self, expected: impl Into<Value>) -> Outcome {
        self.to(Predicate::Equals(expected.into())).await
    }

    pub async fn to_contain_keys(self, keys: &[&str]) -> Outcome {
        let keys = keys.iter().map(|k| k.to_string()).collect();
        self.to(Predicate::ContainsKeys(keys)).await
    }

    pub async fn to_match(self, pattern: &Regex) -> Outcome {
        self.to(Predicate::Matches(pattern.clone())).await
    }
}
