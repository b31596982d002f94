//! Validation engine.
//!
//! Entities describe their rules by implementing [`Validate`]. The engine runs
//! those rules through a [`Validator`] before every save; a non-empty result
//! stops the save without touching the store.
//!
//! Rules come in two flavours:
//!
//! - **Declarative field rules** - [`required`](Validator::required),
//!   [`min_length`](Validator::min_length), [`range`](Validator::range),
//!   [`pattern`](Validator::pattern) and friends
//! - **Deep rules** - [`nested`](Validator::nested),
//!   [`nested_opt`](Validator::nested_opt) and
//!   [`nested_each`](Validator::nested_each) recurse into nested values and
//!   collect their violations under a prefixed path
//!
//! Violations are reported depth-first, in declaration order.
//!
//! # Example
//!
//! ```
//! use docket_lifecycle::validation::{validate, Validate, Validator};
//!
//! struct Line {
//!     sku: String,
//!     quantity: u32,
//! }
//!
//! impl Validate for Line {
//!     fn validate(&self, v: &mut Validator) {
//!         v.required("sku", &self.sku);
//!         v.range("quantity", self.quantity, 1, 100);
//!     }
//! }
//!
//! struct Order {
//!     customer: String,
//!     lines: Vec<Line>,
//! }
//!
//! impl Validate for Order {
//!     fn validate(&self, v: &mut Validator) {
//!         v.required("customer", &self.customer);
//!         v.nested_each("lines", &self.lines);
//!     }
//! }
//!
//! let order = Order {
//!     customer: String::new(),
//!     lines: vec![Line { sku: "A-1".into(), quantity: 0 }],
//! };
//! let errors = validate(&order);
//! let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
//! assert_eq!(paths, ["customer", "lines[0].quantity"]);
//! ```

use std::fmt;

use regex::Regex;
use serde::Serialize;

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDetail {
    /// Path to the offending field (`lines[1].sku`).
    pub path: String,
    /// The rule that failed (`required`, `min_length`, ...).
    pub rule: &'static str,
    /// A human-readable error message.
    pub message: String,
}

impl fmt::Display for ValidationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validation rules for a type.
///
/// The default implementation declares no rules.
pub trait Validate {
    /// Declares this value's rules on `v`.
    fn validate(&self, _v: &mut Validator) {}
}

/// Runs all rules of `value` and returns the violations.
///
/// An empty vector means the value is valid.
pub fn validate<V: Validate + ?Sized>(value: &V) -> Vec<ValidationDetail> {
    let mut validator = Validator::new();
    value.validate(&mut validator);
    validator.finish()
}

/// Collects violations while a value's rules run.
#[derive(Debug, Default)]
pub struct Validator {
    prefix: String,
    details: Vec<ValidationDetail>,
}

impl Validator {
    /// Creates an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the validator and returns the collected violations.
    pub fn finish(self) -> Vec<ValidationDetail> {
        self.details
    }

    /// Returns `true` if no violation has been recorded so far.
    pub fn is_valid(&self) -> bool {
        self.details.is_empty()
    }

    /// Requires a non-blank string.
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "required", format!("{} is required", field));
        }
        self
    }

    /// Requires an optional value to be present.
    pub fn required_opt<T>(&mut self, field: &str, value: &Option<T>) -> &mut Self {
        if value.is_none() {
            self.push(field, "required", format!("{} is required", field));
        }
        self
    }

    /// Requires at least `min` characters.
    pub fn min_length(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.push(
                field,
                "min_length",
                format!("{} must be at least {} characters", field, min),
            );
        }
        self
    }

    /// Requires at most `max` characters.
    pub fn max_length(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.push(
                field,
                "max_length",
                format!("{} must be at most {} characters", field, max),
            );
        }
        self
    }

    /// Requires `min <= value <= max`.
    pub fn range<N>(&mut self, field: &str, value: N, min: N, max: N) -> &mut Self
    where
        N: PartialOrd + fmt::Display,
    {
        if value < min || value > max {
            self.push(
                field,
                "range",
                format!("{} must be between {} and {}", field, min, max),
            );
        }
        self
    }

    /// Requires the whole value to match `pattern`, as if it were anchored
    /// with `^...$`.
    ///
    /// Empty values are left to [`required`](Self::required).
    pub fn pattern(&mut self, field: &str, value: &str, pattern: &Regex) -> &mut Self {
        if !value.is_empty() && !matches_whole(pattern, value) {
            self.push(
                field,
                "pattern",
                format!("{} does not match {}", field, pattern.as_str()),
            );
        }
        self
    }

    /// Requires the value to be one of `allowed`.
    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !allowed.contains(&value) {
            self.push(
                field,
                "one_of",
                format!("{} must be one of: {}", field, allowed.join(", ")),
            );
        }
        self
    }

    /// Records `message` against `field` unless `condition` holds.
    pub fn check(&mut self, field: &str, condition: bool, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.push(field, "check", message.into());
        }
        self
    }

    /// Validates a nested value under `field`.
    pub fn nested<V: Validate + ?Sized>(&mut self, field: &str, value: &V) -> &mut Self {
        let path = self.path(field);
        self.descend(path, value);
        self
    }

    /// Validates a nested value under `field` when present.
    pub fn nested_opt<V: Validate>(&mut self, field: &str, value: &Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.nested(field, value);
        }
        self
    }

    /// Validates every element of a nested sequence, as `field[i]`.
    pub fn nested_each<V: Validate>(&mut self, field: &str, values: &[V]) -> &mut Self {
        let base = self.path(field);
        for (index, value) in values.iter().enumerate() {
            self.descend(format!("{}[{}]", base, index), value);
        }
        self
    }

    fn descend<V: Validate + ?Sized>(&mut self, prefix: String, value: &V) {
        let saved = std::mem::replace(&mut self.prefix, prefix);
        value.validate(self);
        self.prefix = saved;
    }

    fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.prefix, field)
        }
    }

    fn push(&mut self, field: &str, rule: &'static str, message: String) {
        let path = self.path(field);
        self.details.push(ValidationDetail {
            path,
            rule,
            message,
        });
    }
}

/// Returns `true` if `pattern` matches all of `value`.
fn matches_whole(pattern: &Regex, value: &str) -> bool {
    if pattern
        .find(value)
        .is_some_and(|m| m.start() == 0 && m.end() == value.len())
    {
        return true;
    }
    // Leftmost-first search can stop at a shorter match (`a|ab` on "ab")
    Regex::new(&format!("^(?:{})$", pattern.as_str()))
        .map(|anchored| anchored.is_match(value))
        .unwrap_or(false)
}
