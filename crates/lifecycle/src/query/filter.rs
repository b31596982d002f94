//! Document filters.
//!
//! A [`Filter`] is the predicate language shared by the engine and the
//! document stores. It is deliberately small: field comparisons on dotted
//! paths plus boolean composition. Stores translate it to their native query
//! form; the in-memory store evaluates it directly with [`Filter::matches`].

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::types::fields;

/// A predicate over stored documents.
///
/// # Examples
///
/// ```
/// use docket_lifecycle::query::Filter;
/// use serde_json::json;
///
/// let filter = Filter::eq("status", "open").and(Filter::gte("total", 10));
/// assert!(filter.matches(&json!({"status": "open", "total": 12})));
/// assert!(!filter.matches(&json!({"status": "open", "total": 3})));
/// assert_eq!(filter.to_string(), r#"status = "open" AND total >= 10"#);
/// ```
// Variant fields are self-describing: the field path and the operand(s)
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Matches every document.
    #[default]
    All,
    /// Field equals value (a missing field equals `null`).
    Eq { field: String, value: Value },
    /// Field does not equal value.
    Ne { field: String, value: Value },
    /// Field is greater than value.
    Gt { field: String, value: Value },
    /// Field is greater than or equal to value.
    Gte { field: String, value: Value },
    /// Field is less than value.
    Lt { field: String, value: Value },
    /// Field is less than or equal to value.
    Lte { field: String, value: Value },
    /// Field equals one of the values.
    In { field: String, values: Vec<Value> },
    /// Field presence.
    Exists { field: String, exists: bool },
    /// All sub-filters match.
    And(Vec<Filter>),
    /// Any sub-filter matches.
    Or(Vec<Filter>),
    /// The sub-filter does not match.
    Not(Box<Filter>),
}

impl Filter {
    /// `field = value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `field != value`.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `field > value`.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `field >= value`.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gte {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `field < value`.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `field <= value`.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lte {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `field IN values`.
    pub fn in_list<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Filter::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Field presence (`exists = true`) or absence.
    pub fn exists(field: impl Into<String>, exists: bool) -> Self {
        Filter::Exists {
            field: field.into(),
            exists,
        }
    }

    /// Matches the document with the given identifier.
    pub fn by_id(id: impl Into<String>) -> Self {
        Filter::eq(fields::ID, id.into())
    }

    /// Conjunction of `self` and `other`.
    pub fn and(self, other: Filter) -> Self {
        Filter::all_of([self, other])
    }

    /// Disjunction of `self` and `other`.
    pub fn or(self, other: Filter) -> Self {
        Filter::any_of([self, other])
    }

    /// Negation of `self`.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Filter::Not(Box::new(self))
    }

    /// Conjunction of all filters, flattening nested conjunctions.
    ///
    /// [`Filter::All`] terms are dropped; an empty conjunction is `All`.
    pub fn all_of(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut parts = Vec::new();
        for filter in filters {
            match filter {
                Filter::All => {}
                Filter::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Filter::All,
            1 => parts.swap_remove(0),
            _ => Filter::And(parts),
        }
    }

    /// Matches no document: the empty disjunction.
    pub fn none() -> Self {
        Filter::Or(Vec::new())
    }

    /// Disjunction of all filters, flattening nested disjunctions.
    ///
    /// Any [`Filter::All`] term makes the whole disjunction `All`; an empty
    /// disjunction matches nothing.
    pub fn any_of(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut parts = Vec::new();
        for filter in filters {
            match filter {
                Filter::All => return Filter::All,
                Filter::Or(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            1 => parts.swap_remove(0),
            _ => Filter::Or(parts),
        }
    }

    /// Returns `true` if this filter matches every document.
    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    /// Evaluates the filter against a JSON document.
    ///
    /// Equality against an array field matches when any element is equal.
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => equals(lookup(document, field), value),
            Filter::Ne { field, value } => !equals(lookup(document, field), value),
            Filter::Gt { field, value } => {
                compare(lookup(document, field), value) == Some(Ordering::Greater)
            }
            Filter::Gte { field, value } => matches!(
                compare(lookup(document, field), value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Filter::Lt { field, value } => {
                compare(lookup(document, field), value) == Some(Ordering::Less)
            }
            Filter::Lte { field, value } => matches!(
                compare(lookup(document, field), value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Filter::In { field, values } => {
                let actual = lookup(document, field);
                values.iter().any(|value| equals(actual, value))
            }
            Filter::Exists { field, exists } => lookup(document, field).is_some() == *exists,
            Filter::And(filters) => filters.iter().all(|f| f.matches(document)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(document)),
            Filter::Not(filter) => !filter.matches(document),
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self {
            Filter::All => write!(f, "*"),
            Filter::Eq { field, value } => write!(f, "{} = {}", field, value),
            Filter::Ne { field, value } => write!(f, "{} != {}", field, value),
            Filter::Gt { field, value } => write!(f, "{} > {}", field, value),
            Filter::Gte { field, value } => write!(f, "{} >= {}", field, value),
            Filter::Lt { field, value } => write!(f, "{} < {}", field, value),
            Filter::Lte { field, value } => write!(f, "{} <= {}", field, value),
            Filter::In { field, values } => {
                write!(f, "{} IN [", field)?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Filter::Exists { field, exists: true } => write!(f, "{} EXISTS", field),
            Filter::Exists { field, exists: false } => write!(f, "{} NOT EXISTS", field),
            Filter::And(filters) => fmt_joined(f, filters, " AND ", nested),
            Filter::Or(filters) if filters.is_empty() => write!(f, "NONE"),
            Filter::Or(filters) => fmt_joined(f, filters, " OR ", nested),
            Filter::Not(filter) => {
                write!(f, "NOT (")?;
                filter.fmt_nested(f, false)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_nested(f, false)
    }
}

fn fmt_joined(
    f: &mut fmt::Formatter<'_>,
    filters: &[Filter],
    separator: &str,
    nested: bool,
) -> fmt::Result {
    if nested {
        write!(f, "(")?;
    }
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        filter.fmt_nested(f, true)?;
    }
    if nested {
        write!(f, ")")?;
    }
    Ok(())
}

/// Resolves a dotted path; numeric segments index into arrays.
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => items.contains(expected),
        Some(actual) => numbers_equal(actual, expected).unwrap_or(actual == expected),
    }
}

/// `1` and `1.0` compare equal; serde_json keeps them distinct.
fn numbers_equal(a: &Value, b: &Value) -> Option<bool> {
    Some(a.as_f64()? == b.as_f64()?)
}

fn compare(actual: Option<&Value>, expected: &Value) -> Option<Ordering> {
    match (actual?, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
