//! Pluggable providers consulted by the engine.
//!
//! - [`UserProvider`] - supplies the current user for `updatedBy` auditing
//! - [`LogSink`] - receives a rendered line for every lifecycle event
//!
//! Both are implemented for plain closures:
//!
//! ```
//! use docket_lifecycle::providers::{LogSink, UserProvider};
//!
//! let user = || Some("ada".to_string());
//! assert_eq!(user.current_user().as_deref(), Some("ada"));
//!
//! let sink = |line: &str| println!("{line}");
//! sink.log("save Widget id=1");
//! ```

/// Supplies the identity of the user performing an operation.
pub trait UserProvider: Send + Sync {
    /// Returns the current user, if any.
    fn current_user(&self) -> Option<String>;
}

impl<F> UserProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_user(&self) -> Option<String> {
        self()
    }
}

/// A fixed user, for single-user tools and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticUser(pub String);

impl UserProvider for StaticUser {
    fn current_user(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Receives lifecycle event lines.
///
/// The engine already emits every event through `tracing`; a sink is for
/// callers that want the lines somewhere else as well.
pub trait LogSink: Send + Sync {
    /// Records one event line.
    fn log(&self, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}
